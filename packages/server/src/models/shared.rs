use serde::Serialize;

/// Success envelope wrapping every JSON payload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Envelope<T> {
    /// Always `success`.
    #[schema(example = "success")]
    pub status: &'static str,
    /// Number of items, present on list responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            results: None,
            data,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Self {
            status: "success",
            results: Some(data.len()),
            data,
        }
    }
}

/// Split comma-separated input into trimmed, non-empty names.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split newline-separated input into non-blank lines.
///
/// Trailing whitespace is dropped. Leading indentation is kept.
pub fn split_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim_end)
        .filter(|s| !s.trim_start().is_empty())
        .map(str::to_string)
        .collect()
}
