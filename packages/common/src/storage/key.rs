use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 16;

/// Generate a globally unique object key that keeps the original file's extension.
///
/// Extensions that are not short ASCII alphanumerics are dropped.
pub fn object_key(original_filename: &str) -> String {
    let id = Uuid::new_v4();
    match extension(original_filename) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn extension(filename: &str) -> Option<&str> {
    let name = filename.rsplit(['/', '\\']).next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}

/// Object key of a stored public URL: its final path segment.
pub fn key_from_url(url_or_key: &str) -> Option<&str> {
    let path = url_or_key.split(['?', '#']).next().unwrap_or(url_or_key);
    path.rsplit('/').next().filter(|key| !key.is_empty())
}
