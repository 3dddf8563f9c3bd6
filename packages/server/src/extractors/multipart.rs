use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::error::AppError;
use crate::utils::sanitize::clean_text;

/// Multipart field carrying the photo file.
pub const PHOTO_FIELD: &str = "photo_url";

/// A file part read fully into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A `multipart/form-data` body with sanitized text fields and an optional photo.
///
/// Multipart errors become `AppError::Validation`, or `AppError::PayloadTooLarge`
/// when the body exceeds the configured limit.
#[derive(Debug, Default)]
pub struct PhotoForm {
    fields: HashMap<String, String>,
    photo: Option<UploadedFile>,
}

impl PhotoForm {
    pub fn from_parts(fields: HashMap<String, String>, photo: Option<UploadedFile>) -> Self {
        Self { fields, photo }
    }

    /// Trimmed value of a text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name).ok_or_else(|| missing_field(name))
    }

    /// Untrimmed value of a text field, `None` when absent or blank.
    pub fn raw_text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require_raw_text(&self, name: &str) -> Result<&str, AppError> {
        self.raw_text(name).ok_or_else(|| missing_field(name))
    }

    pub fn photo(&self) -> Option<&UploadedFile> {
        self.photo.as_ref()
    }

    pub fn require_photo(&mut self) -> Result<UploadedFile, AppError> {
        self.photo.take().ok_or_else(|| {
            AppError::Validation(format!("Missing required file '{PHOTO_FIELD}'"))
        })
    }

    pub fn take_photo(&mut self) -> Option<UploadedFile> {
        self.photo.take()
    }
}

fn reject(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded payload exceeds the size limit".into())
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

impl<S> FromRequest<S> for PhotoForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut form = PhotoForm::default();
        while let Some(field) = multipart.next_field().await.map_err(reject)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == PHOTO_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| mime_guess::from_path(&file_name).first().map(|m| m.to_string()))
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(reject)?;
                // Browsers send an empty part when no file was picked.
                if !data.is_empty() {
                    form.photo = Some(UploadedFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
                continue;
            }

            let text = field.text().await.map_err(reject)?;
            form.fields.insert(name, clean_text(&text));
        }
        Ok(form)
    }
}

fn missing_field(name: &str) -> AppError {
    AppError::Validation(format!("Missing required field '{name}'"))
}
