pub mod fallback;
pub mod handicraft;
pub mod kegiatan;

use common::storage::ObjectStore;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::multipart::UploadedFile;

/// Parse a path id, rejecting malformed values as a validation error.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {kind} ID '{raw}'")))
}

/// Upload a photo and wait for the write to finish.
pub(crate) async fn store_photo(
    store: &dyn ObjectStore,
    photo: &UploadedFile,
) -> Result<String, AppError> {
    let url = store
        .upload(photo.data.clone(), &photo.content_type, &photo.file_name)
        .await?;
    tracing::debug!(url = %url, size = photo.data.len(), "Photo uploaded");
    Ok(url)
}

/// Delete the blob behind a stored URL. A missing object is only logged.
pub(crate) async fn remove_photo(store: &dyn ObjectStore, url: &str) -> Result<(), AppError> {
    if !store.delete(url).await? {
        warn!(url = %url, "Photo was already missing from the object store");
    }
    Ok(())
}
