use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;
use super::key::{key_from_url, object_key};

/// Flat, publicly readable object storage keyed by generated names.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket every object is written to.
    fn bucket(&self) -> &str;

    /// Base that public object URLs are built from.
    fn public_base_url(&self) -> &str;

    /// Write `data` under `key` in a single, non-resumable request.
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete the object stored under `key`.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete_object(&self, key: &str) -> Result<bool, StorageError>;

    /// Public URL of the object stored under `key`.
    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url().trim_end_matches('/'),
            self.bucket(),
            key
        )
    }

    /// Store a file under a freshly generated key and return its public URL.
    ///
    /// The write has completed when this returns.
    async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(original_filename);
        self.put_object(&key, data, content_type).await?;
        Ok(self.public_url(&key))
    }

    /// Delete the object a stored URL points at. A bare key is accepted too.
    async fn delete(&self, url_or_key: &str) -> Result<bool, StorageError> {
        let key = key_from_url(url_or_key)
            .ok_or_else(|| StorageError::InvalidKey(url_or_key.to_string()))?;
        self.delete_object(key).await
    }
}
