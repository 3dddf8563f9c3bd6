mod error;
mod key;
mod memory;
mod traits;

#[cfg(feature = "object-storage")]
pub mod gcs;
#[cfg(feature = "object-storage")]
pub mod s3_compatible;

use std::sync::Arc;

pub use error::StorageError;
pub use key::{key_from_url, object_key};
pub use memory::MemoryObjectStore;
pub use traits::ObjectStore;

use crate::config::{StorageAppConfig, StorageBackend};

/// Build the configured object-store backend.
pub fn from_config(config: &StorageAppConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new(
            &config.bucket,
            &config.public_base_url,
        ))),
        #[cfg(feature = "object-storage")]
        StorageBackend::Gcs => {
            let key = config.service_account_key.as_deref().ok_or_else(|| {
                StorageError::Config(
                    "storage.service_account_key is required for the gcs backend".into(),
                )
            })?;
            Ok(Arc::new(gcs::GcsObjectStore::from_service_account_json(
                key,
                &config.bucket,
                &config.api_base_url,
                &config.public_base_url,
            )?))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Config("storage.s3 is required for the s3 backend".into())
            })?;
            Ok(Arc::new(s3_compatible::S3ObjectStore::new(
                &config.bucket,
                s3_config,
                &config.public_base_url,
            )?))
        }
        #[cfg(not(feature = "object-storage"))]
        other => Err(StorageError::Config(format!(
            "backend {other:?} needs the object-storage feature"
        ))),
    }
}
