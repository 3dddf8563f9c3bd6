//! S3-compatible backend (GCS interoperability mode, MinIO, AWS) via `rust-s3`.

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::traits::ObjectStore;
use crate::config::S3AppConfig;

pub struct S3ObjectStore {
    inner: Box<Bucket>,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(
        bucket: &str,
        config: &S3AppConfig,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid s3 credentials: {e}")))?;

        let mut inner = Bucket::new(bucket, region, credentials)?;
        if config.path_style {
            inner = inner.with_path_style();
        }

        Ok(Self {
            inner,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let res = self
            .inner
            .put_object_with_content_type(key, &data, content_type)
            .await?;
        let status = res.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected {
                operation: "upload",
                key: key.to_string(),
                status,
                body: String::from_utf8_lossy(res.as_slice()).into_owned(),
            });
        }
        Ok(())
    }

    /// S3 answers 204 whether or not the object existed, so this only
    /// reports `false` for stores that send 404.
    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        let res = self.inner.delete_object(key).await?;
        match res.status_code() {
            404 => Ok(false),
            status if (200..300).contains(&status) => Ok(true),
            status => Err(StorageError::Rejected {
                operation: "delete",
                key: key.to_string(),
                status,
                body: String::from_utf8_lossy(res.as_slice()).into_owned(),
            }),
        }
    }
}
