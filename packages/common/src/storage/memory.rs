use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::traits::ObjectStore;

/// A stored object and the content type it was uploaded with.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// In-memory object store for development and tests.
///
/// Writes can be made to fail on demand to exercise upload error paths.
pub struct MemoryObjectStore {
    bucket: String,
    public_base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_writes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str, public_base_url: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            public_base_url: public_base_url.to_string(),
            objects: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every following `put_object` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
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
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                operation: "upload",
                key: key.to_string(),
                status: 503,
                body: "writes disabled".into(),
            });
        }
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.write().await.remove(key).is_some())
    }
}
