//! In-process object store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Disposition, ObjectStore, StoredObject, UrlSigner, validate_key};
use crate::error::{PayrollError, PayrollResult};

/// An [`ObjectStore`] that keeps objects in a map. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    signer: UrlSigner,
}

impl MemoryObjectStore {
    /// Creates an empty store issuing links with `signer`.
    pub fn new(signer: UrlSigner) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer,
        }
    }

    /// Returns the stored keys in ascending order.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> PayrollResult<()> {
        validate_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download(&self, key: &str) -> PayrollResult<StoredObject> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| PayrollError::ObjectNotFound {
                key: key.to_string(),
            })
    }

    async fn exists(&self, key: &str) -> PayrollResult<bool> {
        validate_key(key)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> PayrollResult<bool> {
        validate_key(key)?;
        Ok(self.objects.write().await.remove(key).is_some())
    }

    async fn signed_url(
        &self,
        key: &str,
        disposition: Disposition,
        ttl: Duration,
    ) -> PayrollResult<String> {
        validate_key(key)?;
        self.signer.signed_url(key, disposition, ttl, chrono::Utc::now())
    }
}
