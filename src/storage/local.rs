//! Filesystem object store.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::{Disposition, ObjectStore, PDF_CONTENT_TYPE, StoredObject, UrlSigner, validate_key};
use crate::error::{PayrollError, PayrollResult};

/// An [`ObjectStore`] writing each object to `{root}/{key}`.
#[derive(Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    signer: UrlSigner,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`. The directory is created on first upload.
    pub fn new(root: impl Into<PathBuf>, signer: UrlSigner) -> Self {
        Self {
            root: root.into(),
            signer,
        }
    }

    fn path_for(&self, key: &str) -> PayrollResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }
}

fn storage_error(key: &str, error: std::io::Error) -> PayrollError {
    PayrollError::Storage {
        key: key.to_string(),
        message: error.to_string(),
    }
}

fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".pdf") {
        PDF_CONTENT_TYPE
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> PayrollResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(key, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| storage_error(key, e))
    }

    async fn download(&self, key: &str) -> PayrollResult<StoredObject> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(StoredObject {
                bytes,
                content_type: content_type_for(key).to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PayrollError::ObjectNotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(storage_error(key, e)),
        }
    }

    async fn exists(&self, key: &str) -> PayrollResult<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| storage_error(key, e))
    }

    async fn delete(&self, key: &str) -> PayrollResult<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error(key, e)),
        }
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
