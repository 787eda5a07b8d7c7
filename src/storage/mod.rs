//! Blob storage for uploaded documents.
//!
//! Uploads go to Cloudflare R2 through its S3-compatible API when R2 is
//! configured, to a local directory otherwise. Tests use an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    backend: &'static str,
}

impl ObjectBlobStore {
    pub fn new(store: Arc<dyn ObjectStore>, backend: &'static str) -> Self {
        Self { store, backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }

    pub fn from_settings(config: &StorageConfig) -> Result<Self> {
        if let Some(r2) = config.r2_credentials() {
            let store = AmazonS3Builder::new()
                .with_bucket_name(r2.bucket)
                .with_region("auto")
                .with_endpoint(format!("https://{}.r2.cloudflarestorage.com", r2.account_id))
                .with_access_key_id(r2.access_key_id)
                .with_secret_access_key(r2.secret_access_key)
                .build()
                .map_err(|e| StorageError::Misconfigured(format!("Failed to create R2 client: {}", e)))?;
            info!("Using R2 bucket {} for file storage", r2.bucket);
            return Ok(Self::new(Arc::new(store), "r2"));
        }

        if config.in_memory {
            debug!("Using in-memory file storage");
            return Ok(Self::in_memory());
        }

        std::fs::create_dir_all(&config.local_dir).map_err(|e| {
            StorageError::Misconfigured(format!(
                "Failed to create local storage directory '{}': {}",
                config.local_dir, e
            ))
        })?;
        let store = LocalFileSystem::new_with_prefix(&config.local_dir)?;
        warn!(
            "R2 is not configured, storing uploads under local directory {}",
            config.local_dir
        );
        Ok(Self::new(Arc::new(store), "local"))
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let size = data.len();
        self.store
            .put(&ObjectPath::from(key), PutPayload::from(data))
            .await?;
        debug!("Stored {} bytes at {} ({})", size, key, self.backend);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&ObjectPath::from(key)).await?;
        debug!("Deleted {} ({})", key, self.backend);
        Ok(())
    }
}

/// Deletes a blob, logging instead of failing. Removing the database row
/// matters more than removing the bytes.
pub async fn discard_blob(store: &dyn BlobStore, key: &str) {
    if let Err(e) = store.delete(key).await {
        warn!("Failed to delete stored file {}: {}", key, e);
    }
}
