//! Object storage for uploaded media.

mod local;
pub mod thumbnail;
mod upload;

pub use local::LocalFileStorage;
pub use upload::{PhotoUpload, UploadService};

use async_trait::async_trait;

use crate::error::RemoteOperationError;

/// Where a stored object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Remote blob storage: store bytes under a key, get back a public URL.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<StoredObject, RemoteOperationError>;
}
