//! Uploading files on behalf of a signed-in user.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::task;
use tracing::{info, warn};

use super::thumbnail::{self, DEFAULT_THUMB_HEIGHT};
use super::FileStorage;
use crate::error::RemoteOperationError;
use crate::models::{file_name_of, FileUpload, Identity, NewFileUpload};
use crate::store::SharedStore;

/// An uploaded photo together with its stored thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub upload: FileUpload,
    pub thumbnail_key: String,
    pub thumbnail_url: String,
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn FileStorage>,
    store: SharedStore,
}

impl UploadService {
    pub fn new(storage: Arc<dyn FileStorage>, store: SharedStore) -> Self {
        Self { storage, store }
    }

    /// Stores `data` under `uploads/<user_id>/<unix_millis>-<file_name>`
    /// and records the upload.
    pub async fn upload(
        &self,
        identity: &Identity,
        file_name: &str,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<FileUpload, RemoteOperationError> {
        if !identity.authenticated {
            return Err(RemoteOperationError::Forbidden);
        }
        let file_name = file_name_of(file_name.trim());
        if file_name.is_empty() {
            return Err(RemoteOperationError::Rejected("empty file name".into()));
        }

        let key = format!("uploads/{}/{}-{}", identity.user_id, unix_millis(), file_name);
        let file_size = data.len() as i64;
        let stored = self.storage.put(&key, data, mime_type).await.map_err(|e| {
            warn!(%key, error = %e, "Upload failed");
            e
        })?;

        let record = NewFileUpload {
            user_id: identity.user_id,
            file_name: file_name.to_string(),
            file_key: stored.key,
            file_url: stored.url,
            mime_type: mime_type.map(str::to_string),
            file_size: Some(file_size),
        };
        let store = SharedStore::clone(&self.store);
        let upload = task::spawn_blocking(move || store.lock().insert_file_upload(&record))
            .await
            .map_err(|e| RemoteOperationError::Transport(format!("store task failed: {}", e)))??;

        info!(key = %upload.file_key, size = file_size, "Uploaded file");
        Ok(upload)
    }

    /// Uploads a photo and stores a JPEG thumbnail for it.
    pub async fn upload_photo(
        &self,
        identity: &Identity,
        file_name: &str,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<PhotoUpload, RemoteOperationError> {
        if !identity.authenticated {
            return Err(RemoteOperationError::Forbidden);
        }

        // Decode before storing anything so a bad file leaves no trace.
        let source = data.clone();
        let thumb = task::spawn_blocking(move || thumbnail::render(&source, DEFAULT_THUMB_HEIGHT))
            .await
            .map_err(|e| RemoteOperationError::Transport(format!("thumbnail task failed: {}", e)))?
            .map_err(|e| RemoteOperationError::Rejected(format!("{:#}", e)))?;

        let upload = self.upload(identity, file_name, data, mime_type).await?;

        let thumbnail_key = thumbnail::thumbnail_key(&upload.file_key);
        let stored = self
            .storage
            .put(&thumbnail_key, thumb.data, Some("image/jpeg"))
            .await?;

        Ok(PhotoUpload {
            upload,
            thumbnail_key: stored.key,
            thumbnail_url: stored.url,
        })
    }

    /// Uploads recorded for the signed-in user.
    pub async fn list_uploads(
        &self,
        identity: &Identity,
    ) -> Result<Vec<FileUpload>, RemoteOperationError> {
        if !identity.authenticated {
            return Err(RemoteOperationError::Forbidden);
        }
        let user_id = identity.user_id;
        let store = SharedStore::clone(&self.store);
        let uploads = task::spawn_blocking(move || store.lock().file_uploads_for_user(user_id))
            .await
            .map_err(|e| RemoteOperationError::Transport(format!("store task failed: {}", e)))??;
        Ok(uploads)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
