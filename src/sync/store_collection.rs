//! `CrudCollaborator` backed by the local `ContentStore`.
//!
//! This is the far side of the admin surface: it enforces the admin role on
//! mutations and on reading contact messages, validates incoming fields, and
//! runs every SQLite call on the blocking pool.

use std::marker::PhantomData;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task;
use tracing::{debug, warn};

use super::crud::CrudCollaborator;
use crate::error::{RemoteOperationError, ValidationError};
use crate::models::{
    Album, AlbumUpdate, Concert, ConcertUpdate, ContactSubmission, Identity, NewAlbum,
    NewConcert, NewContactSubmission, NewPhoto, NewVideo, Photo, Record, ResourceKind, Video,
};
use crate::store::{ContentStore, SharedStore};

/// A record kind the content store knows how to list, insert and delete.
pub trait StoredResource: Record + Clone + Send + Sync + 'static {
    type Fields: Send + 'static;

    const KIND: ResourceKind;
    /// Whether listing needs the admin role.
    const ADMIN_LIST: bool = false;
    /// Whether anyone (including anonymous visitors) may create.
    const PUBLIC_CREATE: bool = false;

    fn validate(fields: &Self::Fields) -> Result<(), ValidationError>;
    fn list(store: &ContentStore) -> Result<Vec<Self>>;
    fn insert(store: &ContentStore, fields: &Self::Fields) -> Result<i64>;
    fn delete(store: &ContentStore, id: i64) -> Result<bool>;
}

impl StoredResource for Concert {
    type Fields = NewConcert;
    const KIND: ResourceKind = ResourceKind::Concert;

    fn validate(fields: &NewConcert) -> Result<(), ValidationError> {
        fields.validate()
    }
    fn list(store: &ContentStore) -> Result<Vec<Self>> {
        store.list_concerts()
    }
    fn insert(store: &ContentStore, fields: &NewConcert) -> Result<i64> {
        store.insert_concert(fields)
    }
    fn delete(store: &ContentStore, id: i64) -> Result<bool> {
        store.delete_concert(id)
    }
}

impl StoredResource for Photo {
    type Fields = NewPhoto;
    const KIND: ResourceKind = ResourceKind::Photo;

    fn validate(fields: &NewPhoto) -> Result<(), ValidationError> {
        fields.validate()
    }
    fn list(store: &ContentStore) -> Result<Vec<Self>> {
        store.list_photos()
    }
    fn insert(store: &ContentStore, fields: &NewPhoto) -> Result<i64> {
        store.insert_photo(fields)
    }
    fn delete(store: &ContentStore, id: i64) -> Result<bool> {
        store.delete_photo(id)
    }
}

impl StoredResource for Album {
    type Fields = NewAlbum;
    const KIND: ResourceKind = ResourceKind::Album;

    fn validate(fields: &NewAlbum) -> Result<(), ValidationError> {
        fields.validate()
    }
    fn list(store: &ContentStore) -> Result<Vec<Self>> {
        store.list_albums()
    }
    fn insert(store: &ContentStore, fields: &NewAlbum) -> Result<i64> {
        store.insert_album(fields)
    }
    fn delete(store: &ContentStore, id: i64) -> Result<bool> {
        store.delete_album(id)
    }
}

impl StoredResource for Video {
    type Fields = NewVideo;
    const KIND: ResourceKind = ResourceKind::Video;

    fn validate(fields: &NewVideo) -> Result<(), ValidationError> {
        fields.validate()
    }
    fn list(store: &ContentStore) -> Result<Vec<Self>> {
        store.list_videos()
    }
    fn insert(store: &ContentStore, fields: &NewVideo) -> Result<i64> {
        store.insert_video(fields)
    }
    fn delete(store: &ContentStore, id: i64) -> Result<bool> {
        store.delete_video(id)
    }
}

impl StoredResource for ContactSubmission {
    type Fields = NewContactSubmission;
    const KIND: ResourceKind = ResourceKind::Contact;
    const ADMIN_LIST: bool = true;
    const PUBLIC_CREATE: bool = true;

    fn validate(fields: &NewContactSubmission) -> Result<(), ValidationError> {
        fields.validate()
    }
    fn list(store: &ContentStore) -> Result<Vec<Self>> {
        store.list_contacts()
    }
    fn insert(store: &ContentStore, fields: &NewContactSubmission) -> Result<i64> {
        store.insert_contact(fields)
    }
    fn delete(store: &ContentStore, id: i64) -> Result<bool> {
        store.delete_contact(id)
    }
}

/// Store-backed collection of `R`, acting on behalf of one identity.
pub struct StoreCollection<R> {
    store: SharedStore,
    identity: Identity,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for StoreCollection<R> {
    fn clone(&self) -> Self {
        Self {
            store: SharedStore::clone(&self.store),
            identity: self.identity,
            _record: PhantomData,
        }
    }
}

impl<R: StoredResource> StoreCollection<R> {
    pub fn new(store: SharedStore, identity: Identity) -> Self {
        Self {
            store,
            identity,
            _record: PhantomData,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    fn require_admin(&self, operation: &'static str) -> Result<(), RemoteOperationError> {
        if self.identity.is_admin() {
            Ok(())
        } else {
            warn!(kind = %R::KIND, operation, "Rejected non-admin request");
            Err(RemoteOperationError::Forbidden)
        }
    }

    /// Runs `f` against the store on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T, RemoteOperationError>
    where
        T: Send + 'static,
        F: FnOnce(&ContentStore) -> Result<T> + Send + 'static,
    {
        let store = SharedStore::clone(&self.store);
        task::spawn_blocking(move || {
            let store = store.lock();
            f(&*store)
        })
        .await
        .map_err(|e| RemoteOperationError::Transport(format!("store task failed: {}", e)))?
        .map_err(RemoteOperationError::from)
    }

    fn not_found(id: i64) -> RemoteOperationError {
        RemoteOperationError::NotFound { kind: R::KIND, id }
    }
}

#[async_trait]
impl<R: StoredResource> CrudCollaborator for StoreCollection<R> {
    type Record = R;
    type Fields = R::Fields;

    fn kind(&self) -> ResourceKind {
        R::KIND
    }

    async fn list(&self) -> Result<Vec<R>, RemoteOperationError> {
        if R::ADMIN_LIST {
            self.require_admin("list")?;
        }
        self.with_store(R::list).await
    }

    async fn create(&self, fields: R::Fields) -> Result<i64, RemoteOperationError> {
        if !R::PUBLIC_CREATE {
            self.require_admin("create")?;
        }
        R::validate(&fields).map_err(|e| RemoteOperationError::Rejected(e.to_string()))?;

        let id = self.with_store(move |store| R::insert(store, &fields)).await?;
        debug!(kind = %R::KIND, id, "Inserted");
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteOperationError> {
        self.require_admin("delete")?;
        let existed = self.with_store(move |store| R::delete(store, id)).await?;
        if existed {
            Ok(())
        } else {
            Err(Self::not_found(id))
        }
    }
}

impl StoreCollection<Concert> {
    pub async fn update(&self, id: i64, update: ConcertUpdate) -> Result<(), RemoteOperationError> {
        self.require_admin("update")?;
        let found = self
            .with_store(move |store| store.update_concert(id, &update))
            .await?;
        found.then_some(()).ok_or_else(|| Self::not_found(id))
    }
}

impl StoreCollection<Album> {
    pub async fn update(&self, id: i64, update: AlbumUpdate) -> Result<(), RemoteOperationError> {
        self.require_admin("update")?;
        let found = self
            .with_store(move |store| store.update_album(id, &update))
            .await?;
        found.then_some(()).ok_or_else(|| Self::not_found(id))
    }
}

impl StoreCollection<ContactSubmission> {
    pub async fn mark_read(&self, id: i64) -> Result<(), RemoteOperationError> {
        self.require_admin("mark_read")?;
        let found = self
            .with_store(move |store| store.mark_contact_read(id))
            .await?;
        found.then_some(()).ok_or_else(|| Self::not_found(id))
    }
}
