//! The back-office: one synchronized list per resource kind.
//!
//! Entering requires an authenticated admin identity. Every operation
//! validates its input, talks to the store through a `CollectionSync`, and
//! reports the outcome as a [`Notice`]; failures never alter the lists.

use tracing::{info, warn};

use crate::error::{AccessDenied, RemoteOperationError, ValidationError};
use crate::models::{
    Album, AlbumUpdate, Concert, ConcertUpdate, ContactSubmission, Identity, NewAlbum,
    NewConcert, NewPhoto, NewVideo, Photo, Video,
};
use crate::storage::UploadService;
use crate::store::SharedStore;
use crate::sync::{CollectionSync, CrudCollaborator, StoreCollection, StoredResource};

/// Photo categories offered by the back-office, in display order.
pub const PHOTO_CATEGORIES: [&str; 5] = ["concert", "studio", "festival", "coulisses", "autre"];

pub type ConcertSync = CollectionSync<StoreCollection<Concert>>;
pub type PhotoSync = CollectionSync<StoreCollection<Photo>>;
pub type AlbumSync = CollectionSync<StoreCollection<Album>>;
pub type VideoSync = CollectionSync<StoreCollection<Video>>;
pub type ContactSync = CollectionSync<StoreCollection<ContactSubmission>>;

/// Transient user notification for the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }
}

/// Item counts after loading every list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub concerts: usize,
    pub photos: usize,
    pub albums: usize,
    pub videos: usize,
    pub contacts: usize,
}

/// Fields for a photo created from an uploaded file.
#[derive(Debug, Clone, Default)]
pub struct PhotoFile {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

pub struct AdminConsole {
    identity: Identity,
    concerts: ConcertSync,
    photos: PhotoSync,
    albums: AlbumSync,
    videos: VideoSync,
    contacts: ContactSync,
    uploads: UploadService,
}

impl AdminConsole {
    /// Opens the back-office for `identity`, or denies access.
    ///
    /// The lists start empty; call [`AdminConsole::load_all`] to fill them.
    pub fn enter(
        identity: Identity,
        store: SharedStore,
        uploads: UploadService,
    ) -> Result<Self, AccessDenied> {
        if !identity.is_admin() {
            warn!(user_id = identity.user_id, "Back-office access denied");
            return Err(AccessDenied);
        }

        info!(user_id = identity.user_id, "Entered back-office");
        Ok(Self {
            identity,
            concerts: sync_for(&store, identity),
            photos: sync_for(&store, identity),
            albums: sync_for(&store, identity),
            videos: sync_for(&store, identity),
            contacts: sync_for(&store, identity),
            uploads,
        })
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn concerts(&self) -> &ConcertSync {
        &self.concerts
    }

    pub fn photos(&self) -> &PhotoSync {
        &self.photos
    }

    pub fn albums(&self) -> &AlbumSync {
        &self.albums
    }

    pub fn videos(&self) -> &VideoSync {
        &self.videos
    }

    pub fn contacts(&self) -> &ContactSync {
        &self.contacts
    }

    /// Loads every list. Unreachable lists come back empty.
    pub async fn load_all(&self) -> LoadSummary {
        let (concerts, photos, albums, videos, contacts) = tokio::join!(
            self.concerts.load(),
            self.photos.load(),
            self.albums.load(),
            self.videos.load(),
            self.contacts.load(),
        );
        LoadSummary {
            concerts: concerts.len(),
            photos: photos.len(),
            albums: albums.len(),
            videos: videos.len(),
            contacts: contacts.len(),
        }
    }

    // =========================================================================
    // Concerts
    // =========================================================================

    pub async fn add_concert(&self, fields: NewConcert) -> Notice {
        if let Err(e) = fields.validate() {
            return invalid("concert", e);
        }
        created(&self.concerts, fields, "Concert").await
    }

    pub async fn update_concert(&self, id: i64, update: ConcertUpdate) -> Notice {
        match self.concerts.collaborator().update(id, update).await {
            Ok(()) => {
                self.concerts.load().await;
                Notice::Success("Concert updated".into())
            }
            Err(e) => failed("update the concert", e),
        }
    }

    pub async fn remove_concert(&self, id: i64) -> Notice {
        removed(&self.concerts, id, "Concert").await
    }

    // =========================================================================
    // Photos
    // =========================================================================

    pub async fn add_photo(&self, fields: NewPhoto) -> Notice {
        if let Err(e) = fields.validate() {
            return invalid("photo", e);
        }
        created(&self.photos, fields, "Photo").await
    }

    /// Uploads the file (with a thumbnail) and creates the photo from it.
    pub async fn add_photo_file(&self, file: PhotoFile) -> Notice {
        let PhotoFile {
            title,
            description,
            category,
            file_name,
            data,
            mime_type,
        } = file;

        let uploaded = match self
            .uploads
            .upload_photo(&self.identity, &file_name, data, mime_type.as_deref())
            .await
        {
            Ok(uploaded) => uploaded,
            Err(e) => return failed("upload the photo", e),
        };

        self.add_photo(NewPhoto {
            title,
            description,
            category,
            image_key: uploaded.upload.file_key,
            image_url: uploaded.upload.file_url,
            thumbnail_url: Some(uploaded.thumbnail_url),
        })
        .await
    }

    pub async fn remove_photo(&self, id: i64) -> Notice {
        removed(&self.photos, id, "Photo").await
    }

    // =========================================================================
    // Albums
    // =========================================================================

    pub async fn add_album(&self, fields: NewAlbum) -> Notice {
        if let Err(e) = fields.validate() {
            return invalid("album", e);
        }
        created(&self.albums, fields, "Album").await
    }

    pub async fn update_album(&self, id: i64, update: AlbumUpdate) -> Notice {
        match self.albums.collaborator().update(id, update).await {
            Ok(()) => {
                self.albums.load().await;
                Notice::Success("Album updated".into())
            }
            Err(e) => failed("update the album", e),
        }
    }

    pub async fn remove_album(&self, id: i64) -> Notice {
        removed(&self.albums, id, "Album").await
    }

    // =========================================================================
    // Videos
    // =========================================================================

    /// Accepts either a bare YouTube id or a watch/short link.
    pub async fn add_video(&self, mut fields: NewVideo) -> Notice {
        fields.resolve_youtube_id();
        if let Err(e) = fields.validate() {
            return invalid("video", e);
        }
        created(&self.videos, fields, "Video").await
    }

    pub async fn remove_video(&self, id: i64) -> Notice {
        removed(&self.videos, id, "Video").await
    }

    // =========================================================================
    // Contact messages
    // =========================================================================

    pub fn unread_count(&self) -> usize {
        self.contacts.records().iter().filter(|c| !c.read).count()
    }

    pub async fn mark_read(&self, id: i64) -> Notice {
        match self.contacts.collaborator().mark_read(id).await {
            Ok(()) => {
                self.contacts.load().await;
                Notice::Success("Message marked as read".into())
            }
            Err(e) => failed("mark the message as read", e),
        }
    }

    pub async fn remove_contact(&self, id: i64) -> Notice {
        removed(&self.contacts, id, "Message").await
    }
}

fn sync_for<R: StoredResource>(
    store: &SharedStore,
    identity: Identity,
) -> CollectionSync<StoreCollection<R>> {
    CollectionSync::new(StoreCollection::new(SharedStore::clone(store), identity))
}

async fn created<C: CrudCollaborator>(
    sync: &CollectionSync<C>,
    fields: C::Fields,
    label: &str,
) -> Notice {
    match sync.create(fields).await {
        Ok(()) => Notice::Success(format!("{label} created")),
        Err(e) => failed(&format!("create the {}", sync.collaborator().kind()), e),
    }
}

async fn removed<C: CrudCollaborator>(sync: &CollectionSync<C>, id: i64, label: &str) -> Notice {
    match sync.remove(id).await {
        Ok(()) => Notice::Success(format!("{label} deleted")),
        Err(e) => failed(&format!("delete the {}", sync.collaborator().kind()), e),
    }
}

fn failed(action: &str, err: RemoteOperationError) -> Notice {
    Notice::Failure(format!("Could not {action}: {err}"))
}

fn invalid(what: &str, err: ValidationError) -> Notice {
    Notice::Failure(format!("Invalid {what}: {err}"))
}
