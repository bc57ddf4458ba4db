use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task;
use tracing::{info, warn};

use crate::admin::{AdminConsole, PHOTO_CATEGORIES};
use crate::config::SiteConfig;
use crate::error::AccessDenied;
use crate::gallery::{CategoryFilter, GalleryIndex, MediaScanner, ScanConfig};
use crate::models::GalleryItem;
use crate::storage::{LocalFileStorage, UploadService};
use crate::store::{self, ContentStore, SharedStore};

/// Site backend: content store, file storage and the surfaces built on them.
pub struct SiteApp {
    config: SiteConfig,
    store: SharedStore,
    uploads: UploadService,
}

impl SiteApp {
    /// Opens the store (rebuilding it if it is unreadable) and the file
    /// storage described by `config`.
    pub fn open(config: SiteConfig) -> Result<Self> {
        let content = match ContentStore::open(&config.db_path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Failed to open content store: {:#}", e);
                ContentStore::handle_corruption(&config.db_path)?
            }
        };
        let store = store::shared(content);

        let storage = LocalFileStorage::new(&config.storage_dir, config.public_url.clone());
        let uploads = UploadService::new(Arc::new(storage), SharedStore::clone(&store));

        Ok(Self {
            config,
            store,
            uploads,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn uploads(&self) -> &UploadService {
        &self.uploads
    }

    /// The back-office for the configured identity.
    pub fn admin_console(&self) -> Result<AdminConsole, AccessDenied> {
        AdminConsole::enter(
            self.config.identity,
            SharedStore::clone(&self.store),
            self.uploads.clone(),
        )
    }

    /// Gallery items from the media directory when one is configured,
    /// otherwise from the stored photos.
    pub async fn gallery_items(&self) -> Result<Vec<GalleryItem>> {
        if let Some(dir) = &self.config.media_dir {
            let scanner = MediaScanner::with_config(ScanConfig::default());
            return scanner.scan(dir).await;
        }

        let store = SharedStore::clone(&self.store);
        let photos = task::spawn_blocking(move || store.lock().list_photos())
            .await
            .context("Photo query task panicked")??;
        Ok(photos.iter().map(GalleryItem::from_photo).collect())
    }

    /// Loads the back-office lists (when allowed) and indexes the gallery,
    /// logging what was found.
    pub async fn run(&self) -> Result<()> {
        match self.admin_console() {
            Ok(console) => {
                let summary = console.load_all().await;
                info!(
                    concerts = summary.concerts,
                    photos = summary.photos,
                    albums = summary.albums,
                    videos = summary.videos,
                    contacts = summary.contacts,
                    unread = console.unread_count(),
                    "Back-office loaded"
                );
            }
            Err(denied) => warn!("{}", denied),
        }

        let items = self.gallery_items().await?;
        let categories: Vec<String> = if self.config.media_dir.is_some() {
            GalleryIndex::categories(&items)
        } else {
            PHOTO_CATEGORIES.iter().map(|c| c.to_string()).collect()
        };
        let cards = GalleryIndex::representatives(&items, &CategoryFilter::All, &categories);
        info!(
            items = items.len(),
            categories = cards.len(),
            "Gallery indexed"
        );

        for card in cards {
            match GalleryIndex::resolve_group(&items, card) {
                Ok(resolved) => info!(
                    category = %card.category,
                    title = %card.title,
                    slides = resolved.group.len(),
                    "Gallery group"
                ),
                Err(e) => warn!(category = %card.category, "Gallery group unavailable: {}", e),
            }
        }

        let store = SharedStore::clone(&self.store);
        let stats = task::spawn_blocking(move || store.lock().stats())
            .await
            .context("Stats task panicked")??;
        info!(
            db_size_bytes = stats.db_size_bytes,
            uploads = stats.file_uploads,
            "Content store ready"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, NewPhoto};
    use std::fs::{self, File};
    use tempfile::{tempdir, TempDir};

    fn config(dir: &TempDir, identity: Identity) -> SiteConfig {
        SiteConfig {
            db_path: dir.path().join("content.sqlite"),
            storage_dir: dir.path().join("storage"),
            public_url: "/files".into(),
            media_dir: None,
            identity,
        }
    }

    #[tokio::test]
    async fn test_admin_console_follows_identity() {
        let dir = tempdir().unwrap();
        let app = SiteApp::open(config(&dir, Identity::user(2))).unwrap();
        assert!(app.admin_console().is_err());
        app.run().await.unwrap();

        let app = SiteApp::open(config(&dir, Identity::admin(1))).unwrap();
        assert!(app.admin_console().is_ok());
        app.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_gallery_from_stored_photos() {
        let dir = tempdir().unwrap();
        let app = SiteApp::open(config(&dir, Identity::admin(1))).unwrap();
        app.store()
            .lock()
            .insert_photo(&NewPhoto {
                title: "Crowd".into(),
                category: "festival".into(),
                image_key: "photos/crowd.jpg".into(),
                image_url: "/files/photos/crowd.jpg".into(),
                ..Default::default()
            })
            .unwrap();

        let items = app.gallery_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "festival");
        assert_eq!(items[0].media, "/files/photos/crowd.jpg");
    }

    #[tokio::test]
    async fn test_gallery_from_media_dir() {
        let dir = tempdir().unwrap();
        let media = dir.path().join("photos").join("Live");
        fs::create_dir_all(&media).unwrap();
        File::create(media.join("a.jpg")).unwrap();
        File::create(media.join("b.jpg")).unwrap();

        let mut config = config(&dir, Identity::anonymous());
        config.media_dir = Some(dir.path().join("photos"));
        let app = SiteApp::open(config).unwrap();

        let items = app.gallery_items().await.unwrap();
        assert_eq!(items.len(), 2);
        app.run().await.unwrap();
    }

    #[test]
    fn test_unreadable_db_is_rebuilt() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Identity::anonymous());
        fs::write(&config.db_path, b"garbage").unwrap();

        let app = SiteApp::open(config).unwrap();
        assert_eq!(app.store().lock().stats().unwrap().photos, 0);
    }
}
