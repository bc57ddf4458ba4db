//! SQLite-backed storage for the site's managed content.
//!
//! This module provides the `ContentStore` struct which manages all database
//! operations for the back-office, including:
//! - Concerts, photos, albums and videos (admin-managed content)
//! - Contact submissions (written by the public contact form)
//! - File upload bookkeeping

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::models::{
    Album, AlbumUpdate, Concert, ConcertUpdate, ContactSubmission, FileUpload, NewAlbum,
    NewConcert, NewContactSubmission, NewFileUpload, NewPhoto, NewVideo, Photo, Video,
};

/// SQLite-backed storage for site content.
///
/// The database is stored at `XDG_CONFIG_HOME/vrack/content.sqlite` unless a
/// path is given, and uses WAL mode.
pub struct ContentStore {
    conn: Connection,
}

const CONCERT_COLUMNS: &str = "id, title, description, date, time, location, address, \
     ticket_url, image_key, image_url, created_at, updated_at";
const PHOTO_COLUMNS: &str = "id, title, description, category, image_key, image_url, \
     thumbnail_url, created_at, updated_at";
const ALBUM_COLUMNS: &str = "id, title, description, release_year, spotify_id, spotify_url, \
     cover_image_key, cover_image_url, track_count, created_at, updated_at";
const VIDEO_COLUMNS: &str = "id, title, description, youtube_id, youtube_url, thumbnail_url, \
     created_at, updated_at";
const CONTACT_COLUMNS: &str = "id, name, email, subject, message, read, created_at";
const UPLOAD_COLUMNS: &str =
    "id, user_id, file_name, file_key, file_url, mime_type, file_size, uploaded_at";

impl ContentStore {
    /// Returns the default database path based on XDG directories.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "vrack")
            .context("Failed to determine project directories")?;
        Ok(proj_dirs.config_dir().join("content.sqlite"))
    }

    /// Opens or creates the database at the specified path.
    ///
    /// Configures SQLite with:
    /// - journal_mode = WAL
    /// - synchronous = NORMAL
    /// - foreign_keys = ON
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        let store = Self { conn };
        store.create_tables()?;

        info!("Opened content store at {:?}", path);
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS concerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                date INTEGER NOT NULL,
                time TEXT,
                location TEXT NOT NULL,
                address TEXT,
                ticket_url TEXT,
                image_key TEXT,
                image_url TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_concerts_date ON concerts(date);

            CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                image_key TEXT NOT NULL,
                image_url TEXT NOT NULL,
                thumbnail_url TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_photos_category ON photos(category);

            CREATE TABLE IF NOT EXISTS albums (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                release_year INTEGER NOT NULL,
                spotify_id TEXT,
                spotify_url TEXT,
                cover_image_key TEXT,
                cover_image_url TEXT,
                track_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                youtube_id TEXT NOT NULL,
                youtube_url TEXT,
                thumbnail_url TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contact_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS file_uploads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                file_key TEXT NOT NULL,
                file_url TEXT NOT NULL,
                mime_type TEXT,
                file_size INTEGER,
                uploaded_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_file_uploads_user ON file_uploads(user_id);
            ",
            )
            .context("Failed to create database tables")?;

        debug!("Database tables created/verified");
        Ok(())
    }

    // =========================================================================
    // Concerts
    // =========================================================================

    /// All concerts, soonest first.
    pub fn list_concerts(&self) -> Result<Vec<Concert>> {
        let sql = format!("SELECT {CONCERT_COLUMNS} FROM concerts ORDER BY date, id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let concerts = stmt
            .query_map([], concert_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query concerts")?;
        Ok(concerts)
    }

    pub fn get_concert(&self, id: i64) -> Result<Option<Concert>> {
        let sql = format!("SELECT {CONCERT_COLUMNS} FROM concerts WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], concert_from_row)
            .optional()
            .context("Failed to query concert")
    }

    pub fn insert_concert(&self, concert: &NewConcert) -> Result<i64> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO concerts (
                title, description, date, time, location, address,
                ticket_url, image_key, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ",
                params![
                    concert.title,
                    concert.description,
                    concert.date,
                    concert.time,
                    concert.location,
                    concert.address,
                    concert.ticket_url,
                    concert.image_key,
                    concert.image_url,
                    now,
                ],
            )
            .context("Failed to insert concert")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Applies the provided fields only. Returns false if the row is missing.
    pub fn update_concert(&self, id: i64, update: &ConcertUpdate) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "
            UPDATE concerts SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                date = COALESCE(?3, date),
                time = COALESCE(?4, time),
                location = COALESCE(?5, location),
                address = COALESCE(?6, address),
                ticket_url = COALESCE(?7, ticket_url),
                image_url = COALESCE(?8, image_url),
                updated_at = ?9
            WHERE id = ?10
            ",
                params![
                    update.title,
                    update.description,
                    update.date,
                    update.time,
                    update.location,
                    update.address,
                    update.ticket_url,
                    update.image_url,
                    Self::now(),
                    id,
                ],
            )
            .context("Failed to update concert")?;
        Ok(rows > 0)
    }

    pub fn delete_concert(&self, id: i64) -> Result<bool> {
        self.delete_by_id("concerts", id)
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// All photos in upload order.
    pub fn list_photos(&self) -> Result<Vec<Photo>> {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos ORDER BY created_at, id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let photos = stmt
            .query_map([], photo_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query photos")?;
        Ok(photos)
    }

    pub fn photos_by_category(&self, category: &str) -> Result<Vec<Photo>> {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE category = ?1 ORDER BY created_at, id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let photos = stmt
            .query_map(params![category], photo_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query photos by category")?;
        Ok(photos)
    }

    pub fn insert_photo(&self, photo: &NewPhoto) -> Result<i64> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO photos (
                title, description, category, image_key, image_url,
                thumbnail_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ",
                params![
                    photo.title,
                    photo.description,
                    photo.category,
                    photo.image_key,
                    photo.image_url,
                    photo.thumbnail_url,
                    now,
                ],
            )
            .context("Failed to insert photo")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_photo(&self, id: i64) -> Result<bool> {
        self.delete_by_id("photos", id)
    }

    // =========================================================================
    // Albums
    // =========================================================================

    /// All albums, oldest release first.
    pub fn list_albums(&self) -> Result<Vec<Album>> {
        let sql = format!("SELECT {ALBUM_COLUMNS} FROM albums ORDER BY release_year, id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let albums = stmt
            .query_map([], album_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query albums")?;
        Ok(albums)
    }

    pub fn get_album(&self, id: i64) -> Result<Option<Album>> {
        let sql = format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], album_from_row)
            .optional()
            .context("Failed to query album")
    }

    pub fn insert_album(&self, album: &NewAlbum) -> Result<i64> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO albums (
                title, description, release_year, spotify_id, spotify_url,
                cover_image_key, cover_image_url, track_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ",
                params![
                    album.title,
                    album.description,
                    album.release_year,
                    album.spotify_id,
                    album.spotify_url,
                    album.cover_image_key,
                    album.cover_image_url,
                    album.track_count.unwrap_or(0),
                    now,
                ],
            )
            .context("Failed to insert album")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Applies the provided fields only. Returns false if the row is missing.
    pub fn update_album(&self, id: i64, update: &AlbumUpdate) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "
            UPDATE albums SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                release_year = COALESCE(?3, release_year),
                spotify_id = COALESCE(?4, spotify_id),
                spotify_url = COALESCE(?5, spotify_url),
                cover_image_url = COALESCE(?6, cover_image_url),
                track_count = COALESCE(?7, track_count),
                updated_at = ?8
            WHERE id = ?9
            ",
                params![
                    update.title,
                    update.description,
                    update.release_year,
                    update.spotify_id,
                    update.spotify_url,
                    update.cover_image_url,
                    update.track_count,
                    Self::now(),
                    id,
                ],
            )
            .context("Failed to update album")?;
        Ok(rows > 0)
    }

    pub fn delete_album(&self, id: i64) -> Result<bool> {
        self.delete_by_id("albums", id)
    }

    // =========================================================================
    // Videos
    // =========================================================================

    pub fn list_videos(&self) -> Result<Vec<Video>> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at, id");
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let videos = stmt
            .query_map([], video_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query videos")?;
        Ok(videos)
    }

    pub fn insert_video(&self, video: &NewVideo) -> Result<i64> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO videos (
                title, description, youtube_id, youtube_url, thumbnail_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ",
                params![
                    video.title,
                    video.description,
                    video.youtube_id,
                    video.youtube_url,
                    video.thumbnail_url,
                    now,
                ],
            )
            .context("Failed to insert video")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_video(&self, id: i64) -> Result<bool> {
        self.delete_by_id("videos", id)
    }

    // =========================================================================
    // Contact submissions
    // =========================================================================

    pub fn list_contacts(&self) -> Result<Vec<ContactSubmission>> {
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions ORDER BY created_at, id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let contacts = stmt
            .query_map([], contact_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query contact submissions")?;
        Ok(contacts)
    }

    pub fn insert_contact(&self, contact: &NewContactSubmission) -> Result<i64> {
        self.conn
            .execute(
                "
            INSERT INTO contact_submissions (name, email, subject, message, read, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            ",
                params![
                    contact.name,
                    contact.email,
                    contact.subject,
                    contact.message,
                    Self::now(),
                ],
            )
            .context("Failed to insert contact submission")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn mark_contact_read(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "UPDATE contact_submissions SET read = 1 WHERE id = ?1",
                params![id],
            )
            .context("Failed to mark contact submission read")?;
        Ok(rows > 0)
    }

    pub fn delete_contact(&self, id: i64) -> Result<bool> {
        self.delete_by_id("contact_submissions", id)
    }

    // =========================================================================
    // File uploads
    // =========================================================================

    pub fn insert_file_upload(&self, upload: &NewFileUpload) -> Result<FileUpload> {
        let now = Self::now();
        self.conn
            .execute(
                "
            INSERT INTO file_uploads (
                user_id, file_name, file_key, file_url, mime_type, file_size, uploaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
                params![
                    upload.user_id,
                    upload.file_name,
                    upload.file_key,
                    upload.file_url,
                    upload.mime_type,
                    upload.file_size,
                    now,
                ],
            )
            .context("Failed to insert file upload")?;

        Ok(FileUpload {
            id: self.conn.last_insert_rowid(),
            user_id: upload.user_id,
            file_name: upload.file_name.clone(),
            file_key: upload.file_key.clone(),
            file_url: upload.file_url.clone(),
            mime_type: upload.mime_type.clone(),
            file_size: upload.file_size,
            uploaded_at: now,
        })
    }

    pub fn file_uploads_for_user(&self, user_id: i64) -> Result<Vec<FileUpload>> {
        let sql = format!(
            "SELECT {UPLOAD_COLUMNS} FROM file_uploads WHERE user_id = ?1 ORDER BY uploaded_at, id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let uploads = stmt
            .query_map(params![user_id], upload_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query file uploads")?;
        Ok(uploads)
    }

    // =========================================================================
    // Utility Methods
    // =========================================================================

    fn delete_by_id(&self, table: &'static str, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        let rows = self
            .conn
            .execute(&sql, params![id])
            .with_context(|| format!("Failed to delete from {table}"))?;
        if rows > 0 {
            debug!(table, id, "Deleted row");
        }
        Ok(rows > 0)
    }

    /// Returns the current Unix timestamp.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    /// Runs VACUUM to compact the database.
    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute("VACUUM", [])?;
        info!("Database vacuumed");
        Ok(())
    }

    /// Gets row counts and database size for debugging.
    pub fn stats(&self) -> Result<DbStats> {
        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            Ok(self.conn.query_row(&sql, [], |r| r.get(0))?)
        };

        let page_count: i64 = self.conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = self.conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;

        Ok(DbStats {
            concerts: count("concerts")?,
            photos: count("photos")?,
            albums: count("albums")?,
            videos: count("videos")?,
            contacts: count("contact_submissions")?,
            file_uploads: count("file_uploads")?,
            db_size_bytes: page_count * page_size,
        })
    }

    /// Handles database corruption by backing up and rebuilding.
    pub fn handle_corruption(path: &Path) -> Result<Self> {
        warn!("Handling potential database corruption at {:?}", path);

        let backup_path = path.with_extension("sqlite.corrupted");
        if path.exists() {
            std::fs::rename(path, &backup_path).with_context(|| {
                format!("Failed to backup corrupted database to {:?}", backup_path)
            })?;
            warn!("Backed up corrupted database to {:?}", backup_path);
        }

        Self::open(path)
    }
}

/// Database statistics for debugging and monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbStats {
    pub concerts: i64,
    pub photos: i64,
    pub albums: i64,
    pub videos: i64,
    pub contacts: i64,
    pub file_uploads: i64,
    pub db_size_bytes: i64,
}

// =========================================================================
// Row mapping
// =========================================================================

fn concert_from_row(row: &Row<'_>) -> rusqlite::Result<Concert> {
    Ok(Concert {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        location: row.get(5)?,
        address: row.get(6)?,
        ticket_url: row.get(7)?,
        image_key: row.get(8)?,
        image_url: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        image_key: row.get(4)?,
        image_url: row.get(5)?,
        thumbnail_url: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        release_year: row.get(3)?,
        spotify_id: row.get(4)?,
        spotify_url: row.get(5)?,
        cover_image_key: row.get(6)?,
        cover_image_url: row.get(7)?,
        track_count: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        youtube_id: row.get(3)?,
        youtube_url: row.get(4)?,
        thumbnail_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<ContactSubmission> {
    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn upload_from_row(row: &Row<'_>) -> rusqlite::Result<FileUpload> {
    Ok(FileUpload {
        id: row.get(0)?,
        user_id: row.get(1)?,
        file_name: row.get(2)?,
        file_key: row.get(3)?,
        file_url: row.get(4)?,
        mime_type: row.get(5)?,
        file_size: row.get(6)?,
        uploaded_at: row.get(7)?,
    })
}
