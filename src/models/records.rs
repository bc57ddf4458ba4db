//! Content records managed through the back-office.
//!
//! Every resource kind has a stored shape (with its generated `id` and
//! timestamps) and a `New*` insert shape carrying the caller-supplied fields.
//! Optional columns are `Option`s; required ones are checked by `validate()`
//! before anything is sent to the store.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// The resource kinds the back-office manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Concert,
    Photo,
    Album,
    Video,
    Contact,
    FileUpload,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concert => "concert",
            Self::Photo => "photo",
            Self::Album => "album",
            Self::Video => "video",
            Self::Contact => "contact message",
            Self::FileUpload => "file upload",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything stored under a numeric id.
pub trait Record {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Concert {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Unix timestamp of the event day.
    pub date: i64,
    pub time: Option<String>,
    pub location: String,
    pub address: Option<String>,
    pub ticket_url: Option<String>,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewConcert {
    pub title: String,
    pub description: Option<String>,
    pub date: i64,
    pub time: Option<String>,
    pub location: String,
    pub address: Option<String>,
    pub ticket_url: Option<String>,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
}

impl NewConcert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("location", &self.location)?;
        Ok(())
    }
}

/// Partial concert update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcertUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<i64>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub ticket_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub image_key: String,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPhoto {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub image_key: String,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
}

impl NewPhoto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("category", &self.category)?;
        require("image_url", &self.image_url)?;
        require("image_key", &self.image_key)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: i32,
    pub spotify_id: Option<String>,
    pub spotify_url: Option<String>,
    pub cover_image_key: Option<String>,
    pub cover_image_url: Option<String>,
    pub track_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAlbum {
    pub title: String,
    pub description: Option<String>,
    pub release_year: i32,
    pub spotify_id: Option<String>,
    pub spotify_url: Option<String>,
    pub cover_image_key: Option<String>,
    pub cover_image_url: Option<String>,
    pub track_count: Option<i32>,
}

impl NewAlbum {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        if self.release_year <= 0 {
            return Err(ValidationError::InvalidField {
                field: "release_year",
                reason: "must be a positive year",
            });
        }
        if matches!(self.track_count, Some(n) if n < 0) {
            return Err(ValidationError::InvalidField {
                field: "track_count",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub spotify_id: Option<String>,
    pub spotify_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub track_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub youtube_id: String,
    pub youtube_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub youtube_id: String,
    pub youtube_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)").expect("valid regex")
});

/// Extracts the video id from a `youtube.com/watch?v=` or `youtu.be/` link.
pub fn youtube_id_from_url(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl NewVideo {
    /// Fills `youtube_id` from `youtube_url` when only the link was given.
    pub fn resolve_youtube_id(&mut self) {
        if !self.youtube_id.trim().is_empty() {
            return;
        }
        if let Some(id) = self.youtube_url.as_deref().and_then(youtube_id_from_url) {
            self.youtube_id = id.to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("youtube_id", &self.youtube_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl NewContactSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        if !looks_like_email(&self.email) {
            return Err(ValidationError::InvalidField {
                field: "email",
                reason: "not an e-mail address",
            });
        }
        require("subject", &self.subject)?;
        require("message", &self.message)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFileUpload {
    pub user_id: i64,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

impl_record!(Concert, Photo, Album, Video, ContactSubmission, FileUpload);

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_requires_fields() {
        let mut photo = NewPhoto {
            title: "Live".into(),
            category: "concert".into(),
            image_url: "https://cdn/x.jpg".into(),
            image_key: "photos/x.jpg".into(),
            ..Default::default()
        };
        assert!(photo.validate().is_ok());

        photo.image_key = "  ".into();
        assert_eq!(
            photo.validate(),
            Err(ValidationError::MissingField("image_key"))
        );
    }

    #[test]
    fn test_album_rejects_bad_year() {
        let album = NewAlbum {
            title: "Psykobazar".into(),
            release_year: 0,
            ..Default::default()
        };
        assert!(matches!(
            album.validate(),
            Err(ValidationError::InvalidField {
                field: "release_year",
                ..
            })
        ));
    }

    #[test]
    fn test_contact_email_check() {
        let mut contact = NewContactSubmission {
            name: "Ana".into(),
            email: "ana@example.org".into(),
            subject: "Booking".into(),
            message: "Hello".into(),
        };
        assert!(contact.validate().is_ok());

        for bad in ["ana", "@example.org", "ana@", "ana@localhost", "a@b@c.d"] {
            contact.email = bad.into();
            assert!(contact.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_youtube_id_extraction() {
        assert_eq!(
            youtube_id_from_url("https://www.youtube.com/watch?v=EbF3pTf5dEI&t=10"),
            Some("EbF3pTf5dEI")
        );
        assert_eq!(
            youtube_id_from_url("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_id_from_url("https://vimeo.com/123"), None);
    }

    #[test]
    fn test_video_resolves_id_from_url() {
        let mut video = NewVideo {
            title: "Clip".into(),
            youtube_url: Some("https://youtu.be/dQw4w9WgXcQ".into()),
            ..Default::default()
        };
        assert!(video.validate().is_err());
        video.resolve_youtube_id();
        assert_eq!(video.youtube_id, "dQw4w9WgXcQ");
        assert!(video.validate().is_ok());
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::Contact.to_string(), "contact message");
    }
}
