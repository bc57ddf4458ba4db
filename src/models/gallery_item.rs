use std::path::Path;

use super::records::Photo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" | "svg" => {
                Some(Self::Image)
            }
            "webm" | "mp4" | "mkv" | "avi" | "mov" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// One entry of the public gallery.
///
/// When `sub_items` is non-empty the item stands for a bound sub-gallery
/// (an event's photo set) and `media` is expected to be one of its paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub media: String,
    pub sub_items: Vec<String>,
}

impl GalleryItem {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        category: impl Into<String>,
        media: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            category: category.into(),
            media: media.into(),
            sub_items: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sub_items<I, S>(mut self, sub_items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_items = sub_items.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a standalone gallery item from a stored photo row.
    pub fn from_photo(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            title: photo.title.clone(),
            description: photo.description.clone().unwrap_or_default(),
            category: photo.category.clone(),
            media: photo.image_url.clone(),
            sub_items: Vec::new(),
        }
    }

    pub fn has_sub_items(&self) -> bool {
        !self.sub_items.is_empty()
    }

    /// Filename component of the primary media reference.
    pub fn media_file_name(&self) -> &str {
        file_name_of(&self.media)
    }
}

/// One renderable unit inside a lightbox group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub media: String,
}

impl Slide {
    pub fn media_file_name(&self) -> &str {
        file_name_of(&self.media)
    }
}

impl From<&GalleryItem> for Slide {
    fn from(item: &GalleryItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            media: item.media.clone(),
        }
    }
}

/// Last `/`-separated component of a media reference (path or URL).
pub fn file_name_of(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
