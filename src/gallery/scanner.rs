//! Builds gallery items from a photo directory.
//!
//! Layout expected under the root:
//! - each top-level directory is a category
//! - each image directly inside a category is a standalone item
//! - each sub-directory of a category is one item whose sub-items are its
//!   images (name order); its first image is the primary media

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::task;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::models::{GalleryItem, MediaKind};

/// Configuration for the media scanner.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Prefix used for media references instead of absolute paths,
    /// e.g. `/images/photos`.
    pub url_prefix: Option<String>,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

pub struct MediaScanner {
    config: ScanConfig,
}

impl MediaScanner {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans `root` on the blocking pool.
    pub async fn scan(&self, root: &Path) -> Result<Vec<GalleryItem>> {
        let root = root.to_path_buf();
        let config = self.config.clone();
        task::spawn_blocking(move || Self::scan_sync(&root, &config))
            .await
            .context("Scan task panicked")?
    }

    pub fn scan_sync(root: &Path, config: &ScanConfig) -> Result<Vec<GalleryItem>> {
        info!("Indexing gallery directory {:?}", root);
        if !root.is_dir() {
            anyhow::bail!("Gallery root is not a directory: {:?}", root);
        }

        let mut items = Vec::new();
        let mut next_id = 1i64;

        for category_dir in Self::children(root, config) {
            if !category_dir.is_dir() {
                trace!(?category_dir, "Skipping file outside any category");
                continue;
            }
            let category = Self::display_name(&category_dir);

            for entry in Self::children(&category_dir, config) {
                if entry.is_dir() {
                    let images = Self::images_in(&entry, config);
                    let Some(first) = images.first() else {
                        debug!(?entry, "Empty photo set, skipping");
                        continue;
                    };
                    let media = Self::reference(root, first, config);
                    let sub_items: Vec<String> = images
                        .iter()
                        .map(|path| Self::reference(root, path, config))
                        .collect();
                    items.push(
                        GalleryItem::new(next_id, Self::display_name(&entry), &category, media)
                            .with_sub_items(sub_items),
                    );
                    next_id += 1;
                } else if Self::is_image(&entry) {
                    let media = Self::reference(root, &entry, config);
                    items.push(GalleryItem::new(
                        next_id,
                        Self::display_name(&entry),
                        &category,
                        media,
                    ));
                    next_id += 1;
                }
            }
        }

        info!("Indexed {} gallery items", items.len());
        Ok(items)
    }

    /// Immediate children of `dir`, sorted by file name. Unreadable entries
    /// are logged and skipped.
    fn children(dir: &Path, config: &ScanConfig) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(config.follow_symlinks)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    let hidden = entry
                        .file_name()
                        .to_str()
                        .map(|name| name.starts_with('.'))
                        .unwrap_or(false);
                    if !hidden {
                        paths.push(entry.into_path());
                    }
                }
                Err(e) => warn!("Error walking {:?}: {}", dir, e),
            }
        }
        paths
    }

    fn images_in(dir: &Path, config: &ScanConfig) -> Vec<PathBuf> {
        Self::children(dir, config)
            .into_iter()
            .filter(|path| path.is_file() && Self::is_image(path))
            .collect()
    }

    fn is_image(path: &Path) -> bool {
        MediaKind::from_path(path) == Some(MediaKind::Image)
    }

    fn display_name(path: &Path) -> String {
        path.file_stem()
            .or_else(|| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn reference(root: &Path, path: &Path, config: &ScanConfig) -> String {
        match (&config.url_prefix, path.strip_prefix(root)) {
            (Some(prefix), Ok(relative)) => {
                let relative: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("{}/{}", prefix.trim_end_matches('/'), relative.join("/"))
            }
            _ => path.to_string_lossy().into_owned(),
        }
    }
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::GalleryIndex;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    fn layout(root: &Path) {
        let portraits = root.join("Portraits");
        let live = root.join("Live");
        let set = live.join("mediteraneo");
        fs::create_dir_all(&portraits).unwrap();
        fs::create_dir_all(&set).unwrap();

        touch(&portraits.join("band.png"));
        touch(&portraits.join("notes.txt"));
        touch(&live.join("festival.jpg"));
        touch(&set.join("m2.png"));
        touch(&set.join("m1.png"));
        touch(&set.join(".hidden.png"));
        fs::create_dir_all(live.join("empty")).unwrap();
        touch(&root.join("stray.png"));
    }

    #[test]
    fn test_scan_layout() {
        let dir = tempdir().unwrap();
        layout(dir.path());

        let config = ScanConfig {
            url_prefix: Some("/images/photos/".into()),
            ..Default::default()
        };
        let items = MediaScanner::scan_sync(dir.path(), &config).unwrap();

        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["festival", "mediteraneo", "band"]);

        let set = &items[1];
        assert_eq!(set.category, "Live");
        assert_eq!(
            set.sub_items,
            vec![
                "/images/photos/Live/mediteraneo/m1.png",
                "/images/photos/Live/mediteraneo/m2.png",
            ]
        );
        assert_eq!(set.media, "/images/photos/Live/mediteraneo/m1.png");

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_scanned_set_opens_on_first_image() {
        let dir = tempdir().unwrap();
        layout(dir.path());
        let items = MediaScanner::scan_sync(dir.path(), &ScanConfig::default()).unwrap();
        let set = items.iter().find(|i| i.has_sub_items()).unwrap();

        let resolved = GalleryIndex::resolve_group(&items, set).unwrap();
        assert_eq!(resolved.group.len(), 2);
        assert_eq!(resolved.start, 0);
    }

    #[test]
    fn test_children_sorted_without_hidden() {
        let dir = tempdir().unwrap();
        layout(dir.path());
        let set = dir.path().join("Live").join("mediteraneo");

        let names: Vec<String> = MediaScanner::children(&set, &ScanConfig::default())
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["m1.png", "m2.png"]);

        let missing = dir.path().join("nope");
        assert!(MediaScanner::children(&missing, &ScanConfig::default()).is_empty());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(MediaScanner::scan_sync(&missing, &ScanConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_async_scan() {
        let dir = tempdir().unwrap();
        layout(dir.path());
        let items = MediaScanner::new().scan(dir.path()).await.unwrap();
        assert_eq!(items.len(), 3);
    }
}
