//! Runtime configuration resolved from the environment.
//!
//! Variables:
//! - `VRACK_DB`: SQLite database path (default `<config_dir>/content.sqlite`)
//! - `VRACK_STORAGE_DIR`: root of stored files (default `<data_dir>/storage`)
//! - `VRACK_PUBLIC_URL`: base URL stored files are served under (default `/files`)
//! - `VRACK_MEDIA_DIR`: photo directory to index into the gallery (optional)
//! - `VRACK_ROLE`: `user` or `admin`; unset means anonymous
//! - `VRACK_USER_ID`: numeric user id (default 0)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;

use crate::models::{Identity, Role};
use crate::store::ContentStore;

pub const DEFAULT_PUBLIC_URL: &str = "/files";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub db_path: PathBuf,
    pub storage_dir: PathBuf,
    pub public_url: String,
    pub media_dir: Option<PathBuf>,
    pub identity: Identity,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration through `lookup` instead of the process
    /// environment. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let db_path = match var("VRACK_DB") {
            Some(path) => PathBuf::from(path),
            None => ContentStore::default_db_path()?,
        };
        let storage_dir = match var("VRACK_STORAGE_DIR") {
            Some(path) => PathBuf::from(path),
            None => default_storage_dir()?,
        };
        let public_url = var("VRACK_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
        let media_dir = var("VRACK_MEDIA_DIR").map(PathBuf::from);

        let user_id = match var("VRACK_USER_ID") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("VRACK_USER_ID is not a number: {raw:?}"))?,
            None => 0,
        };
        let identity = match var("VRACK_ROLE") {
            None => Identity::anonymous(),
            Some(raw) => match Role::parse(&raw) {
                Some(Role::Admin) => Identity::admin(user_id),
                Some(Role::User) => Identity::user(user_id),
                None => bail!("VRACK_ROLE must be `user` or `admin`, got {raw:?}"),
            },
        };

        Ok(Self {
            db_path,
            storage_dir,
            public_url,
            media_dir,
            identity,
        })
    }
}

fn default_storage_dir() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("", "", "vrack").context("Failed to determine project directories")?;
    Ok(proj_dirs.data_dir().join("storage"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("VRACK_DB", "/tmp/site.sqlite"),
            ("VRACK_STORAGE_DIR", "/tmp/storage"),
            ("VRACK_PUBLIC_URL", "https://cdn.example/files"),
            ("VRACK_MEDIA_DIR", "/srv/photos"),
            ("VRACK_ROLE", "admin"),
            ("VRACK_USER_ID", "12"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/site.sqlite"));
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/storage"));
        assert_eq!(config.public_url, "https://cdn.example/files");
        assert_eq!(config.media_dir, Some(PathBuf::from("/srv/photos")));
        assert_eq!(config.identity, Identity::admin(12));
    }

    #[test]
    fn test_role_unset_is_anonymous() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("VRACK_DB", "/tmp/site.sqlite"),
            ("VRACK_STORAGE_DIR", "/tmp/storage"),
            ("VRACK_ROLE", "  "),
        ]))
        .unwrap();
        assert_eq!(config.identity, Identity::anonymous());
        assert_eq!(config.public_url, DEFAULT_PUBLIC_URL);
        assert_eq!(config.media_dir, None);
    }

    #[test]
    fn test_bad_values_fail() {
        let base = [
            ("VRACK_DB", "/tmp/site.sqlite"),
            ("VRACK_STORAGE_DIR", "/tmp/storage"),
        ];

        let mut bad_role = base.to_vec();
        bad_role.push(("VRACK_ROLE", "root"));
        assert!(SiteConfig::from_lookup(lookup(&bad_role)).is_err());

        let mut bad_id = base.to_vec();
        bad_id.push(("VRACK_USER_ID", "twelve"));
        assert!(SiteConfig::from_lookup(lookup(&bad_id)).is_err());
    }

    #[test]
    fn test_defaults_use_project_dirs() {
        if ProjectDirs::from("", "", "vrack").is_none() {
            return;
        }
        let config = SiteConfig::from_lookup(|_| None).unwrap();
        assert!(config.db_path.ends_with("content.sqlite"));
        assert!(config.storage_dir.ends_with("storage"));
    }
}
