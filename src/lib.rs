//! Backend for the VRACK band site: photo gallery with a keyboard-driven
//! lightbox, and an admin back-office over concerts, photos, albums, videos
//! and contact messages.

pub mod admin;
pub mod app;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

pub use app::SiteApp;
pub use config::SiteConfig;
pub use error::{AccessDenied, GalleryError, RemoteOperationError, ValidationError};
