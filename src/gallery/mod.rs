//! Public photo gallery: grouping, lightbox navigation and keyboard input.
//!
//! This module provides:
//! - `GalleryIndex` - Resolves the group a clicked item opens on
//! - `LightboxController` - Open/closed state and in-group navigation
//! - `LightboxSession` - Lightbox with scoped keyboard bindings
//! - `MediaScanner` - Indexes a photo directory into gallery items

pub mod index;
pub mod keybindings;
pub mod lightbox;
pub mod scanner;
pub mod session;

pub use index::{CategoryFilter, GalleryIndex, Group, Grouping, ResolvedGroup};
pub use keybindings::{KeyInput, KeyboardHub, LightboxAction, ListenerGuard};
pub use lightbox::{LightboxController, LightboxState, LightboxView};
pub use scanner::{MediaScanner, ScanConfig};
pub use session::LightboxSession;
