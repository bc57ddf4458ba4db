//! Persistent content storage.

mod content_store;

pub use content_store::{ContentStore, DbStats};

use std::sync::Arc;

use parking_lot::Mutex;

/// Store handle shared between blocking tasks.
pub type SharedStore = Arc<Mutex<ContentStore>>;

pub fn shared(store: ContentStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}
