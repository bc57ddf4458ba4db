//! Keeping admin lists in step with the content store.

mod collection;
mod crud;
mod store_collection;

pub use collection::CollectionSync;
pub use crud::CrudCollaborator;
pub use store_collection::{StoreCollection, StoredResource};
