//! Local mirror of a remote collection.
//!
//! The mirror is only ever replaced wholesale by `load`, or shrunk by a
//! successful `remove`. Failed mutations leave it exactly as it was.
//! Concurrent `create` calls each trigger their own reload and the last one
//! to finish determines what is visible.

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::crud::CrudCollaborator;
use crate::error::RemoteOperationError;
use crate::models::Record;

pub struct CollectionSync<C: CrudCollaborator> {
    collaborator: C,
    mirror: RwLock<Vec<C::Record>>,
}

impl<C: CrudCollaborator> CollectionSync<C> {
    /// Starts with an empty mirror; call `load` to populate it.
    pub fn new(collaborator: C) -> Self {
        Self {
            collaborator,
            mirror: RwLock::new(Vec::new()),
        }
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    /// Fetches the whole collection and replaces the mirror with it.
    ///
    /// An unreachable store yields an empty list instead of an error.
    pub async fn load(&self) -> Vec<C::Record> {
        let kind = self.collaborator.kind();
        let records = match self.collaborator.list().await {
            Ok(records) => {
                debug!(%kind, count = records.len(), "Collection loaded");
                records
            }
            Err(e) => {
                warn!(%kind, error = %e, "Collection load failed; showing empty list");
                Vec::new()
            }
        };

        *self.mirror.write() = records.clone();
        records
    }

    /// Creates a record remotely, then reloads to pick up the stored row.
    pub async fn create(&self, fields: C::Fields) -> Result<(), RemoteOperationError> {
        let kind = self.collaborator.kind();
        let id = self.collaborator.create(fields).await.map_err(|e| {
            warn!(%kind, error = %e, "Create failed");
            e
        })?;

        info!(%kind, id, "Created");
        self.load().await;
        Ok(())
    }

    /// Deletes remotely, then drops the entry from the mirror.
    pub async fn remove(&self, id: i64) -> Result<(), RemoteOperationError> {
        let kind = self.collaborator.kind();
        self.collaborator.delete(id).await.map_err(|e| {
            warn!(%kind, id, error = %e, "Delete failed");
            e
        })?;

        self.mirror.write().retain(|record| record.id() != id);
        info!(%kind, id, "Deleted");
        Ok(())
    }

    /// Snapshot of the mirror in the order the store returned it.
    pub fn records(&self) -> Vec<C::Record> {
        self.mirror.read().clone()
    }

    pub fn get(&self, id: i64) -> Option<C::Record> {
        self.mirror.read().iter().find(|r| r.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.mirror.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirror.read().is_empty()
    }
}
