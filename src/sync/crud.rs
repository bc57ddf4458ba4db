//! The request/response contract of a remote collection.

use async_trait::async_trait;

use crate::error::RemoteOperationError;
use crate::models::{Record, ResourceKind};

/// A remote CRUD endpoint for one resource kind.
///
/// Implementations decide ordering of `list` and enforce authorization;
/// callers only see `RemoteOperationError` on failure.
#[async_trait]
pub trait CrudCollaborator: Send + Sync {
    type Record: Record + Clone + Send + Sync + 'static;
    type Fields: Send + 'static;

    fn kind(&self) -> ResourceKind;

    async fn list(&self) -> Result<Vec<Self::Record>, RemoteOperationError>;

    /// Creates a record and returns its generated id.
    async fn create(&self, fields: Self::Fields) -> Result<i64, RemoteOperationError>;

    async fn delete(&self, id: i64) -> Result<(), RemoteOperationError>;
}
