//! Error kinds shared across the gallery, sync and admin layers.

use thiserror::Error;

use crate::models::ResourceKind;

/// Contract violations in the gallery/lightbox logic.
///
/// These indicate a caller bug (for example opening the lightbox without
/// checking that a group could be formed) and are not expected at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("no gallery group could be formed")]
    EmptyGroup,

    #[error("cannot {operation}: {reason}")]
    InvalidTransition {
        operation: &'static str,
        reason: String,
    },

    #[error("lightbox is not open")]
    NotOpen,
}

/// Failure of a call to a remote collaborator (CRUD store or file storage).
///
/// Expected at runtime; callers surface it as a notification and leave
/// their local state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteOperationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{kind} #{id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("rejected: {0}")]
    Rejected(String),
}

impl From<anyhow::Error> for RemoteOperationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Transport(format!("{:#}", err))
    }
}

/// Required-field validation for incoming record fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// The admin surface was requested without an admin identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("access denied")]
pub struct AccessDenied;
