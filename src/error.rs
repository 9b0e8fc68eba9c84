use thiserror::Error;
use uuid::Uuid;

use crate::locale::UnknownCode;
use crate::model::EntityKind;

/// Errors surfaced by every catalog backend.
///
/// The taxonomy is part of the catalog contract: all three backends
/// report the same variant for the same structural failure, and none of
/// them swallows one. The single sanctioned silent recovery is the
/// locale-default fallback for absent optional fields, which never
/// produces an error at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The operation targeted a UUID absent from the store.
    #[error("no {kind} with id {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    /// An insert collided with an existing UUID.
    #[error("{kind} {id} already exists")]
    DuplicateIdentity { kind: EntityKind, id: Uuid },

    /// A translation or membership link points at a nonexistent entity.
    #[error("{kind} reference {id} does not resolve")]
    InvalidForeignReference { kind: EntityKind, id: Uuid },

    /// An entity failed construction-time validation, or a stored record
    /// is missing a required field.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A stored record cannot be reconstructed into a valid entity
    /// (malformed UUID, unparseable required code, unknown document
    /// version). Local corruption, not recoverable by fallback.
    #[error("unhandled conversion: {0}")]
    UnhandledConversion(String),

    /// A locale-code string is not in the recognized set.
    #[error(transparent)]
    UnknownCode(#[from] UnknownCode),

    /// Document-store I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Relational backend failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl CatalogError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    pub(crate) fn duplicate(kind: EntityKind, id: Uuid) -> Self {
        Self::DuplicateIdentity { kind, id }
    }

    pub(crate) fn dangling(kind: EntityKind, id: Uuid) -> Self {
        Self::InvalidForeignReference { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
