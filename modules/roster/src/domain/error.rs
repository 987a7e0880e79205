use thiserror::Error;

use crate::contract::model::EntityKind;
use crate::domain::credentials::HashError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Referenced group {id} does not exist")]
    UnknownGroup { id: i32 },

    #[error("Credential rejected: {message}")]
    Credential { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn group_not_found(id: i32) -> Self {
        Self::not_found(EntityKind::Group, id)
    }

    pub fn member_not_found(id: i32) -> Self {
        Self::not_found(EntityKind::Member, id)
    }

    pub fn unknown_group(id: i32) -> Self {
        Self::UnknownGroup { id }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Wrap a repository failure, keeping the whole context chain.
    pub fn store(e: anyhow::Error) -> Self {
        Self::database(format!("{e:#}"))
    }
}

impl From<HashError> for DomainError {
    fn from(e: HashError) -> Self {
        Self::credential(e.to_string())
    }
}
