use thiserror::Error;

use crate::contract::model::EntityKind;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl RosterError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for RosterError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { entity, id } => Self::not_found(entity, id),
            UnknownGroup { id } => {
                Self::validation(format!("group_id: group {} does not exist", id))
            }
            Credential { message } => Self::validation(format!("secret: {}", message)),
            Database { .. } => Self::internal(),
        }
    }
}
