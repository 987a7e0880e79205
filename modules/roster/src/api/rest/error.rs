use axum::http::StatusCode;

use crate::api::problem::{Problem, ProblemResponse};
use crate::contract::model::EntityKind;
use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Id of the span handling the current request, if any
pub fn current_trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let trace_id = current_trace_id();
    match e {
        DomainError::NotFound { entity, id } => {
            let code = match entity {
                EntityKind::Group => ErrorCode::roster_group_not_found_v1,
                EntityKind::Member => ErrorCode::roster_member_not_found_v1,
            };
            code.to_response(
                format!("{entity} with id {id} was not found"),
                instance,
                trace_id,
            )
        }
        DomainError::UnknownGroup { id } => ErrorCode::roster_validation_v1.to_response(
            format!("group_id: group {id} does not exist"),
            instance,
            trace_id,
        ),
        DomainError::Credential { message } => ErrorCode::roster_credential_invalid_v1
            .to_response(format!("secret: {message}"), instance, trace_id),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            ErrorCode::roster_internal_database_v1.to_response(
                "An internal database error occurred",
                instance,
                trace_id,
            )
        }
    }
}

/// Map an axum extractor rejection to a Problem.
///
/// Client-side decoding failures (bad JSON, wrong types, missing fields,
/// unparsable path or query) become 422. Statuses that carry their own
/// meaning, such as 413, pass through.
pub fn map_rejection(status: StatusCode, detail: String, instance: &str) -> ProblemResponse {
    let trace_id = current_trace_id();
    if status == StatusCode::PAYLOAD_TOO_LARGE || status.is_server_error() {
        let mut problem = Problem::new(
            status,
            status.canonical_reason().unwrap_or("Error"),
            detail,
        )
        .with_instance(instance);
        if let Some(id) = trace_id {
            problem = problem.with_trace_id(id);
        }
        return ProblemResponse(problem);
    }
    ErrorCode::roster_validation_v1.to_response(detail, instance, trace_id)
}
