//! Error catalog for the roster module.
//!
//! Every failure the HTTP surface can report has one stable code here. The
//! code doubles as the last segment of the problem `type` URI.

use axum::http::StatusCode;

use crate::api::problem::{Problem, ProblemResponse};

/// Static error definition from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    roster_group_not_found_v1,
    roster_member_not_found_v1,
    roster_validation_v1,
    roster_credential_invalid_v1,
    roster_internal_database_v1,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::roster_group_not_found_v1,
        ErrorCode::roster_member_not_found_v1,
        ErrorCode::roster_validation_v1,
        ErrorCode::roster_credential_invalid_v1,
        ErrorCode::roster_internal_database_v1,
    ];

    pub const fn def(self) -> ErrDef {
        match self {
            ErrorCode::roster_group_not_found_v1 => ErrDef {
                status: 404,
                title: "Group not found",
                code: "roster.group.not_found.v1",
                type_url: "https://errors.example.com/roster.group.not_found.v1",
            },
            ErrorCode::roster_member_not_found_v1 => ErrDef {
                status: 404,
                title: "Member not found",
                code: "roster.member.not_found.v1",
                type_url: "https://errors.example.com/roster.member.not_found.v1",
            },
            ErrorCode::roster_validation_v1 => ErrDef {
                status: 422,
                title: "Validation error",
                code: "roster.validation.v1",
                type_url: "https://errors.example.com/roster.validation.v1",
            },
            ErrorCode::roster_credential_invalid_v1 => ErrDef {
                status: 422,
                title: "Invalid secret",
                code: "roster.credential.invalid.v1",
                type_url: "https://errors.example.com/roster.credential.invalid.v1",
            },
            ErrorCode::roster_internal_database_v1 => ErrDef {
                status: 500,
                title: "Internal error",
                code: "roster.internal.database.v1",
                type_url: "https://errors.example.com/roster.internal.database.v1",
            },
        }
    }

    pub const fn status(self) -> u16 {
        self.def().status
    }

    pub fn to_problem(self, detail: impl Into<String>) -> Problem {
        self.def().to_problem(detail)
    }

    /// Build a response carrying the request path and, if known, the trace id.
    pub fn to_response(
        self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> ProblemResponse {
        let mut problem = self.to_problem(detail).with_instance(instance);
        if let Some(id) = trace_id {
            problem = problem.with_trace_id(id);
        }
        ProblemResponse(problem)
    }
}
