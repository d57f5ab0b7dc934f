//! Error taxonomy and its HTTP mapping.

use axum::{http::StatusCode, Json};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::DbPool;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "Account with this email already exists")]
    pub error: String,
    #[schema(example = "DUPLICATE_KEY")]
    pub code: String,
    /// Offending request field, when the failure is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "email")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn internal(error: impl Into<String>, code: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self::new(error, code)),
        )
    }

    pub fn db_error() -> (StatusCode, Json<Self>) {
        Self::internal("Database error", "DB_ERROR")
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("A record with this {field} already exists")]
    DuplicateKey { field: String },

    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Score {score} is outside the allowed range 0..={max_points}")]
    ScoreOutOfRange { score: f64, max_points: f64 },

    #[error("Minimum points {min} exceed maximum points {max}")]
    InvalidPointRange { min: i32, max: i32 },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Insufficient privileges for this operation")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::Validation { .. }
            | DomainError::ScoreOutOfRange { .. }
            | DomainError::InvalidPointRange { .. } => StatusCode::BAD_REQUEST,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::AccountInactive | DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::DuplicateKey { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::DuplicateKey { .. } => "DUPLICATE_KEY",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::ScoreOutOfRange { .. } => "SCORE_OUT_OF_RANGE",
            DomainError::InvalidPointRange { .. } => "INVALID_POINT_RANGE",
            DomainError::InvalidCredentials => "INVALID_CREDENTIALS",
            DomainError::AccountInactive => "ACCOUNT_INACTIVE",
            DomainError::Forbidden => "FORBIDDEN",
            DomainError::Database(_) => "DB_ERROR",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::Validation { field, .. } | DomainError::DuplicateKey { field } => {
                Some(field)
            }
            DomainError::ScoreOutOfRange { .. } => Some("score"),
            DomainError::InvalidPointRange { .. } => Some("min_points"),
            _ => None,
        }
    }
}

impl From<DomainError> for (StatusCode, Json<ApiError>) {
    fn from(err: DomainError) -> Self {
        if let DomainError::Database(detail) = &err {
            error!(error = %detail, "Database operation failed");
            return ApiError::db_error();
        }

        let mut body = ApiError::new(err.to_string(), err.code());
        if let Some(field) = err.field() {
            body = body.with_field(field);
        }
        (err.status(), Json(body))
    }
}

impl From<DieselError> for DomainError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => DomainError::not_found("Record"),
            DieselError::DatabaseError(kind, info) => {
                let constraint = info.constraint_name().unwrap_or_default();
                match kind {
                    DatabaseErrorKind::UniqueViolation => DomainError::DuplicateKey {
                        field: unique_field(constraint),
                    },
                    DatabaseErrorKind::ForeignKeyViolation => {
                        DomainError::not_found(referenced_entity(constraint))
                    }
                    DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation => {
                        DomainError::validation(
                            constraint.strip_suffix("_check").unwrap_or(constraint),
                            info.message().to_string(),
                        )
                    }
                    _ => DomainError::Database(info.message().to_string()),
                }
            }
            other => DomainError::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let first = field_errors
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                (field.to_string(), message)
            });

        match first {
            Some((field, message)) => {
                DomainError::validation(field, format!("Validation error: {}", message))
            }
            None => DomainError::validation("body", format!("Validation error: {}", errors)),
        }
    }
}

/// `accounts_email_key` -> `email`
fn unique_field(constraint: &str) -> String {
    let stem = constraint.strip_suffix("_key").unwrap_or(constraint);
    stem.split_once('_')
        .map(|(_, field)| field)
        .unwrap_or(stem)
        .to_string()
}

/// `department_id_fkey` -> `department_id`
fn referenced_entity(constraint: &str) -> String {
    if constraint.is_empty() {
        return "Referenced record".to_string();
    }
    constraint
        .strip_suffix("_fkey")
        .unwrap_or(constraint)
        .to_string()
}

/// Diesel failures become a logged 500 unless they classify as a domain error.
pub fn db_err(err: DieselError) -> (StatusCode, Json<ApiError>) {
    DomainError::from(err).into()
}

pub fn get_db_conn(
    pool: &DbPool,
) -> Result<
    diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>,
    (StatusCode, Json<ApiError>),
> {
    pool.get().map_err(|e| {
        error!(error = %e, "Database connection error");
        ApiError::internal("Database connection error", "DB_CONNECTION_ERROR")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DomainError::validation("name", "required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::DuplicateKey {
                field: "email".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::not_found("Document").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DomainError::conflict("already approved").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DomainError::AccountInactive.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DomainError::ScoreOutOfRange {
                score: 11.0,
                max_points: 10.0
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_credentials_and_inactive_are_distinct() {
        assert_ne!(
            DomainError::InvalidCredentials.code(),
            DomainError::AccountInactive.code()
        );
    }

    #[test]
    fn test_into_api_error_carries_field() {
        let (status, Json(body)) = <(StatusCode, Json<ApiError>)>::from(DomainError::DuplicateKey {
            field: "email".into(),
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "DUPLICATE_KEY");
        assert_eq!(body.field.as_deref(), Some("email"));
    }

    #[test]
    fn test_database_error_is_not_leaked() {
        let (status, Json(body)) =
            <(StatusCode, Json<ApiError>)>::from(DomainError::Database("relation missing".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("relation"));
    }

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        let err = DomainError::from(DieselError::NotFound);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_constraint_name_parsing() {
        assert_eq!(unique_field("accounts_email_key"), "email");
        assert_eq!(referenced_entity("department_id_fkey"), "department_id");
        assert_eq!(referenced_entity(""), "Referenced record");
    }
}
