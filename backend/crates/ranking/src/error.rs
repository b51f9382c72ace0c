//! Ranking Error Types
//!
//! Ranking-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::{PersonNameError, UnknownPeriod, UserNameError};

/// Ranking-specific result type alias
pub type RankingResult<T> = Result<T, RankingError>;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("User not found")]
    UserNotFound,

    #[error("Lesson not found")]
    LessonNotFound,

    /// The user has no recorded completion for the lesson
    #[error("No result recorded for this user and lesson")]
    ResultNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    InvalidPeriod(#[from] UnknownPeriod),

    #[error("Invalid user name: {0}")]
    InvalidUserName(#[from] UserNameError),

    #[error("Invalid profile name: {0}")]
    InvalidPersonName(#[from] PersonNameError),

    #[error("User name already exists")]
    UserNameTaken,

    #[error("Experience counter would overflow")]
    ExperienceOverflow,

    /// Backing store failure, with enough context to diagnose without re-querying
    #[error("Store error in {operation} ({entity}): {source}")]
    Store {
        operation: &'static str,
        entity: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RankingError {
    /// `map_err` adapter that wraps a sqlx error with its operation and entity.
    ///
    /// ```ignore
    /// sqlx::query(..).execute(&pool).await
    ///     .map_err(RankingError::store("users.find_by_id", user_id))?;
    /// ```
    pub fn store(
        operation: &'static str,
        entity: impl fmt::Display,
    ) -> impl FnOnce(sqlx::Error) -> Self {
        let entity = entity.to_string();
        move |source| RankingError::Store {
            operation,
            entity,
            source,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RankingError::InvalidArgument(message.into())
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RankingError::UserNotFound
            | RankingError::LessonNotFound
            | RankingError::ResultNotFound => ErrorKind::NotFound,
            RankingError::InvalidArgument(_)
            | RankingError::InvalidPeriod(_)
            | RankingError::InvalidUserName(_)
            | RankingError::InvalidPersonName(_) => ErrorKind::BadRequest,
            RankingError::UserNameTaken | RankingError::ExperienceOverflow => ErrorKind::Conflict,
            RankingError::Store {
                source: sqlx::Error::PoolTimedOut | sqlx::Error::Io(_),
                ..
            } => ErrorKind::ServiceUnavailable,
            RankingError::Store { .. } | RankingError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to AppError; store and internal details stay out of the message
    pub fn to_app_error(&self) -> AppError {
        match self {
            RankingError::Store { operation, .. } => {
                AppError::new(self.kind(), "Storage failure").with_action(*operation)
            }
            RankingError::Internal(_) => AppError::internal("Internal error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            RankingError::Store {
                operation,
                entity,
                source,
            } => {
                tracing::error!(
                    operation = %operation,
                    entity = %entity,
                    error = %source,
                    "Ranking store error"
                );
            }
            RankingError::Internal(msg) => {
                tracing::error!(message = %msg, "Ranking internal error");
            }
            RankingError::ExperienceOverflow | RankingError::UserNameTaken => {
                tracing::warn!(error = %self, "Ranking conflict");
            }
            _ => {
                tracing::debug!(error = %self, "Ranking error");
            }
        }
    }
}

impl IntoResponse for RankingError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<RankingError> for AppError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Store {
                operation, source, ..
            } => AppError::from(source).with_action(operation),
            other => other.to_app_error().with_source(other),
        }
    }
}

