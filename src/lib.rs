//! Ledger Tracker is a JSON backend for tracking personal income and expenses.
//!
//! Users register, log in and record transactions. Each user carries a cached
//! balance that is adjusted whenever a transaction is created, expenses that
//! exceed the balance are rejected, and the ledger can be summarised per month
//! or per expense category.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod money;
mod pagination;
mod report;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_id};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_SIZE, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::{
    NewTransaction, Transaction, TransactionType, apply_to_balance, create_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username and password did not match a registered user.
    #[error("Invalid credentials, try again")]
    InvalidCredentials,

    /// The user exists but has been deactivated.
    #[error("Account disabled, contact admin")]
    AccountDisabled,

    /// The request did not carry a valid auth cookie.
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    /// The username is empty, too long or contains non-alphanumeric characters.
    #[error("The username should only contain alphanumeric characters")]
    InvalidUsername,

    /// The username is already registered.
    #[error("a user with the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The password is shorter or longer than allowed.
    #[error("password must be between {min} and {max} characters long")]
    InvalidPasswordLength {
        /// The minimum number of characters.
        min: usize,
        /// The maximum number of characters.
        max: usize,
    },

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session token could not be written to the auth cookie.
    #[error("could not encode the auth token: {0}")]
    TokenError(String),

    /// A transaction category was empty after trimming whitespace.
    #[error("category may not be blank")]
    EmptyCategory,

    /// A transaction category was longer than the allowed number of characters.
    #[error("category must be at most {0} characters long")]
    CategoryTooLong(usize),

    /// A transaction amount was zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// A transaction amount has too many digits to be stored exactly.
    #[error("amount must have at most {max_integer_digits} digits before and {max_decimal_places} digits after the decimal point")]
    AmountOutOfRange {
        /// The maximum number of digits before the decimal point.
        max_integer_digits: u32,
        /// The maximum number of digits after the decimal point.
        max_decimal_places: u32,
    },

    /// An expense was larger than the balance of the user creating it.
    #[error("Expense amount is greater than balance")]
    InsufficientBalance,

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidPayload(String),

    /// The query string could not be parsed.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    /// The requested page is outside the range of available pages.
    #[error("Invalid page.")]
    InvalidPage,

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are reported as not found so that
    /// clients cannot learn whether they exist.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The user's balance could not be updated after a transaction was
    /// inserted.
    ///
    /// The insert is rolled back when this error is returned.
    #[error("could not update the balance for user {0}: {1}")]
    BalanceUpdateFailed(UserID, String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidQuery(rejection.to_string())
    }
}

// Only numeric IDs can name a resource, anything else names nothing.
impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("rejected path parameters: {}", rejection.body_text());
        Error::NotFound
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::AccountDisabled | Error::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Error::InvalidUsername
            | Error::DuplicateUsername(_)
            | Error::InvalidPasswordLength { .. }
            | Error::TooWeak(_)
            | Error::EmptyCategory
            | Error::CategoryTooLong(_)
            | Error::NonPositiveAmount
            | Error::AmountOutOfRange { .. }
            | Error::InsufficientBalance
            | Error::InvalidPayload(_)
            | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPage | Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenError(_)
            | Error::BalanceUpdateFailed(_, _)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are not intended to be shown to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::{Error, UserID};

    async fn into_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn insufficient_balance_is_bad_request_with_message() {
        let (status, body) = into_json(Error::InsufficientBalance).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Expense amount is greater than balance");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, _) = into_json(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body) = into_json(Error::BalanceUpdateFailed(
            UserID::new(1),
            "disk on fire".to_owned(),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("disk on fire"), "leaked: {message}");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
