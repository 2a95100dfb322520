//! Bytebank is a small personal-finance service: it keeps a ledger of
//! categorized transactions per account owner, maintains the derived account
//! balance, and serves a paginated statement over the ledger.
//!
//! This library provides a JSON REST API. Authentication is handled by an
//! upstream proxy; requests arrive with the owner identity already resolved
//! (see [CurrentOwner]).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod events;
mod owner;
mod pagination;
mod routing;
mod timestamp;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use owner::{CurrentOwner, OwnerId};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::DEFAULT_TIMEZONE;

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
    /// The caller supplied a write that fails validation before touching the
    /// store, e.g. a zero, negative, or non-finite amount.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The category code on a write does not resolve in the category
    /// registry.
    #[error("\"{0}\" is not a registered category")]
    InvalidCategory(String),

    /// The requested resource could not be found, or it exists but belongs
    /// to a different owner.
    ///
    /// Rows outside the caller's owner scope are reported identically to
    /// rows that do not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The request carried no usable owner identity.
    #[error("no owner identity on the request")]
    Unauthorized,

    /// A concurrent mutation held the store's write lock for the whole
    /// bounded retry window. The caller should replay the operation.
    #[error("the ledger is busy, retry the operation")]
    Conflict,

    /// The stored balance scalar does not match the signed sum over the
    /// owner's ledger rows.
    ///
    /// Mutations are all-or-nothing, so this is only ever produced by the
    /// balance audit. It is kept distinct from [Error::Upstream] so an
    /// operator can tell drift from an unavailable store.
    #[error("ledger and balance disagree: {0}")]
    PartialFailure(String),

    /// An error occurred while resolving the configured timezone from a
    /// canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Upstream(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(sql_error, _)
                if matches!(
                    sql_error.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                Error::Conflict
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::Upstream(error)
            }
        }
    }
}

impl Error {
    /// The stable machine-readable kind for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidCategory(_) => "invalid_category",
            Error::NotFound => "not_found",
            Error::Unauthorized => "unauthorized",
            Error::Conflict => "conflict",
            Error::PartialFailure(_) => "partial_failure",
            Error::InvalidTimezone(_) => "invalid_timezone",
            Error::Upstream(_) => "upstream",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Conflict => StatusCode::CONFLICT,
            Error::PartialFailure(_) | Error::InvalidTimezone(_) | Error::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            // Internal details are logged on the server, not sent to the client.
            Error::Upstream(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            Error::InvalidTimezone(timezone) => {
                tracing::error!("Could not resolve local timezone \"{timezone}\"");
                "The server timezone is misconfigured.".to_owned()
            }
            error => error.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn maps_query_returned_no_rows_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn error_kinds_are_stable() {
        let cases = [
            (Error::InvalidInput("nope".to_owned()), "invalid_input"),
            (
                Error::InvalidCategory("boleto".to_owned()),
                "invalid_category",
            ),
            (Error::NotFound, "not_found"),
            (Error::Unauthorized, "unauthorized"),
            (Error::Conflict, "conflict"),
            (Error::PartialFailure("drift".to_owned()), "partial_failure"),
        ];

        for (error, want) in cases {
            assert_eq!(error.kind(), want);
        }
    }

    #[test]
    fn response_status_matches_error() {
        let cases = [
            (
                Error::InvalidInput("nope".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::Conflict, StatusCode::CONFLICT),
            (
                Error::PartialFailure("drift".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, want) in cases {
            assert_eq!(error.into_response().status(), want);
        }
    }
}
