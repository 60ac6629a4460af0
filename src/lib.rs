//! Spendboard is a web dashboard for visualizing personal spending.
//!
//! It reads the transaction table produced by an external sync process,
//! applies the user's manual corrections (overrides) on top, and serves a
//! single-page dashboard with a spending treemap, budget envelopes and a
//! paginated transaction table. Overrides can change a transaction's amount
//! or category and are stored separately from the base data, which stays
//! read-only.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod config;
mod dashboard;
mod edit;
mod endpoints;
mod filter;
mod html;
mod merge;
mod pagination;
mod routing;
mod store;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use category::Category;
pub use config::{DashboardConfig, Owner};
pub use merge::DatasetCache;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use store::{CsvTransactionStore, OverrideStore, SqliteTransactionStore, TransactionStore};
pub use transaction::{Transaction, TransactionId};

use crate::html::{alert_error, error_view};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
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
    /// The user provided the wrong dashboard password.
    #[error("invalid password")]
    InvalidCredentials,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// There was an error parsing the session expiry in the cookie or
    /// formatting a new one.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not parse session expiry \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An override mutation referenced a transaction id that does not exist
    /// in the base store, or a page referenced a transaction that is gone.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// An override mutation provided neither a new amount nor a new category.
    #[error("an override must change at least one field")]
    EmptyOverride,

    /// An amount in a form could not be parsed as a number.
    #[error("could not parse \"{0}\" as an amount")]
    InvalidAmount(String),

    /// A row store is unreadable or holds malformed rows.
    ///
    /// Read paths may keep serving the previously merged view when this
    /// occurs, but the error must not be swallowed silently.
    #[error("the transaction data could not be read: {0}")]
    DataSource(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The configured timezone is not a valid canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A lock around shared state was poisoned.
    #[error("could not acquire the data store lock")]
    StoreLock,
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

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::DataSource(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::DataSource(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::DataSource(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                error_view(
                    "Not Found",
                    "404",
                    "That transaction could not be found.",
                    "It may have been removed by the last sync. Head back to the \
                    dashboard and try again.",
                ),
            )
                .into_response(),
            Error::InvalidTimezone(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_view(
                    "Invalid Timezone",
                    "500",
                    "Invalid timezone settings",
                    &format!(
                        "Could not get the local timezone \"{timezone}\". Check the server \
                        settings and ensure the timezone is a valid canonical timezone name."
                    ),
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert for htmx
    /// requests that target the alert container.
    pub(crate) fn into_alert_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                alert_error(
                    "Could not update transaction.",
                    "The transaction could not be found in the base data. It may have \
                    been removed by the last sync.",
                ),
            )
                .into_response(),
            Error::EmptyOverride => (
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Nothing to save.",
                    "Change the amount or the category before saving.",
                ),
            )
                .into_response(),
            Error::InvalidAmount(raw) => (
                StatusCode::BAD_REQUEST,
                alert_error(
                    "Invalid amount.",
                    &format!("\"{raw}\" is not a valid amount. Enter a number like 12.50."),
                ),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    alert_error(
                        "Something went wrong.",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}
