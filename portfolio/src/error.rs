//! Errors answered over HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::pages;
use crate::storage::StorageError;
use crate::HttpError;

/// Failure of a request handler.
///
/// Server errors are logged in full and answered with a generic message only.
/// Unknown paths render the not-found page.
#[derive(Debug, thiserror::Error, HttpError)]
pub enum AppError {
    #[error("no page at {0}")]
    #[http_error(NOT_FOUND, "Página no encontrada.")]
    NotFound(String),

    #[error("failed to store contact: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Error interno del servidor.")]
    Storage(#[from] StorageError),

    #[error("failed to render template: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Error interno del servidor.")]
    Render(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.http_code();

        if code.is_server_error() {
            tracing::error!("Error Status {}: {}", code, self);
        }

        if code == StatusCode::NOT_FOUND {
            tracing::debug!("{}", self);
            match pages::not_found() {
                Ok(page) => return (code, page).into_response(),
                Err(err) => tracing::error!("failed to render not-found page: {}", err),
            }
        }

        (code, self.http_message()).into_response()
    }
}
