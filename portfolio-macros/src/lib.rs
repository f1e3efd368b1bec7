//! Derive macros for the portfolio site.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod http_error;

/// Derive macro mapping error variants to an HTTP status and a public message
///
/// Every variant that should be answered over HTTP carries `#[http_error(...)]`:
/// - status code (required), either a `StatusCode` constant (`NOT_FOUND`) or a number (`404`)
/// - public message (optional), a string literal
///
/// The message may interpolate tuple fields by index (`"{0}"`) or struct fields by
/// name (`"{path}"`). Without a message the variant's `Display` output is used, so the
/// message argument is only needed when the log line must not reach the client.
///
/// The derive generates two inherent methods:
/// - `http_code(&self) -> axum::http::StatusCode`
/// - `http_message(&self) -> String`
///
/// Variants without the attribute are answered with `500 Internal Server Error` and
/// their `Display` output.
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error, portfolio::HttpError)]
/// enum AppError {
///     #[error("page not found: {0}")]
///     #[http_error(NOT_FOUND, "no page at {0}")]
///     NotFound(String),
///
///     #[error("storage failed: {0}")]
///     #[http_error(INTERNAL_SERVER_ERROR, "Error interno del servidor.")]
///     Storage(#[from] StorageError),
/// }
/// ```
#[proc_macro_derive(HttpError, attributes(http_error))]
pub fn http_error_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    http_error::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
