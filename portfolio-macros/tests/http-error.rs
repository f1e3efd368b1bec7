use std::borrow::Cow;

use axum::http::StatusCode;
use portfolio_macros::HttpError;

#[derive(thiserror::Error, Debug, HttpError)]
enum SiteError {
    #[error("page not found")]
    #[http_error(NOT_FOUND)]
    NotFound,

    #[error("bad form: {0}")]
    #[http_error(BAD_REQUEST)]
    BadForm(Cow<'static, str>),

    #[error("field {0} rejected: {1}")]
    #[http_error(UNPROCESSABLE_ENTITY, "field {0} is invalid ({1})")]
    Field(&'static str, String),

    #[error("upstream {service} answered {status}")]
    #[http_error(502, "{service} is unavailable")]
    Upstream { service: &'static str, status: u16 },

    #[error("storage error: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Error interno del servidor.")]
    Storage(#[from] anyhow::Error),

    #[error("literal braces")]
    #[http_error(IM_A_TEAPOT, "{{0}} stays literal, got {0}")]
    Braces(u8),

    #[error("unmapped failure")]
    Unmapped,
}

#[test]
fn unit_variant_falls_back_to_display() {
    let err = SiteError::NotFound;
    assert_eq!(err.http_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.http_message(), "page not found");
}

#[test]
fn tuple_variant_without_message_uses_display() {
    let err = SiteError::BadForm(Cow::Borrowed("missing body"));
    assert_eq!(err.http_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.http_message(), "bad form: missing body");
}

#[test]
fn tuple_variant_interpolates_indices() {
    let err = SiteError::Field("email", "empty".into());
    assert_eq!(err.http_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.http_message(), "field email is invalid (empty)");
}

#[test]
fn struct_variant_interpolates_names_and_numeric_codes() {
    let err = SiteError::Upstream {
        service: "resend",
        status: 503,
    };
    assert_eq!(err.http_code().as_u16(), 502);
    assert_eq!(err.http_message(), "resend is unavailable");
}

#[test]
fn public_message_hides_internal_detail() {
    let err = SiteError::Storage(anyhow::anyhow!("disk full at /var/data"));
    assert_eq!(err.http_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.http_message(), "Error interno del servidor.");
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn escaped_braces_are_not_rewritten() {
    let err = SiteError::Braces(7);
    assert_eq!(err.http_code(), StatusCode::IM_A_TEAPOT);
    assert_eq!(err.http_message(), "{0} stays literal, got 7");
}

#[test]
fn variants_without_attribute_are_server_errors() {
    let err = SiteError::Unmapped;
    assert_eq!(err.http_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.http_message(), "unmapped failure");
}
