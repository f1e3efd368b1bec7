//! HTTP surface of the site.

use axum::extract::{Form, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::contact::ContactForm;
use crate::error::AppError;
use crate::pages::{self, Page};
use crate::pipeline::ContactService;
use crate::state::AppState;

/// | Method | Path | |
/// |---|---|---|
/// | GET | `/`, `/experiencia`, `/estudios`, `/proyectos`, `/contacto`, `/gracias` | static pages |
/// | POST | `/contacto` | contact form, `302` to `/gracias` once stored |
/// | * | anything else | `404` page |
pub fn router(state: AppState) -> Router {
    Page::ALL
        .into_iter()
        .fold(Router::<AppState>::new(), |router, page| {
            router.route(page.path(), get(show_page))
        })
        .route(Page::Contact.path(), post(submit_contact))
        .fallback(not_found)
        .with_state(state)
}

async fn show_page(uri: Uri) -> Result<Html<String>, AppError> {
    let page = Page::from_path(uri.path())
        .ok_or_else(|| AppError::NotFound(uri.path().to_string()))?;
    pages::render(page)
}

/// A missing or non-urlencoded body is an empty form, not a rejection.
async fn submit_contact(
    State(contacts): State<ContactService>,
    form: Option<Form<ContactForm>>,
) -> Result<Response, AppError> {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    contacts.submit(form).await?;
    Ok(found(Page::Thanks.path()))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// `302 Found`, the status browsers follow with a `GET` after a form post.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)], Html("")).into_response()
}
