//! Static pages of the site.

use askama::Template;
use axum::response::Html;
use time::OffsetDateTime;

use crate::error::AppError;

/// The fixed set of pages served over `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Experience,
    Studies,
    Projects,
    Contact,
    Thanks,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::Experience,
        Page::Studies,
        Page::Projects,
        Page::Contact,
        Page::Thanks,
    ];

    /// Pages listed in the navigation bar.
    const NAV: [Page; 5] = [
        Page::Home,
        Page::Experience,
        Page::Studies,
        Page::Projects,
        Page::Contact,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Experience => "/experiencia",
            Page::Studies => "/estudios",
            Page::Projects => "/proyectos",
            Page::Contact => "/contacto",
            Page::Thanks => "/gracias",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Inicio",
            Page::Experience => "Experiencia",
            Page::Studies => "Estudios",
            Page::Projects => "Proyectos",
            Page::Contact => "Contacto",
            Page::Thanks => "Gracias",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|page| page.path() == path)
    }
}

pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Data shared by every page through `base.html`.
pub struct Layout {
    pub title: &'static str,
    pub links: Vec<NavLink>,
    pub year: i32,
}

impl Layout {
    fn new(title: &'static str, current: Option<Page>) -> Self {
        let links = Page::NAV
            .into_iter()
            .map(|page| NavLink {
                path: page.path(),
                label: page.title(),
                active: Some(page) == current,
            })
            .collect();

        Layout {
            title,
            links,
            year: OffsetDateTime::now_utc().year(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct HomeTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "experiencia.html")]
struct ExperienceTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "estudios.html")]
struct StudiesTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "proyectos.html")]
struct ProjectsTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "contacto.html")]
struct ContactTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "gracias.html")]
struct ThanksTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "404.html")]
struct NotFoundTemplate {
    layout: Layout,
}

pub fn render(page: Page) -> Result<Html<String>, AppError> {
    let layout = Layout::new(page.title(), Some(page));
    let html = match page {
        Page::Home => HomeTemplate { layout }.render()?,
        Page::Experience => ExperienceTemplate { layout }.render()?,
        Page::Studies => StudiesTemplate { layout }.render()?,
        Page::Projects => ProjectsTemplate { layout }.render()?,
        Page::Contact => ContactTemplate { layout }.render()?,
        Page::Thanks => ThanksTemplate { layout }.render()?,
    };
    Ok(Html(html))
}

pub fn not_found() -> Result<Html<String>, askama::Error> {
    let layout = Layout::new("Página no encontrada", None);
    NotFoundTemplate { layout }.render().map(Html)
}
