//! Personal portfolio site: static pages plus a contact form that stores each
//! submission and emails the owner about it.
//!
//! ```ignore
//! let config = AppConfig::from_env()?;
//! let state = AppState::from_config(&config)?;
//! portfolio::serve((Ipv4Addr::UNSPECIFIED, config.port), portfolio::router(state)).await?;
//! ```

pub use portfolio_macros::HttpError;

pub mod config;
pub mod contact;
pub mod error;
pub mod mail;
pub mod notify;
pub mod pages;
pub mod pipeline;
pub mod routes;
pub mod serve;
pub mod state;
pub mod storage;

pub use config::{AppConfig, ConfigError, EnvConfig};
pub use routes::router;
pub use serve::{serve, serve_listener};
pub use state::AppState;
