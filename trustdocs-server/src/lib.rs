//! `trustdocs-server` exposes the TrustDocs pipeline over HTTP.
//! Upload a document's text, then ask plain-language questions grounded in it.

pub mod config;
pub mod error;
pub mod server;
pub mod telemetry;

pub use config::{ProviderKind, ServerConfig};
pub use error::ApiError;
pub use server::{AppState, app_router, build_pipeline, run_server};
