//! HTTP server for the Brightpath screening platform.
//!
//! Wires the storage, auth and analysis layers into an axum application:
//! account management under `/api/auth`, consultant booking under
//! `/appointment`, screening content and assessments under `/assessment`
//! and the community forum under `/api/forums`.

pub mod analysis;
pub mod config;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;

pub use server::{BrightpathServer, ServerBuilder, build_app};
pub use state::AppState;
