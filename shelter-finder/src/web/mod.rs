//! HTTP surface for shelter selection.
//!
//! - `GET /health`
//! - `POST /best-shelter` ranks the supplied shelters, or the fallback
//!   dataset when none are supplied
//! - `POST /compute-route` answers route lookups through Google Routes, so
//!   this server can act as its own routing backend

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
