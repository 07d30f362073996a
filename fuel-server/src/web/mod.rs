//! HTTP surface: the stations-in-range API, a price listing, operator
//! endpoints and the static frontend.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
