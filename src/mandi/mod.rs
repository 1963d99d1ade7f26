pub mod client;
mod dto;
mod fallback;
pub mod handlers;
mod regions;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::api_routes()
}
