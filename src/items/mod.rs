mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{Item, STATUS_AVAILABLE, STATUS_IN_PROGRESS};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::item_routes())
}
