pub mod dto;
pub mod handlers;
pub mod repo;
mod services;

pub(crate) use services::seed_admin;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
