use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod guards;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod role;

pub use extractors::{ActiveUser, AdminUser, CurrentUser};
pub use repo_types::User;
pub use role::Role;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::token_routes())
}
