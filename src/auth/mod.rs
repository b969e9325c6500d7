use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod gate;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
