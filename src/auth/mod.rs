use axum::Router;

use crate::state::AppState;

pub(crate) mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
