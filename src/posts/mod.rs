use axum::Router;

use crate::state::AppState;

pub(crate) mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::post_routes()
}
