use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    errors::{Error, Result},
    posts::dto::CreatePostRequest,
    repo::{NewPost, Post},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).delete(delete_post))
}

/// Listing is gated entirely on the bearer token verifying.
#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
) -> Result<Json<Vec<Post>>> {
    let posts = state.repo.get_all_posts().await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Post>> {
    let post = state.repo.get_one_post(id).await?;
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>> {
    if payload.title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".into()));
    }

    let post = state
        .repo
        .insert_post(NewPost {
            title: payload.title,
            content: payload.content,
            user_id: payload.user_id,
        })
        .await?;

    info!(post_id = post.id, user_id = post.user_id, "post created");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.repo.delete_post(id).await?;
    info!(post_id = id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
