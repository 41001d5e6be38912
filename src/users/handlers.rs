use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::PublicUser, extractors::AuthUser, handlers::is_valid_email},
    errors::{Error, Result},
    state::AppState,
    users::dto::{ResetPasswordRequest, UpdateUserRequest},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/password", post(reset_password))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
) -> Result<Json<Vec<PublicUser>>> {
    let users = state.repo.get_all().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>> {
    let user = state.repo.get_one(id).await?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(Error::Validation("invalid email".into()));
    }

    let mut user = state.repo.get_one(id).await?;
    user.email = payload.email;
    user.full_name = payload.full_name;
    user.active = payload.active;
    state.repo.update(&user).await?;

    // Re-read so the view carries the refreshed timestamp.
    let user = state.repo.get_one(id).await?;
    info!(user_id = user.id, "user updated");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.repo.delete_by_id(id).await?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<StatusCode> {
    if payload.password.len() < 8 {
        return Err(Error::Validation("password too short".into()));
    }
    let user = state.repo.get_one(id).await?;
    state.repo.reset_password(&payload.password, &user).await?;
    info!(user_id = user.id, "password reset");
    Ok(StatusCode::NO_CONTENT)
}
