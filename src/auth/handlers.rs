use axum::{extract::State, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        password,
    },
    errors::{Error, Result},
    repo::NewUser,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(Error::Validation("invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(Error::Validation("password too short".into()));
    }

    let user = state
        .repo
        .insert(NewUser {
            email: payload.email,
            full_name: payload.full_name,
            password: payload.password,
            active: 0,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password must be indistinguishable to the
    // client; both collapse to InvalidCredentials.
    let user = match state.repo.get_by_email(&payload.email).await {
        Ok(u) => u,
        Err(Error::NotFound) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(Error::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };

    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = user.id, "login invalid password");
        return Err(Error::InvalidCredentials);
    }

    let access_token = state
        .tokens
        .create_token(&user.email, state.config.token_ttl())?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        user: PublicUser::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(email: &str, password: &str) -> Json<RegisterRequest> {
        Json(RegisterRequest {
            email: email.into(),
            full_name: "Test User".into(),
            password: password.into(),
        })
    }

    fn login_payload(email: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    #[tokio::test]
    async fn register_then_login_returns_token_and_view() {
        let state = AppState::fake();
        register(State(state.clone()), register_payload("a@x.com", "secret-1"))
            .await
            .expect("register");

        let Json(response) = login(State(state.clone()), login_payload("a@x.com", "secret-1"))
            .await
            .expect("login");

        assert_eq!(response.user.email, "a@x.com");
        let claims = state
            .tokens
            .verify_token(&response.access_token)
            .expect("token verifies");
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn login_failure_modes_are_indistinguishable() {
        let state = AppState::fake();
        register(State(state.clone()), register_payload("a@x.com", "secret-1"))
            .await
            .expect("register");

        let wrong_password = login(State(state.clone()), login_payload("a@x.com", "wrong-pw"))
            .await
            .unwrap_err();
        let unknown_email = login(
            State(state.clone()),
            login_payload("nouser@x.com", "secret-1"),
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_email, Error::InvalidCredentials));
        assert_eq!(
            wrong_password.status_and_message(),
            unknown_email.status_and_message()
        );
    }

    #[tokio::test]
    async fn user_views_never_contain_the_hash() {
        let state = AppState::fake();
        let Json(view) = register(State(state.clone()), register_payload("a@x.com", "secret-1"))
            .await
            .expect("register");

        let stored = state.repo.get_by_email("a@x.com").await.expect("get");

        let json = serde_json::to_string(&view).expect("serialize view");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains(&stored.password_hash));

        let json = serde_json::to_string(&stored).expect("serialize row");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains(&stored.password_hash));
    }

    #[tokio::test]
    async fn register_normalizes_and_validates_input() {
        let state = AppState::fake();
        let Json(view) = register(
            State(state.clone()),
            register_payload("  A@X.com ", "secret-1"),
        )
        .await
        .expect("register");
        assert_eq!(view.email, "a@x.com");

        let err = register(State(state.clone()), register_payload("not-an-email", "secret-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = register(State(state.clone()), register_payload("b@x.com", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let state = AppState::fake();
        register(State(state.clone()), register_payload("a@x.com", "secret-1"))
            .await
            .expect("register");
        let err = register(State(state.clone()), register_payload("a@x.com", "secret-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate));
    }
}
