use serde::Deserialize;

/// Request body for a profile overwrite. The password is deliberately not
/// part of this payload.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub full_name: String,
    pub active: i32,
}

/// Request body for a password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}
