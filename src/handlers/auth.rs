// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, ROLE_USER, RegisterRequest},
    store::DynStore,
    utils::{
        jwt::{auth_cookie, removal_cookie, sign_jwt},
        password::{hash_password, verify_password},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(store): State<DynStore>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let user = store
        .create_user(&payload.username, &hashed_password, ROLE_USER)
        .await?;

    tracing::info!("Registered user {} (id={})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// The token is returned in the body and also set as an HttpOnly cookie.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = store
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        jar.add(auth_cookie(token.clone())),
        Json(json!({
            "token": token,
            "type": "Bearer",
            "role": user.role,
        })),
    ))
}

/// Clears the session cookie. Bearer tokens simply expire.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(removal_cookie()),
        Json(json!({ "message": "Logged out" })),
    )
}
