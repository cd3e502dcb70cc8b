// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::user::UserHomeResponse,
    state::AppState,
    utils::jwt::Claims,
};

/// The caller's account and quiz progress.
pub async fn user_home(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let profile = state.engine().ensure_profile(user.id).await?;
    let stats = state.store.attempt_stats(profile.id).await?;

    Ok(Json(UserHomeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        profile_id: profile.id,
        total_score: profile.total_score,
        attempted_count: stats.attempted,
        correct_count: stats.correct,
    }))
}
