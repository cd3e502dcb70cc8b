// src/handlers/mod.rs

use axum::Json;
use serde_json::{Value, json};

use crate::error::AppError;

pub mod admin;
pub mod auth;
pub mod profile;
pub mod quiz;

/// Index of the service: where to start playing.
pub async fn home() -> Json<Value> {
    Json(json!({
        "service": "quiz-backend",
        "play": "/play",
        "leaderboard": "/leaderboard",
        "register": "/register",
        "login": "/login",
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
