// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::{
    error::AppError, models::attempt::SubmitAnswerRequest, state::AppState, utils::jwt::Claims,
};

/// Serves the in-progress question, or a new one the caller has not seen.
///
/// `question` is null once every question has been attempted.
pub async fn play_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let engine = state.engine();
    let profile = engine.ensure_profile(claims.user_id()?).await?;

    Ok(Json(engine.next_question(&profile).await?))
}

/// Answers a served question, then redirects to its result page.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let engine = state.engine();
    let profile = engine.ensure_profile(claims.user_id()?).await?;

    let attempt = engine
        .evaluate_attempt(&profile, req.question_pk, req.choice_pk)
        .await?;

    Ok(Redirect::to(&attempt.result_url()))
}

/// Shows the outcome of one of the caller's attempts.
pub async fn submission_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(attempted_question_pk): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let engine = state.engine();
    let profile = engine.ensure_profile(claims.user_id()?).await?;

    Ok(Json(
        engine.submission_result(&profile, attempted_question_pk).await?,
    ))
}

/// Top quiz profiles by score.
pub async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.engine().leaderboard().await?))
}
