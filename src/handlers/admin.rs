// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        classroom::{ClassRoomDetail, ClassRoomRequest, CreateExamineeRequest},
        question::{CreateQuestionRequest, NewChoice, QuestionDetail},
    },
    store::DynStore,
    utils::sanitize::sanitize_text,
};

/// Creates a new quiz question together with its choices.
/// Admin only.
pub async fn create_question(
    State(store): State<DynStore>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let text = sanitize_text(&payload.text);
    let choices: Vec<NewChoice> = payload
        .choices
        .iter()
        .map(|c| NewChoice {
            text: sanitize_text(&c.text),
            is_correct: c.is_correct,
        })
        .collect();

    if text.is_empty() || choices.iter().any(|c| c.text.is_empty()) {
        return Err(AppError::BadRequest(
            "Question and choice texts cannot be empty after sanitising".to_string(),
        ));
    }

    let (question, choices) = store.create_question(&text, &choices).await?;
    tracing::info!("Created question {} with {} choices", question.id, choices.len());

    Ok((
        StatusCode::CREATED,
        Json(QuestionDetail { question, choices }),
    ))
}

/// Creates a classroom.
/// Admin only.
pub async fn create_classroom(
    State(store): State<DynStore>,
    Json(payload): Json<ClassRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let classroom = store
        .create_classroom(payload.name.trim(), payload.description.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(classroom)))
}

/// Updates a classroom by ID.
/// Admin only.
pub async fn update_classroom(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
    Json(payload): Json<ClassRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let classroom = store
        .update_classroom(id, payload.name.trim(), payload.description.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Classroom not found".to_string()))?;

    Ok(Json(classroom))
}

/// A classroom with its examinees.
/// Admin only.
pub async fn get_classroom(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let classroom = store
        .find_classroom(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Classroom not found".to_string()))?;
    let examinees = store.list_examinees(classroom.id).await?;

    Ok(Json(ClassRoomDetail {
        classroom,
        examinees,
    }))
}

/// Enrols an examinee, optionally linked to a user account.
/// Admin only.
pub async fn add_examinee(
    State(store): State<DynStore>,
    Path(classroom_id): Path<i64>,
    Json(payload): Json<CreateExamineeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let examinee = store
        .add_examinee(classroom_id, payload.name.trim(), payload.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(examinee)))
}
