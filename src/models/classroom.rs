// src/models/classroom.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'classrooms' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClassRoom {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'examinees' table. An examinee may be linked to at most one
/// user account, and a user to at most one examinee.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Examinee {
    pub id: i64,
    pub classroom_id: i64,
    pub name: String,
    pub user_id: Option<i64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating or updating a classroom.
#[derive(Debug, Deserialize, Validate)]
pub struct ClassRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

/// DTO for enrolling an examinee.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamineeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ClassRoomDetail {
    #[serde(flatten)]
    pub classroom: ClassRoom,
    pub examinees: Vec<Examinee>,
}
