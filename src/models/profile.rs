// src/models/profile.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_profiles' table: per-user quiz state.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizProfile {
    pub id: i64,
    pub user_id: i64,
    /// Only ever increased by evaluating a correct attempt.
    pub total_score: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated struct for displaying the leaderboard.
/// Represents a row joined from `quiz_profiles` and `users`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub profile_id: i64,
    pub username: String,
    pub total_score: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub top_quiz_profiles: Vec<LeaderboardEntry>,
    pub total_count: usize,
}

/// Attempt counters for a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct AttemptStats {
    pub attempted: i64,
    pub correct: i64,
}
