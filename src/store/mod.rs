// src/store/mod.rs

//! Repository interfaces over the persistent store.
//!
//! Every relation the handlers need is an explicit query here, so the quiz
//! engine never walks ORM-style object graphs.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::AttemptedQuestion,
        classroom::{ClassRoom, Examinee},
        profile::{AttemptStats, LeaderboardEntry, QuizProfile},
        question::{Choice, NewChoice, Question},
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to whichever store backs the application.
pub type DynStore = Arc<dyn QuizStore>;

#[async_trait]
pub trait QuizStore: Send + Sync {
    // Identity

    /// Fails with `Conflict` if the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    // Profiles

    /// Get-or-create; repeated calls return the same profile.
    async fn ensure_profile(&self, user_id: i64) -> Result<QuizProfile, AppError>;

    async fn find_profile(&self, id: i64) -> Result<Option<QuizProfile>, AppError>;

    /// Highest `total_score` first, ties broken by ascending profile id.
    async fn top_profiles(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError>;

    async fn attempt_stats(&self, profile_id: i64) -> Result<AttemptStats, AppError>;

    // Question bank

    /// Persists the question and all of its choices, or nothing.
    async fn create_question(
        &self,
        text: &str,
        choices: &[NewChoice],
    ) -> Result<(Question, Vec<Choice>), AppError>;

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError>;

    /// Choices of a question in insertion order.
    async fn list_choices(&self, question_id: i64) -> Result<Vec<Choice>, AppError>;

    /// A random question the profile has no attempt for, if any remain.
    async fn pick_unattempted_question(&self, profile_id: i64)
    -> Result<Option<Question>, AppError>;

    // Attempt ledger

    /// Fails with `Conflict` if the profile already has an attempt for the question.
    async fn insert_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<AttemptedQuestion, AppError>;

    async fn find_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError>;

    async fn find_attempt_by_id(&self, id: i64) -> Result<Option<AttemptedQuestion>, AppError>;

    /// Oldest attempt of the profile that has not been answered yet.
    async fn find_pending_attempt(
        &self,
        profile_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError>;

    /// Moves a pending attempt to evaluated and, when `is_correct`, adds
    /// `points` to the owning profile, atomically.
    ///
    /// Returns `None` when the attempt was no longer pending, in which case
    /// nothing is written.
    async fn record_evaluation(
        &self,
        attempt_id: i64,
        choice_id: i64,
        is_correct: bool,
        points: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError>;

    // Classrooms

    async fn create_classroom(&self, name: &str, description: &str)
    -> Result<ClassRoom, AppError>;

    async fn update_classroom(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<ClassRoom>, AppError>;

    async fn find_classroom(&self, id: i64) -> Result<Option<ClassRoom>, AppError>;

    /// Fails with `NotFound` for an unknown classroom or user and with
    /// `Conflict` if the user is already linked to an examinee.
    async fn add_examinee(
        &self,
        classroom_id: i64,
        name: &str,
        user_id: Option<i64>,
    ) -> Result<Examinee, AppError>;

    async fn list_examinees(&self, classroom_id: i64) -> Result<Vec<Examinee>, AppError>;
}
