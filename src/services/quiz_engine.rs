// src/services/quiz_engine.rs

//! Question selection, attempt bookkeeping and scoring.
//!
//! An attempt moves `pending -> evaluated` exactly once. The score of a
//! profile only grows, by `CORRECT_ANSWER_POINTS` per correct evaluation.

use crate::{
    config::{CORRECT_ANSWER_POINTS, LEADERBOARD_LIMIT},
    error::AppError,
    models::{
        attempt::{AttemptedQuestion, PlayResponse, SubmissionResult},
        profile::{LeaderboardResponse, QuizProfile},
        question::{PublicQuestion, Question},
    },
    store::DynStore,
};

pub struct QuizEngine {
    store: DynStore,
}

impl QuizEngine {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Get-or-create the profile of a user. Must precede any other operation.
    pub async fn ensure_profile(&self, user_id: i64) -> Result<QuizProfile, AppError> {
        self.store.ensure_profile(user_id).await
    }

    /// Picks, at random, a question the profile has never been served.
    /// `None` means the bank is exhausted for this profile.
    pub async fn get_new_question(
        &self,
        profile: &QuizProfile,
    ) -> Result<Option<Question>, AppError> {
        self.store.pick_unattempted_question(profile.id).await
    }

    /// Opens a pending attempt. A second attempt for the same pair is rejected.
    pub async fn create_attempt(
        &self,
        profile: &QuizProfile,
        question: &Question,
    ) -> Result<AttemptedQuestion, AppError> {
        if self.store.find_attempt(profile.id, question.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Question {} was already attempted",
                question.id
            )));
        }

        let attempt = self.store.insert_attempt(profile.id, question.id).await?;
        tracing::info!(
            "Created attempt {} (profile={}, question={})",
            attempt.id,
            profile.id,
            question.id
        );
        Ok(attempt)
    }

    /// Serves the in-progress question if there is one, otherwise a fresh one.
    pub async fn next_question(&self, profile: &QuizProfile) -> Result<PlayResponse, AppError> {
        let (question, attempt) = match self.store.find_pending_attempt(profile.id).await? {
            Some(pending) => {
                let question = self
                    .store
                    .find_question(pending.question_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
                (question, pending)
            }
            None => match self.get_new_question(profile).await? {
                Some(question) => {
                    let attempt = self.open_or_resume(profile, &question).await?;
                    (question, attempt)
                }
                None => {
                    tracing::debug!("Profile {} has attempted every question", profile.id);
                    return Ok(PlayResponse {
                        question: None,
                        attempt_id: None,
                    });
                }
            },
        };

        let choices = self.store.list_choices(question.id).await?;
        Ok(PlayResponse {
            question: Some(PublicQuestion::new(&question, &choices)),
            attempt_id: Some(attempt.id),
        })
    }

    /// A concurrent `next_question` of the same profile may have opened the
    /// attempt between our lookup and insert; serve that one instead.
    async fn open_or_resume(
        &self,
        profile: &QuizProfile,
        question: &Question,
    ) -> Result<AttemptedQuestion, AppError> {
        match self.create_attempt(profile, question).await {
            Err(AppError::Conflict(msg)) => {
                match self.store.find_attempt(profile.id, question.id).await? {
                    Some(attempt) if attempt.is_pending() => {
                        tracing::debug!(
                            "Profile {} resumes concurrently opened attempt {}",
                            profile.id,
                            attempt.id
                        );
                        Ok(attempt)
                    }
                    _ => Err(AppError::Conflict(msg)),
                }
            }
            other => other,
        }
    }

    /// Records the selected choice on the profile's attempt for `question_id`.
    ///
    /// * unknown attempt or a choice of another question: `NotFound`
    /// * attempt already evaluated (or lost a concurrent race): `Conflict`
    pub async fn evaluate_attempt(
        &self,
        profile: &QuizProfile,
        question_id: i64,
        choice_id: i64,
    ) -> Result<AttemptedQuestion, AppError> {
        let attempt = self
            .store
            .find_attempt(profile.id, question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

        let selected = self
            .store
            .list_choices(attempt.question_id)
            .await?
            .into_iter()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| AppError::NotFound("Choice not found".to_string()))?;

        if !attempt.is_pending() {
            return Err(AppError::Conflict(
                "This question has already been answered".to_string(),
            ));
        }

        let evaluated = self
            .store
            .record_evaluation(attempt.id, selected.id, selected.is_correct, CORRECT_ANSWER_POINTS)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("This question has already been answered".to_string())
            })?;

        tracing::info!(
            "Evaluated attempt {} (profile={}, correct={})",
            evaluated.id,
            profile.id,
            selected.is_correct
        );
        Ok(evaluated)
    }

    /// Outcome of one of the profile's attempts. Attempts of other profiles
    /// are reported as missing.
    pub async fn submission_result(
        &self,
        profile: &QuizProfile,
        attempt_id: i64,
    ) -> Result<SubmissionResult, AppError> {
        let attempt = self
            .store
            .find_attempt_by_id(attempt_id)
            .await?
            .filter(|a| a.profile_id == profile.id)
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

        let question = self
            .store
            .find_question(attempt.question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        let choices = self.store.list_choices(question.id).await?;

        // Re-read for the score after this evaluation.
        let total_score = self
            .store
            .find_profile(profile.id)
            .await?
            .map_or(profile.total_score, |p| p.total_score);

        Ok(SubmissionResult::new(
            &attempt,
            PublicQuestion::new(&question, &choices),
            &choices,
            total_score,
        ))
    }

    pub async fn leaderboard(&self) -> Result<LeaderboardResponse, AppError> {
        let top = self.store.top_profiles(LEADERBOARD_LIMIT).await?;
        Ok(LeaderboardResponse {
            total_count: top.len(),
            top_quiz_profiles: top,
        })
    }
}
