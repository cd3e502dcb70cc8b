// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::{Choice, PublicChoice, PublicQuestion};

/// Represents the 'attempted_questions' table.
///
/// An attempt is *pending* until a choice is recorded, after which it is
/// *evaluated* and never changes again.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptedQuestion {
    pub id: i64,
    pub profile_id: i64,
    pub question_id: i64,
    pub selected_choice_id: Option<i64>,
    pub is_correct: Option<bool>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub answered_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Pending,
    Evaluated,
}

impl AttemptedQuestion {
    pub fn state(&self) -> AttemptState {
        match self.selected_choice_id {
            None => AttemptState::Pending,
            Some(_) => AttemptState::Evaluated,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == AttemptState::Pending
    }

    /// Location of the result page for this attempt.
    pub fn result_url(&self) -> String {
        format!("/submission_result/{}", self.id)
    }
}

/// DTO for answering a served question.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_pk: i64,
    pub choice_pk: i64,
}

/// Body of `GET /play`. `question` is `None` once every question was attempted.
#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub question: Option<PublicQuestion>,
    pub attempt_id: Option<i64>,
}

/// Outcome of a single attempt.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub attempt_id: i64,
    pub state: AttemptState,
    pub is_correct: Option<bool>,
    pub question: PublicQuestion,
    pub selected_choice: Option<PublicChoice>,
    /// Revealed only once the attempt has been evaluated.
    pub correct_choice: Option<PublicChoice>,
    pub total_score: i64,
}

impl SubmissionResult {
    pub fn new(
        attempt: &AttemptedQuestion,
        question: PublicQuestion,
        choices: &[Choice],
        total_score: i64,
    ) -> Self {
        let evaluated = !attempt.is_pending();
        let selected_choice = attempt
            .selected_choice_id
            .and_then(|id| choices.iter().find(|c| c.id == id))
            .map(PublicChoice::from);
        let correct_choice = choices
            .iter()
            .find(|c| c.is_correct)
            .filter(|_| evaluated)
            .map(PublicChoice::from);

        Self {
            attempt_id: attempt.id,
            state: attempt.state(),
            is_correct: attempt.is_correct,
            question,
            selected_choice,
            correct_choice,
            total_score,
        }
    }
}
