// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, error::ErrorKind};

use super::QuizStore;
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

const USER_COLUMNS: &str = "id, username, password, role, created_at";
const PROFILE_COLUMNS: &str = "id, user_id, total_score, created_at";
const ATTEMPT_COLUMNS: &str =
    "id, profile_id, question_id, selected_choice_id, is_correct, created_at, answered_at";
const EXAMINEE_COLUMNS: &str = "id, classroom_id, name, user_id, created_at";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn error_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    err.as_database_error().map(|db| db.kind())
}

#[async_trait]
impl QuizStore for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match error_kind(&e) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            _ => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn ensure_profile(&self, user_id: i64) -> Result<QuizProfile, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, QuizProfile>(&format!(
            r#"
            INSERT INTO quiz_profiles (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match error_kind(&e) {
            Some(ErrorKind::ForeignKeyViolation) => {
                AppError::NotFound("User not found".to_string())
            }
            _ => AppError::from(e),
        })
    }

    async fn find_profile(&self, id: i64) -> Result<Option<QuizProfile>, AppError> {
        let profile = sqlx::query_as::<_, QuizProfile>(&format!(
            "SELECT {} FROM quiz_profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT p.id AS profile_id, u.username, p.total_score
            FROM quiz_profiles p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.total_score DESC, p.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::from(e)
        })?;

        Ok(entries)
    }

    async fn attempt_stats(&self, profile_id: i64) -> Result<AttemptStats, AppError> {
        let stats = sqlx::query_as::<_, AttemptStats>(
            r#"
            SELECT
                COUNT(*) AS attempted,
                COUNT(*) FILTER (WHERE is_correct) AS correct
            FROM attempted_questions
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn create_question(
        &self,
        text: &str,
        choices: &[NewChoice],
    ) -> Result<(Question, Vec<Choice>), AppError> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (text) VALUES ($1) RETURNING id, text, created_at",
        )
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        let mut saved = Vec::with_capacity(choices.len());
        for choice in choices {
            let row = sqlx::query_as::<_, Choice>(
                r#"
                INSERT INTO choices (question_id, text, is_correct)
                VALUES ($1, $2, $3)
                RETURNING id, question_id, text, is_correct
                "#,
            )
            .bind(question.id)
            .bind(&choice.text)
            .bind(choice.is_correct)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match error_kind(&e) {
                Some(ErrorKind::UniqueViolation) => AppError::Conflict(
                    "A question can only have one correct choice".to_string(),
                ),
                _ => AppError::from(e),
            })?;
            saved.push(row);
        }

        tx.commit().await?;

        Ok((question, saved))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, text, created_at FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn list_choices(&self, question_id: i64) -> Result<Vec<Choice>, AppError> {
        let choices = sqlx::query_as::<_, Choice>(
            r#"
            SELECT id, question_id, text, is_correct
            FROM choices
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn pick_unattempted_question(
        &self,
        profile_id: i64,
    ) -> Result<Option<Question>, AppError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT q.id, q.text, q.created_at
            FROM questions q
            WHERE NOT EXISTS (
                SELECT 1 FROM attempted_questions a
                WHERE a.profile_id = $1 AND a.question_id = q.id
            )
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to pick a question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(question)
    }

    async fn insert_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<AttemptedQuestion, AppError> {
        let inserted = sqlx::query_as::<_, AttemptedQuestion>(&format!(
            r#"
            INSERT INTO attempted_questions (profile_id, question_id)
            VALUES ($1, $2)
            ON CONFLICT (profile_id, question_id) DO NOTHING
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(profile_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match error_kind(&e) {
            Some(ErrorKind::ForeignKeyViolation) => {
                AppError::NotFound("Question or profile not found".to_string())
            }
            _ => AppError::from(e),
        })?;

        inserted.ok_or_else(|| {
            AppError::Conflict(format!(
                "Question {} was already attempted by profile {}",
                question_id, profile_id
            ))
        })
    }

    async fn find_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        let attempt = sqlx::query_as::<_, AttemptedQuestion>(&format!(
            "SELECT {} FROM attempted_questions WHERE profile_id = $1 AND question_id = $2",
            ATTEMPT_COLUMNS
        ))
        .bind(profile_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn find_attempt_by_id(&self, id: i64) -> Result<Option<AttemptedQuestion>, AppError> {
        let attempt = sqlx::query_as::<_, AttemptedQuestion>(&format!(
            "SELECT {} FROM attempted_questions WHERE id = $1",
            ATTEMPT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn find_pending_attempt(
        &self,
        profile_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        let attempt = sqlx::query_as::<_, AttemptedQuestion>(&format!(
            r#"
            SELECT {} FROM attempted_questions
            WHERE profile_id = $1 AND selected_choice_id IS NULL
            ORDER BY id
            LIMIT 1
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn record_evaluation(
        &self,
        attempt_id: i64,
        choice_id: i64,
        is_correct: bool,
        points: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set on the pending state; a concurrent evaluator blocks
        // on the row lock and then matches zero rows.
        let updated = sqlx::query_as::<_, AttemptedQuestion>(&format!(
            r#"
            UPDATE attempted_questions
            SET selected_choice_id = $2, is_correct = $3, answered_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND selected_choice_id IS NULL
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(attempt_id)
        .bind(choice_id)
        .bind(is_correct)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match error_kind(&e) {
            Some(ErrorKind::ForeignKeyViolation) => {
                AppError::NotFound("Choice not found for this question".to_string())
            }
            _ => AppError::from(e),
        })?;

        let Some(attempt) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        if is_correct && points > 0 {
            sqlx::query("UPDATE quiz_profiles SET total_score = total_score + $2 WHERE id = $1")
                .bind(attempt.profile_id)
                .bind(points)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Some(attempt))
    }

    async fn create_classroom(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ClassRoom, AppError> {
        let classroom = sqlx::query_as::<_, ClassRoom>(
            r#"
            INSERT INTO classrooms (name, description) VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(classroom)
    }

    async fn update_classroom(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<ClassRoom>, AppError> {
        let classroom = sqlx::query_as::<_, ClassRoom>(
            r#"
            UPDATE classrooms SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(classroom)
    }

    async fn find_classroom(&self, id: i64) -> Result<Option<ClassRoom>, AppError> {
        let classroom = sqlx::query_as::<_, ClassRoom>(
            "SELECT id, name, description, created_at FROM classrooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(classroom)
    }

    async fn add_examinee(
        &self,
        classroom_id: i64,
        name: &str,
        user_id: Option<i64>,
    ) -> Result<Examinee, AppError> {
        sqlx::query_as::<_, Examinee>(&format!(
            "INSERT INTO examinees (classroom_id, name, user_id) VALUES ($1, $2, $3) RETURNING {}",
            EXAMINEE_COLUMNS
        ))
        .bind(classroom_id)
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match error_kind(&e) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict("User is already linked to an examinee".to_string())
            }
            Some(ErrorKind::ForeignKeyViolation) => {
                AppError::NotFound("Classroom or user not found".to_string())
            }
            _ => AppError::from(e),
        })
    }

    async fn list_examinees(&self, classroom_id: i64) -> Result<Vec<Examinee>, AppError> {
        let examinees = sqlx::query_as::<_, Examinee>(&format!(
            "SELECT {} FROM examinees WHERE classroom_id = $1 ORDER BY id",
            EXAMINEE_COLUMNS
        ))
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(examinees)
    }
}
