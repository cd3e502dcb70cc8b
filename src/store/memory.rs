// src/store/memory.rs

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IndexedRandom;

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

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    profiles: Vec<QuizProfile>,
    questions: Vec<Question>,
    choices: Vec<Choice>,
    attempts: Vec<AttemptedQuestion>,
    classrooms: Vec<ClassRoom>,
    examinees: Vec<Examinee>,
}

impl Tables {
    /// One sequence shared by all tables keeps ids unique across kinds.
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store for tests and local runs (`DATABASE_URL=memory://`).
///
/// Each operation holds the single lock for its whole duration, which gives
/// the same atomicity the Postgres store gets from transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        let mut t = self.tables()?;
        if t.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            created_at: Some(Utc::now()),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn ensure_profile(&self, user_id: i64) -> Result<QuizProfile, AppError> {
        let mut t = self.tables()?;
        if let Some(profile) = t.profiles.iter().find(|p| p.user_id == user_id) {
            return Ok(profile.clone());
        }
        if !t.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        let profile = QuizProfile {
            id: t.next_id(),
            user_id,
            total_score: 0,
            created_at: Some(Utc::now()),
        };
        t.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, id: i64) -> Result<Option<QuizProfile>, AppError> {
        Ok(self.tables()?.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let t = self.tables()?;
        let mut entries: Vec<LeaderboardEntry> = t
            .profiles
            .iter()
            .filter_map(|p| {
                t.users.iter().find(|u| u.id == p.user_id).map(|u| LeaderboardEntry {
                    profile_id: p.id,
                    username: u.username.clone(),
                    total_score: p.total_score,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(a.profile_id.cmp(&b.profile_id))
        });
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }

    async fn attempt_stats(&self, profile_id: i64) -> Result<AttemptStats, AppError> {
        let t = self.tables()?;
        let mine = t.attempts.iter().filter(|a| a.profile_id == profile_id);
        let (attempted, correct) = mine.fold((0, 0), |(n, c), a| {
            (n + 1, c + i64::from(a.is_correct == Some(true)))
        });
        Ok(AttemptStats { attempted, correct })
    }

    async fn create_question(
        &self,
        text: &str,
        choices: &[NewChoice],
    ) -> Result<(Question, Vec<Choice>), AppError> {
        if choices.iter().filter(|c| c.is_correct).count() > 1 {
            return Err(AppError::Conflict(
                "A question can only have one correct choice".to_string(),
            ));
        }

        let mut t = self.tables()?;
        let question = Question {
            id: t.next_id(),
            text: text.to_string(),
            created_at: Some(Utc::now()),
        };
        let mut saved = Vec::with_capacity(choices.len());
        for choice in choices {
            saved.push(Choice {
                id: t.next_id(),
                question_id: question.id,
                text: choice.text.clone(),
                is_correct: choice.is_correct,
            });
        }
        t.questions.push(question.clone());
        t.choices.extend(saved.iter().cloned());
        Ok((question, saved))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, AppError> {
        Ok(self.tables()?.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn list_choices(&self, question_id: i64) -> Result<Vec<Choice>, AppError> {
        Ok(self
            .tables()?
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn pick_unattempted_question(
        &self,
        profile_id: i64,
    ) -> Result<Option<Question>, AppError> {
        let t = self.tables()?;
        let remaining: Vec<&Question> = t
            .questions
            .iter()
            .filter(|q| {
                !t.attempts
                    .iter()
                    .any(|a| a.profile_id == profile_id && a.question_id == q.id)
            })
            .collect();

        Ok(remaining.choose(&mut rand::rng()).map(|q| (*q).clone()))
    }

    async fn insert_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<AttemptedQuestion, AppError> {
        let mut t = self.tables()?;
        if !t.profiles.iter().any(|p| p.id == profile_id)
            || !t.questions.iter().any(|q| q.id == question_id)
        {
            return Err(AppError::NotFound(
                "Question or profile not found".to_string(),
            ));
        }
        if t
            .attempts
            .iter()
            .any(|a| a.profile_id == profile_id && a.question_id == question_id)
        {
            return Err(AppError::Conflict(format!(
                "Question {} was already attempted by profile {}",
                question_id, profile_id
            )));
        }
        let attempt = AttemptedQuestion {
            id: t.next_id(),
            profile_id,
            question_id,
            selected_choice_id: None,
            is_correct: None,
            created_at: Some(Utc::now()),
            answered_at: None,
        };
        t.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(
        &self,
        profile_id: i64,
        question_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        Ok(self
            .tables()?
            .attempts
            .iter()
            .find(|a| a.profile_id == profile_id && a.question_id == question_id)
            .cloned())
    }

    async fn find_attempt_by_id(&self, id: i64) -> Result<Option<AttemptedQuestion>, AppError> {
        Ok(self.tables()?.attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_pending_attempt(
        &self,
        profile_id: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        Ok(self
            .tables()?
            .attempts
            .iter()
            .find(|a| a.profile_id == profile_id && a.is_pending())
            .cloned())
    }

    async fn record_evaluation(
        &self,
        attempt_id: i64,
        choice_id: i64,
        is_correct: bool,
        points: i64,
    ) -> Result<Option<AttemptedQuestion>, AppError> {
        let mut t = self.tables()?;
        let Some(index) = t.attempts.iter().position(|a| a.id == attempt_id) else {
            return Err(AppError::NotFound("Attempt not found".to_string()));
        };
        if !t.attempts[index].is_pending() {
            return Ok(None);
        }
        let question_id = t.attempts[index].question_id;
        if !t
            .choices
            .iter()
            .any(|c| c.id == choice_id && c.question_id == question_id)
        {
            return Err(AppError::NotFound(
                "Choice not found for this question".to_string(),
            ));
        }

        let attempt = &mut t.attempts[index];
        attempt.selected_choice_id = Some(choice_id);
        attempt.is_correct = Some(is_correct);
        attempt.answered_at = Some(Utc::now());
        let attempt = attempt.clone();

        if is_correct && points > 0 {
            if let Some(profile) = t.profiles.iter_mut().find(|p| p.id == attempt.profile_id) {
                profile.total_score += points;
            }
        }
        Ok(Some(attempt))
    }

    async fn create_classroom(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ClassRoom, AppError> {
        let mut t = self.tables()?;
        let classroom = ClassRoom {
            id: t.next_id(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Some(Utc::now()),
        };
        t.classrooms.push(classroom.clone());
        Ok(classroom)
    }

    async fn update_classroom(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<ClassRoom>, AppError> {
        let mut t = self.tables()?;
        Ok(t.classrooms.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = name.to_string();
            c.description = description.to_string();
            c.clone()
        }))
    }

    async fn find_classroom(&self, id: i64) -> Result<Option<ClassRoom>, AppError> {
        Ok(self.tables()?.classrooms.iter().find(|c| c.id == id).cloned())
    }

    async fn add_examinee(
        &self,
        classroom_id: i64,
        name: &str,
        user_id: Option<i64>,
    ) -> Result<Examinee, AppError> {
        let mut t = self.tables()?;
        if !t.classrooms.iter().any(|c| c.id == classroom_id) {
            return Err(AppError::NotFound("Classroom or user not found".to_string()));
        }
        if let Some(uid) = user_id {
            if !t.users.iter().any(|u| u.id == uid) {
                return Err(AppError::NotFound("Classroom or user not found".to_string()));
            }
            if t.examinees.iter().any(|e| e.user_id == Some(uid)) {
                return Err(AppError::Conflict(
                    "User is already linked to an examinee".to_string(),
                ));
            }
        }
        let examinee = Examinee {
            id: t.next_id(),
            classroom_id,
            name: name.to_string(),
            user_id,
            created_at: Some(Utc::now()),
        };
        t.examinees.push(examinee.clone());
        Ok(examinee)
    }

    async fn list_examinees(&self, classroom_id: i64) -> Result<Vec<Examinee>, AppError> {
        Ok(self
            .tables()?
            .examinees
            .iter()
            .filter(|e| e.classroom_id == classroom_id)
            .cloned()
            .collect())
    }
}
