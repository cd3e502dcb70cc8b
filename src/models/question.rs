// src/models/question.rs

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question (sanitised HTML).
    pub text: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'choices' table. Exactly one choice per question is correct.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// A choice as shown to a player (correctness hidden).
#[derive(Debug, Clone, Serialize)]
pub struct PublicChoice {
    pub id: i64,
    pub text: String,
}

impl From<&Choice> for PublicChoice {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id,
            text: choice.text.clone(),
        }
    }
}

/// DTO for sending a question to a player.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub choices: Vec<PublicChoice>,
}

impl PublicQuestion {
    pub fn new(question: &Question, choices: &[Choice]) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            choices: choices.iter().map(PublicChoice::from).collect(),
        }
    }
}

/// A question with its full answer key, returned to admins.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// One answer option of a question being authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChoice {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating a new question together with its choices.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question text must be between 1 and 2000 characters."))]
    pub text: String,
    #[validate(custom(function = validate_choices))]
    pub choices: Vec<NewChoice>,
}

fn choice_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// A question needs at least two non-empty choices, exactly one of them correct.
fn validate_choices(choices: &[NewChoice]) -> Result<(), ValidationError> {
    if choices.len() < 2 {
        return Err(choice_error(
            "too_few_choices",
            "A question needs at least two choices.",
        ));
    }
    for choice in choices {
        let len = choice.text.trim().chars().count();
        if len == 0 {
            return Err(choice_error("empty_choice", "Choice text cannot be empty."));
        }
        if len > 500 {
            return Err(choice_error("choice_too_long", "Choice text is limited to 500 characters."));
        }
    }
    if choices.iter().filter(|c| c.is_correct).count() != 1 {
        return Err(choice_error(
            "exactly_one_correct",
            "Exactly one choice must be marked correct.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(text: &str, is_correct: bool) -> NewChoice {
        NewChoice {
            text: text.to_string(),
            is_correct,
        }
    }

    fn request(choices: Vec<NewChoice>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "2 + 2 = ?".to_string(),
            choices,
        }
    }

    #[test]
    fn accepts_exactly_one_correct_choice() {
        let req = request(vec![choice("4", true), choice("5", false)]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_zero_or_many_correct_choices() {
        let none = request(vec![choice("4", false), choice("5", false)]);
        assert!(none.validate().unwrap_err().field_errors().contains_key("choices"));

        let two = request(vec![choice("4", true), choice("5", true)]);
        assert!(two.validate().unwrap_err().field_errors().contains_key("choices"));
    }

    #[test]
    fn rejects_single_or_blank_choices() {
        let single = request(vec![choice("4", true)]);
        assert!(single.validate().is_err());

        let blank = request(vec![choice("4", true), choice("   ", false)]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn validation_errors_echo_the_submitted_choices() {
        let req = request(vec![choice("4", false), choice("5", false)]);
        let errors = req.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let error = &field_errors["choices"][0];

        assert_eq!(error.code, "exactly_one_correct");
        assert_eq!(error.params["value"][1]["text"], "5");
        assert_eq!(error.params["value"][1]["is_correct"], false);
    }

    #[test]
    fn public_question_hides_answer_key() {
        let question = Question {
            id: 1,
            text: "Q".into(),
            created_at: None,
        };
        let choices = vec![Choice {
            id: 7,
            question_id: 1,
            text: "A".into(),
            is_correct: true,
        }];

        let value = serde_json::to_value(PublicQuestion::new(&question, &choices)).unwrap();
        assert_eq!(value["choices"][0]["id"], 7);
        assert!(value["choices"][0].get("is_correct").is_none());
    }
}
