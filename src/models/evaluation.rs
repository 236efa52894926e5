use super::ValidationError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub id: String,

    pub game_id: i64,
    pub game_name: String,

    pub rating: i16,
    pub sender_name: String,
    pub comment: Option<String>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EvaluationForm {
    pub game_id: i64,
    pub rating: i16,
    pub sender_name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEvaluation {
    pub game_id: i64,
    pub rating: i16,
    pub sender_name: String,
    pub comment: Option<String>,
}

impl EvaluationForm {
    pub fn validate(self) -> Result<ValidEvaluation, ValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::InvalidRating(self.rating));
        }

        let sender_name = self.sender_name.trim().to_string();
        if sender_name.is_empty() {
            return Err(ValidationError::MissingSenderName);
        }

        let comment = self
            .comment
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty());

        return Ok(ValidEvaluation {
            game_id: self.game_id,
            rating: self.rating,
            sender_name,
            comment,
        });
    }
}

impl ValidEvaluation {
    pub fn into_evaluation(self, game_name: String, created_by: String) -> Evaluation {
        let created_at = Utc::now();

        return Evaluation {
            id: format!("eval_{}", created_at.timestamp_millis()),
            game_id: self.game_id,
            game_name,
            rating: self.rating,
            sender_name: self.sender_name,
            comment: self.comment,
            created_by,
            created_at,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rating: i16, sender_name: &str, comment: Option<&str>) -> EvaluationForm {
        return EvaluationForm {
            game_id: 4,
            rating,
            sender_name: sender_name.to_string(),
            comment: comment.map(str::to_string),
        };
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert_eq!(
            form(0, "Léa", None).validate(),
            Err(ValidationError::InvalidRating(0))
        );
        assert_eq!(
            form(6, "Léa", None).validate(),
            Err(ValidationError::InvalidRating(6))
        );
        assert!(form(5, "Léa", None).validate().is_ok());
    }

    #[test]
    fn sender_name_is_required_after_trim() {
        assert_eq!(
            form(3, "   ", None).validate(),
            Err(ValidationError::MissingSenderName)
        );
    }

    #[test]
    fn blank_comment_becomes_none() {
        let valid = form(4, " Léa ", Some("   ")).validate().unwrap();
        assert_eq!(valid.sender_name, "Léa");
        assert_eq!(valid.comment, None);

        let valid = form(4, "Léa", Some(" complet ")).validate().unwrap();
        assert_eq!(valid.comment.as_deref(), Some("complet"));
    }
}
