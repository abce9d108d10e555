use std::collections::HashSet;

use crate::db::models::QuizQuestion;
use crate::schemas::quiz::QuestionCreate;
use crate::services::errors::ServiceError;

/// Cross-field checks the field validators cannot express.
pub(crate) fn validate_questions(questions: &[QuestionCreate]) -> Result<(), ServiceError> {
    let mut order_indices = HashSet::with_capacity(questions.len());

    for (position, question) in questions.iter().enumerate() {
        let number = position + 1;
        if question.text.trim().is_empty() {
            return Err(ServiceError::validation(format!("question {number}: text is blank")));
        }

        let mut values = HashSet::with_capacity(question.options.len());
        for option in &question.options {
            let value = option.value.trim();
            if value.is_empty() {
                return Err(ServiceError::validation(format!(
                    "question {number}: option values must not be blank"
                )));
            }
            if !values.insert(value) {
                return Err(ServiceError::validation(format!(
                    "question {number}: duplicate option value '{value}'"
                )));
            }
        }
        if !values.contains(question.correct_answer.trim()) {
            return Err(ServiceError::validation(format!(
                "question {number}: correct_answer must match one of the option values"
            )));
        }

        if !order_indices.insert(question.order_index) {
            return Err(ServiceError::validation(format!(
                "duplicate order_index {}",
                question.order_index
            )));
        }
    }
    Ok(())
}

/// `''` records an explicit skip; anything else must be one of the option values.
pub(crate) fn validate_answer(question: &QuizQuestion, selected: &str) -> Result<(), ServiceError> {
    if selected.is_empty() || question.options.0.iter().any(|option| option.value == selected) {
        Ok(())
    } else {
        Err(ServiceError::validation("selected_answer is not one of the question's options"))
    }
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json;

    use super::*;
    use crate::db::models::QuestionOption;
    use crate::schemas::quiz::QuestionOptionInput;

    fn option(value: &str) -> QuestionOptionInput {
        QuestionOptionInput { label: value.to_uppercase(), value: value.to_string() }
    }

    fn question(order_index: i32, values: &[&str], correct: &str) -> QuestionCreate {
        QuestionCreate {
            text: "Which one?".to_string(),
            options: values.iter().map(|value| option(value)).collect(),
            correct_answer: correct.to_string(),
            points: 1,
            order_index,
        }
    }

    #[test]
    fn well_formed_questions_pass() {
        let questions = vec![question(0, &["a", "b"], "a"), question(1, &["x", "y", "z"], "z")];
        assert!(validate_questions(&questions).is_ok());
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let err = validate_questions(&[question(0, &["a", "b"], "c")]).unwrap_err();
        assert!(err.to_string().contains("correct_answer"));
    }

    #[test]
    fn duplicate_options_and_order_are_rejected() {
        assert!(validate_questions(&[question(0, &["a", "a"], "a")]).is_err());
        assert!(validate_questions(&[question(0, &["a", "b"], "a"), question(0, &["c", "d"], "c")])
            .is_err());
    }

    #[test]
    fn answers_are_checked_against_options() {
        let stored = QuizQuestion {
            id: "q-1".to_string(),
            quiz_id: "quiz-1".to_string(),
            text: "Pick".to_string(),
            options: Json(vec![
                QuestionOption { label: "A".to_string(), value: "a".to_string() },
                QuestionOption { label: "B".to_string(), value: "b".to_string() },
            ]),
            correct_answer: "a".to_string(),
            points: 1,
            order_index: 0,
        };

        assert!(validate_answer(&stored, "b").is_ok());
        assert!(validate_answer(&stored, "").is_ok());
        assert!(matches!(validate_answer(&stored, "c"), Err(ServiceError::Validation(_))));
    }
}
