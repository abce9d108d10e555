use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::db::models::{QuestionOption, Quiz, QuizAnswer, QuizAttempt, QuizQuestion};
use crate::schemas::datetime::{format_optional, format_primitive};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub(crate) struct QuestionOptionInput {
    #[validate(length(min = 1, max = 200, message = "option label must be 1-200 characters"))]
    pub(crate) label: String,
    #[validate(length(min = 1, max = 200, message = "option value must be 1-200 characters"))]
    pub(crate) value: String,
}

impl From<QuestionOptionInput> for QuestionOption {
    fn from(input: QuestionOptionInput) -> Self {
        Self { label: input.label, value: input.value }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, max = 2000, message = "question text must be 1-2000 characters"))]
    pub(crate) text: String,
    #[validate(length(min = 2, max = 6, message = "a question needs 2-6 options"))]
    #[validate(nested)]
    pub(crate) options: Vec<QuestionOptionInput>,
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: String,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, message = "points must be at least 1"))]
    pub(crate) points: i32,
    #[serde(alias = "orderIndex")]
    #[validate(range(min = 0, message = "order_index must be non-negative"))]
    pub(crate) order_index: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub(crate) description: Option<String>,
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1, max = 180, message = "duration_minutes must be 1-180"))]
    pub(crate) duration_minutes: i32,
    #[serde(alias = "passingScore")]
    #[validate(range(min = 0, max = 100, message = "passing_score must be 0-100"))]
    pub(crate) passing_score: i32,
    #[validate(length(min = 1, message = "a quiz needs at least one question"))]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct QuizUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub(crate) description: Option<String>,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, max = 180, message = "duration_minutes must be 1-180"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default, alias = "passingScore")]
    #[validate(range(min = 0, max = 100, message = "passing_score must be 0-100"))]
    pub(crate) passing_score: Option<i32>,
    #[serde(default, alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRecord {
    #[serde(alias = "selectedAnswer")]
    pub(crate) selected_answer: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) points: i32,
    pub(crate) order_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<String>,
}

impl QuestionResponse {
    pub(crate) fn from_question(question: QuizQuestion, reveal_answer: bool) -> Self {
        Self {
            id: question.id,
            text: question.text,
            options: question.options.0,
            points: question.points,
            order_index: question.order_index,
            correct_answer: reveal_answer.then_some(question.correct_answer),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) opportunity_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl QuizResponse {
    pub(crate) fn new(quiz: Quiz, questions: Vec<QuizQuestion>, reveal_answers: bool) -> Self {
        Self {
            id: quiz.id,
            opportunity_id: quiz.opportunity_id,
            title: quiz.title,
            description: quiz.description,
            duration_minutes: quiz.duration_minutes,
            passing_score: quiz.passing_score,
            is_active: quiz.is_active,
            created_at: format_primitive(quiz.created_at),
            updated_at: format_primitive(quiz.updated_at),
            questions: questions
                .into_iter()
                .map(|question| QuestionResponse::from_question(question, reveal_answers))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AttemptState {
    InProgress,
    Submitted,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) candidate_id: String,
    pub(crate) status: AttemptState,
    pub(crate) score: Option<i32>,
    pub(crate) passed: Option<bool>,
    pub(crate) tab_switch_count: i32,
    pub(crate) started_at: String,
    pub(crate) submitted_at: Option<String>,
}

impl From<QuizAttempt> for AttemptResponse {
    fn from(attempt: QuizAttempt) -> Self {
        let status = if attempt.submitted_at.is_some() {
            AttemptState::Submitted
        } else {
            AttemptState::InProgress
        };
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            candidate_id: attempt.candidate_id,
            status,
            score: attempt.score,
            passed: attempt.passed,
            tab_switch_count: attempt.tab_switch_count,
            started_at: format_primitive(attempt.started_at),
            submitted_at: format_optional(attempt.submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) question_id: String,
    pub(crate) selected_answer: String,
    pub(crate) answered_at: String,
}

impl From<QuizAnswer> for AnswerResponse {
    fn from(answer: QuizAnswer) -> Self {
        Self {
            question_id: answer.question_id,
            selected_answer: answer.selected_answer,
            answered_at: format_primitive(answer.answered_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TabSwitchResponse {
    pub(crate) tab_switch_count: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionOutcome {
    pub(crate) question_id: String,
    pub(crate) points: i32,
    pub(crate) selected_answer: Option<String>,
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResultResponse {
    #[serde(flatten)]
    pub(crate) attempt: AttemptResponse,
    pub(crate) questions: Vec<QuestionOutcome>,
}

fn default_points() -> i32 {
    1
}
