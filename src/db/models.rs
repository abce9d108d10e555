use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{
    ApplicationStatus, OpportunityKind, OpportunityStatus, UserRole, WorkMode,
};

/// Local mirror of an identity-provider subject, kept so foreign keys can cascade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Opportunity {
    pub(crate) id: String,
    pub(crate) recruiter_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) kind: OpportunityKind,
    pub(crate) mode: WorkMode,
    pub(crate) category: String,
    pub(crate) skills: Json<Vec<String>>,
    /// `None` means unpaid.
    pub(crate) stipend: Option<i32>,
    pub(crate) duration_label: String,
    pub(crate) deadline: PrimitiveDateTime,
    pub(crate) positions: i32,
    pub(crate) status: OpportunityStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Application {
    pub(crate) id: String,
    pub(crate) opportunity_id: String,
    pub(crate) candidate_id: String,
    pub(crate) cover_letter: Option<String>,
    pub(crate) resume_url: Option<String>,
    pub(crate) status: ApplicationStatus,
    pub(crate) applied_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: String,
    pub(crate) opportunity_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: i32,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct QuestionOption {
    pub(crate) label: String,
    pub(crate) value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizQuestion {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) text: String,
    pub(crate) options: Json<Vec<QuestionOption>>,
    pub(crate) correct_answer: String,
    pub(crate) points: i32,
    pub(crate) order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAttempt {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) candidate_id: String,
    pub(crate) score: Option<i32>,
    pub(crate) passed: Option<bool>,
    pub(crate) tab_switch_count: i32,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAnswer {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    /// Empty string records an explicit skip.
    pub(crate) selected_answer: String,
    pub(crate) is_correct: Option<bool>,
    pub(crate) answered_at: PrimitiveDateTime,
}
