use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::db::models::Opportunity;
use crate::db::types::{OpportunityKind, OpportunityStatus, WorkMode};
use crate::schemas::datetime::{deserialize_flexible, format_primitive};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OpportunityCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 5000, message = "description must be 1-5000 characters"))]
    pub(crate) description: String,
    pub(crate) kind: OpportunityKind,
    pub(crate) mode: WorkMode,
    #[validate(length(min = 1, max = 100, message = "category must be 1-100 characters"))]
    pub(crate) category: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "at most 30 skills are allowed"))]
    pub(crate) skills: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "stipend must be positive"))]
    pub(crate) stipend: Option<i32>,
    #[serde(alias = "durationLabel")]
    #[validate(length(min = 1, max = 100, message = "duration_label must be 1-100 characters"))]
    pub(crate) duration_label: String,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub(crate) deadline: OffsetDateTime,
    #[serde(default = "default_positions")]
    #[validate(range(min = 1, message = "positions must be at least 1"))]
    pub(crate) positions: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpportunityStatusUpdate {
    pub(crate) status: OpportunityStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpportunityListQuery {
    #[serde(default)]
    pub(crate) status: Option<OpportunityStatus>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpportunityResponse {
    pub(crate) id: String,
    pub(crate) recruiter_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) kind: OpportunityKind,
    pub(crate) mode: WorkMode,
    pub(crate) category: String,
    pub(crate) skills: Vec<String>,
    pub(crate) stipend: Option<i32>,
    pub(crate) duration_label: String,
    pub(crate) deadline: String,
    pub(crate) positions: i32,
    pub(crate) status: OpportunityStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Opportunity> for OpportunityResponse {
    fn from(opportunity: Opportunity) -> Self {
        Self {
            id: opportunity.id,
            recruiter_id: opportunity.recruiter_id,
            title: opportunity.title,
            description: opportunity.description,
            kind: opportunity.kind,
            mode: opportunity.mode,
            category: opportunity.category,
            skills: opportunity.skills.0,
            stipend: opportunity.stipend,
            duration_label: opportunity.duration_label,
            deadline: format_primitive(opportunity.deadline),
            positions: opportunity.positions,
            status: opportunity.status,
            created_at: format_primitive(opportunity.created_at),
            updated_at: format_primitive(opportunity.updated_at),
        }
    }
}

fn default_positions() -> i32 {
    1
}
