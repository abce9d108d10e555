use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::db::models::Application;
use crate::db::types::ApplicationStatus;
use crate::schemas::datetime::format_primitive;

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ApplicationCreate {
    #[serde(default)]
    #[serde(alias = "coverLetter")]
    pub(crate) cover_letter: Option<String>,
    #[serde(default)]
    #[serde(alias = "resumeUrl")]
    #[validate(length(max = 2048, message = "resume_url is too long"))]
    pub(crate) resume_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationStatusUpdate {
    pub(crate) status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationListQuery {
    #[serde(default)]
    pub(crate) status: Option<ApplicationStatus>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplicationResponse {
    pub(crate) id: String,
    pub(crate) opportunity_id: String,
    pub(crate) candidate_id: String,
    pub(crate) cover_letter: Option<String>,
    pub(crate) resume_url: Option<String>,
    pub(crate) status: ApplicationStatus,
    pub(crate) applied_at: String,
    pub(crate) updated_at: String,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            opportunity_id: application.opportunity_id,
            candidate_id: application.candidate_id,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: application.status,
            applied_at: format_primitive(application.applied_at),
            updated_at: format_primitive(application.updated_at),
        }
    }
}
