use url::Url;

use crate::db::types::ApplicationStatus;
use crate::services::errors::ServiceError;
use crate::services::policy::{Actor, Operation};

pub(crate) const COVER_LETTER_MIN_CHARS: usize = 50;
pub(crate) const COVER_LETTER_MAX_CHARS: usize = 2000;

/// Allowed targets from `from`. Terminal states have none.
pub(crate) fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;

    match from {
        Pending => &[Reviewing, Shortlisted, Rejected, Withdrawn],
        Reviewing => &[Shortlisted, Rejected, Withdrawn],
        Shortlisted => &[Accepted, Rejected, Withdrawn],
        Accepted | Rejected | Withdrawn => &[],
    }
}

pub(crate) fn can_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Which policy entry authorizes moving an application into `target`.
pub(crate) fn operation_for_target(target: ApplicationStatus) -> Option<Operation> {
    match target {
        ApplicationStatus::Withdrawn => Some(Operation::WithdrawApplication),
        ApplicationStatus::Reviewing
        | ApplicationStatus::Shortlisted
        | ApplicationStatus::Accepted
        | ApplicationStatus::Rejected => Some(Operation::ReviewApplication),
        ApplicationStatus::Pending => None,
    }
}

/// Checks authority first, then the edge.
pub(crate) fn check_transition(
    actor: &Actor,
    candidate_id: &str,
    recruiter_id: &str,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), ServiceError> {
    let operation = operation_for_target(to)
        .ok_or(ServiceError::InvalidTransition { from: from.as_str(), to: to.as_str() })?;
    let owner_id = match operation {
        Operation::WithdrawApplication => candidate_id,
        _ => recruiter_id,
    };
    crate::services::policy::require_owner(actor, operation, owner_id)?;

    if can_transition(from, to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidTransition { from: from.as_str(), to: to.as_str() })
    }
}

/// Length is counted after trimming. A blank letter is rejected, not dropped.
pub(crate) fn normalize_cover_letter(raw: Option<&str>) -> Result<Option<String>, ServiceError> {
    let Some(trimmed) = raw.map(str::trim) else {
        return Ok(None);
    };

    let length = trimmed.chars().count();
    if length < COVER_LETTER_MIN_CHARS {
        return Err(ServiceError::validation(format!(
            "cover_letter must be at least {COVER_LETTER_MIN_CHARS} characters"
        )));
    }
    if length > COVER_LETTER_MAX_CHARS {
        return Err(ServiceError::validation(format!(
            "cover_letter must be at most {COVER_LETTER_MAX_CHARS} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub(crate) fn normalize_resume_url(raw: Option<&str>) -> Result<Option<String>, ServiceError> {
    let Some(trimmed) = raw.map(str::trim) else {
        return Ok(None);
    };

    let parsed = Url::parse(trimmed)
        .map_err(|_| ServiceError::validation("resume_url must be an absolute URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ServiceError::validation("resume_url must use http or https"));
    }
    Ok(Some(trimmed.to_string()))
}
