use time::PrimitiveDateTime;

use crate::db::models::Opportunity;
use crate::db::types::{OpportunityStatus, UserRole};
use crate::services::errors::ServiceError;
use crate::services::policy::Actor;

pub(crate) fn can_transition(from: OpportunityStatus, to: OpportunityStatus) -> bool {
    use OpportunityStatus::*;

    matches!(
        (from, to),
        (Draft, Published | Archived) | (Published, Closed | Archived) | (Closed, Published | Archived)
    )
}

/// Publishing (including reopening a closed posting) needs a deadline still ahead.
pub(crate) fn check_status_change(
    from: OpportunityStatus,
    to: OpportunityStatus,
    deadline: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> Result<(), ServiceError> {
    if !can_transition(from, to) {
        return Err(ServiceError::InvalidTransition { from: from.as_str(), to: to.as_str() });
    }
    if to == OpportunityStatus::Published && deadline <= now {
        return Err(ServiceError::validation("deadline must be in the future to publish"));
    }
    Ok(())
}

pub(crate) fn accepts_applications(
    opportunity: &Opportunity,
    accepted_count: i64,
    now: PrimitiveDateTime,
) -> bool {
    opportunity.status == OpportunityStatus::Published
        && opportunity.deadline > now
        && accepted_count < i64::from(opportunity.positions)
}

/// Non-owners only see postings that are or were public.
pub(crate) fn is_visible_to(actor: &Actor, opportunity: &Opportunity) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Recruiter if actor.id == opportunity.recruiter_id => true,
        _ => matches!(opportunity.status, OpportunityStatus::Published | OpportunityStatus::Closed),
    }
}
