use crate::db::types::UserRole;
use crate::services::errors::ServiceError;

/// Verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) id: String,
    pub(crate) role: UserRole,
}

impl Actor {
    pub(crate) fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    CreateOpportunity,
    ManageOpportunity,
    SubmitApplication,
    ReviewApplication,
    WithdrawApplication,
    ListOwnApplications,
    ListOpportunityApplications,
    ManageQuiz,
    TakeQuiz,
    ViewQuizAttempts,
}

/// Role-level authority. Ownership is checked separately by [`require_owner`].
pub(crate) fn is_allowed(operation: Operation, role: UserRole) -> bool {
    use Operation::*;
    use UserRole::*;

    match (operation, role) {
        (CreateOpportunity, Recruiter | Admin) => true,
        (ManageOpportunity, Recruiter | Admin) => true,
        (SubmitApplication, Candidate) => true,
        (ReviewApplication, Recruiter | Admin) => true,
        (WithdrawApplication, Candidate) => true,
        (ListOwnApplications, Candidate) => true,
        (ListOpportunityApplications, Recruiter | Admin) => true,
        (ManageQuiz, Recruiter | Admin) => true,
        (TakeQuiz, Candidate) => true,
        (ViewQuizAttempts, Recruiter | Admin) => true,
        _ => false,
    }
}

pub(crate) fn require(actor: &Actor, operation: Operation) -> Result<(), ServiceError> {
    if is_allowed(operation, actor.role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Role check plus ownership of the entity. Admins bypass ownership.
pub(crate) fn require_owner(
    actor: &Actor,
    operation: Operation,
    owner_id: &str,
) -> Result<(), ServiceError> {
    require(actor, operation)?;
    if actor.is_admin() || actor.id == owner_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}
