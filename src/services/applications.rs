use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::db::is_unique_violation;
use crate::db::models::Application;
use crate::db::types::{ApplicationStatus, UserRole};
use crate::repositories;
use crate::repositories::applications::Owner;
use crate::schemas::application::ApplicationCreate;
use crate::services::application_lifecycle;
use crate::services::errors::ServiceError;
use crate::services::events::{DomainEvent, EventPublisher};
use crate::services::opportunities;
use crate::services::opportunity_lifecycle;
use crate::services::paging::{Page, PageRequest};
use crate::services::policy::{self, Actor, Operation};

const UNIQUE_APPLICATION: &str = "uq_applications_opportunity_candidate";

async fn load(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Application, ServiceError> {
    repositories::applications::find_by_id(executor, id)
        .await?
        .ok_or(ServiceError::NotFound("Application"))
}

pub(crate) async fn submit(
    pool: &PgPool,
    events: &EventPublisher,
    actor: &Actor,
    opportunity_id: &str,
    input: ApplicationCreate,
    now: PrimitiveDateTime,
) -> Result<Application, ServiceError> {
    policy::require(actor, Operation::SubmitApplication)?;
    input.validate().map_err(|e| ServiceError::validation(e.to_string()))?;
    let cover_letter = application_lifecycle::normalize_cover_letter(input.cover_letter.as_deref())?;
    let resume_url = application_lifecycle::normalize_resume_url(input.resume_url.as_deref())?;

    let opportunity = opportunities::load(pool, opportunity_id).await?;
    let accepted = repositories::applications::count_with_status(
        pool,
        opportunity_id,
        ApplicationStatus::Accepted,
    )
    .await?;
    if !opportunity_lifecycle::accepts_applications(&opportunity, accepted, now) {
        return Err(ServiceError::OpportunityClosed);
    }

    let id = Uuid::new_v4().to_string();
    let inserted = repositories::applications::insert_if_absent(
        pool,
        repositories::applications::CreateApplication {
            id: &id,
            opportunity_id,
            candidate_id: &actor.id,
            cover_letter: cover_letter.as_deref(),
            resume_url: resume_url.as_deref(),
            now,
        },
    )
    .await
    .map_err(|err| {
        if is_unique_violation(&err, UNIQUE_APPLICATION) {
            ServiceError::DuplicateApplication
        } else {
            ServiceError::Database(err)
        }
    })?;
    if !inserted {
        return Err(ServiceError::DuplicateApplication);
    }

    let application = load(pool, &id).await?;
    tracing::info!(
        application_id = %application.id,
        opportunity_id = %application.opportunity_id,
        candidate_id = %application.candidate_id,
        "Application submitted"
    );
    events
        .publish(DomainEvent::ApplicationSubmitted {
            application_id: application.id.clone(),
            opportunity_id: application.opportunity_id.clone(),
            candidate_id: application.candidate_id.clone(),
        })
        .await;
    Ok(application)
}

/// Applies `target` with compare-and-set, re-validating against the fresh
/// state whenever a concurrent writer got there first.
pub(crate) async fn transition(
    pool: &PgPool,
    events: &EventPublisher,
    actor: &Actor,
    application_id: &str,
    target: ApplicationStatus,
    now: PrimitiveDateTime,
) -> Result<Application, ServiceError> {
    let mut current = load(pool, application_id).await?;
    let opportunity = opportunities::load(pool, &current.opportunity_id).await?;

    let updated = loop {
        application_lifecycle::check_transition(
            actor,
            &current.candidate_id,
            &opportunity.recruiter_id,
            current.status,
            target,
        )?;

        let updated = repositories::applications::update_status_if(
            pool,
            application_id,
            current.status,
            target,
            now,
        )
        .await?;
        match updated {
            Some(updated) => break updated,
            None => {
                tracing::debug!(application_id, "Application status moved concurrently, re-reading");
                current = load(pool, application_id).await?;
            }
        }
    };

    tracing::info!(
        application_id = %updated.id,
        from = %current.status,
        to = %updated.status,
        actor_id = %actor.id,
        "Application status changed"
    );
    events
        .publish(DomainEvent::ApplicationStatusChanged {
            application_id: updated.id.clone(),
            opportunity_id: updated.opportunity_id.clone(),
            candidate_id: updated.candidate_id.clone(),
            from: current.status,
            to: updated.status,
            actor_id: actor.id.clone(),
        })
        .await;
    Ok(updated)
}

pub(crate) async fn withdraw(
    pool: &PgPool,
    events: &EventPublisher,
    actor: &Actor,
    application_id: &str,
    now: PrimitiveDateTime,
) -> Result<Application, ServiceError> {
    transition(pool, events, actor, application_id, ApplicationStatus::Withdrawn, now).await
}

pub(crate) async fn get(
    pool: &PgPool,
    actor: &Actor,
    application_id: &str,
) -> Result<Application, ServiceError> {
    let application = load(pool, application_id).await?;
    match actor.role {
        UserRole::Admin => {}
        UserRole::Candidate if actor.id == application.candidate_id => {}
        UserRole::Recruiter => {
            let opportunity = opportunities::load(pool, &application.opportunity_id).await?;
            policy::require_owner(actor, Operation::ReviewApplication, &opportunity.recruiter_id)?;
        }
        UserRole::Candidate => return Err(ServiceError::Forbidden),
    }
    Ok(application)
}

pub(crate) async fn list_by_candidate(
    pool: &PgPool,
    actor: &Actor,
    candidate_id: &str,
    status: Option<ApplicationStatus>,
    page: PageRequest,
) -> Result<Page<Application>, ServiceError> {
    policy::require_owner(actor, Operation::ListOwnApplications, candidate_id)?;

    let owner = Owner::Candidate(candidate_id);
    let items =
        repositories::applications::list(pool, owner, status, page.skip, page.limit).await?;
    let total_count = repositories::applications::count(pool, owner, status).await?;
    Ok(Page { items, total_count, request: page })
}

pub(crate) async fn list_by_opportunity(
    pool: &PgPool,
    actor: &Actor,
    opportunity_id: &str,
    status: Option<ApplicationStatus>,
    page: PageRequest,
) -> Result<Page<Application>, ServiceError> {
    let opportunity = opportunities::load(pool, opportunity_id).await?;
    policy::require_owner(
        actor,
        Operation::ListOpportunityApplications,
        &opportunity.recruiter_id,
    )?;

    let owner = Owner::Opportunity(opportunity_id);
    let items =
        repositories::applications::list(pool, owner, status, page.skip, page.limit).await?;
    let total_count = repositories::applications::count(pool, owner, status).await?;
    Ok(Page { items, total_count, request: page })
}
