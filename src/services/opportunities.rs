use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::core::time::to_primitive_utc;
use crate::db::models::Opportunity;
use crate::db::types::{OpportunityStatus, UserRole};
use crate::repositories;
use crate::schemas::opportunity::OpportunityCreate;
use crate::services::errors::ServiceError;
use crate::services::opportunity_lifecycle;
use crate::services::paging::{Page, PageRequest};
use crate::services::policy::{self, Actor, Operation};

const MAX_SKILL_CHARS: usize = 50;

pub(crate) async fn load(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Opportunity, ServiceError> {
    repositories::opportunities::find_by_id(executor, id)
        .await?
        .ok_or(ServiceError::NotFound("Opportunity"))
}

pub(crate) async fn create(
    pool: &PgPool,
    actor: &Actor,
    input: OpportunityCreate,
    now: PrimitiveDateTime,
) -> Result<Opportunity, ServiceError> {
    policy::require(actor, Operation::CreateOpportunity)?;
    input.validate().map_err(|e| ServiceError::validation(e.to_string()))?;

    let deadline = to_primitive_utc(input.deadline);
    if deadline <= now {
        return Err(ServiceError::validation("deadline must be in the future"));
    }
    let skills = normalize_skills(input.skills)?;

    let id = Uuid::new_v4().to_string();
    let opportunity = repositories::opportunities::create(
        pool,
        repositories::opportunities::CreateOpportunity {
            id: &id,
            recruiter_id: &actor.id,
            title: input.title.trim(),
            description: input.description.trim(),
            kind: input.kind,
            mode: input.mode,
            category: input.category.trim(),
            skills,
            stipend: input.stipend,
            duration_label: input.duration_label.trim(),
            deadline,
            positions: input.positions,
            now,
        },
    )
    .await?;

    tracing::info!(
        opportunity_id = %opportunity.id,
        recruiter_id = %opportunity.recruiter_id,
        "Opportunity created"
    );
    Ok(opportunity)
}

pub(crate) async fn get(pool: &PgPool, actor: &Actor, id: &str) -> Result<Opportunity, ServiceError> {
    let opportunity = load(pool, id).await?;
    if opportunity_lifecycle::is_visible_to(actor, &opportunity) {
        Ok(opportunity)
    } else {
        Err(ServiceError::NotFound("Opportunity"))
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    actor: &Actor,
    status: Option<OpportunityStatus>,
    page: PageRequest,
) -> Result<Page<Opportunity>, ServiceError> {
    let scope = match actor.role {
        UserRole::Admin => repositories::opportunities::ListScope { recruiter_id: None, status },
        UserRole::Recruiter => repositories::opportunities::ListScope {
            recruiter_id: Some(actor.id.clone()),
            status,
        },
        UserRole::Candidate => match status {
            None | Some(OpportunityStatus::Published) => repositories::opportunities::ListScope {
                recruiter_id: None,
                status: Some(OpportunityStatus::Published),
            },
            Some(_) => return Ok(Page::empty(page)),
        },
    };

    let items = repositories::opportunities::list(pool, &scope, page.skip, page.limit).await?;
    let total_count = repositories::opportunities::count(pool, &scope).await?;
    Ok(Page { items, total_count, request: page })
}

pub(crate) async fn change_status(
    pool: &PgPool,
    actor: &Actor,
    id: &str,
    target: OpportunityStatus,
    now: PrimitiveDateTime,
) -> Result<Opportunity, ServiceError> {
    loop {
        let current = load(pool, id).await?;
        policy::require_owner(actor, Operation::ManageOpportunity, &current.recruiter_id)?;
        opportunity_lifecycle::check_status_change(current.status, target, current.deadline, now)?;

        let updated = repositories::opportunities::update_status_if(
            pool,
            id,
            current.status,
            target,
            now,
        )
        .await?;
        if let Some(updated) = updated {
            tracing::info!(
                opportunity_id = %id,
                from = %current.status,
                to = %target,
                actor_id = %actor.id,
                "Opportunity status changed"
            );
            return Ok(updated);
        }
        tracing::debug!(opportunity_id = %id, "Opportunity status moved concurrently, retrying");
    }
}

/// Removes the posting with its applications, quizzes and attempts.
pub(crate) async fn delete(pool: &PgPool, actor: &Actor, id: &str) -> Result<(), ServiceError> {
    let opportunity = load(pool, id).await?;
    policy::require_owner(actor, Operation::ManageOpportunity, &opportunity.recruiter_id)?;

    if !repositories::opportunities::delete_by_id(pool, id).await? {
        return Err(ServiceError::NotFound("Opportunity"));
    }
    tracing::info!(opportunity_id = %id, actor_id = %actor.id, "Opportunity deleted");
    Ok(())
}

fn normalize_skills(skills: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut normalized: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_SKILL_CHARS {
            return Err(ServiceError::validation(format!(
                "each skill must be 1-{MAX_SKILL_CHARS} characters"
            )));
        }
        if !normalized.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed)) {
            normalized.push(trimmed.to_string());
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::normalize_skills;

    #[test]
    fn skills_are_trimmed_and_deduplicated() {
        let skills = vec![" Rust ".to_string(), "rust".to_string(), "SQL".to_string()];
        assert_eq!(normalize_skills(skills).unwrap(), vec!["Rust", "SQL"]);
    }

    #[test]
    fn blank_skill_is_rejected() {
        assert!(normalize_skills(vec!["  ".to_string()]).is_err());
        assert!(normalize_skills(vec!["x".repeat(51)]).is_err());
    }
}
