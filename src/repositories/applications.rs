use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Application;
use crate::db::types::ApplicationStatus;

pub(crate) const COLUMNS: &str = "\
    id, opportunity_id, candidate_id, cover_letter, resume_url, status, applied_at, updated_at";

pub(crate) struct CreateApplication<'a> {
    pub(crate) id: &'a str,
    pub(crate) opportunity_id: &'a str,
    pub(crate) candidate_id: &'a str,
    pub(crate) cover_letter: Option<&'a str>,
    pub(crate) resume_url: Option<&'a str>,
    pub(crate) now: PrimitiveDateTime,
}

/// Returns `false` when the candidate already applied to this opportunity.
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateApplication<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO applications (
            id, opportunity_id, candidate_id, cover_letter, resume_url, status,
            applied_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
        ON CONFLICT ON CONSTRAINT uq_applications_opportunity_candidate DO NOTHING",
    )
    .bind(params.id)
    .bind(params.opportunity_id)
    .bind(params.candidate_id)
    .bind(params.cover_letter)
    .bind(params.resume_url)
    .bind(ApplicationStatus::Pending)
    .bind(params.now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!("SELECT {COLUMNS} FROM applications WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_opportunity_and_candidate(
    executor: impl sqlx::PgExecutor<'_>,
    opportunity_id: &str,
    candidate_id: &str,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM applications WHERE opportunity_id = $1 AND candidate_id = $2"
    ))
    .bind(opportunity_id)
    .bind(candidate_id)
    .fetch_optional(executor)
    .await
}

/// Moves the row only if it is still in `expected`.
pub(crate) async fn update_status_if(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    expected: ApplicationStatus,
    target: ApplicationStatus,
    now: PrimitiveDateTime,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        "UPDATE applications SET status = $1, updated_at = $2
         WHERE id = $3 AND status = $4
         RETURNING {COLUMNS}"
    ))
    .bind(target)
    .bind(now)
    .bind(id)
    .bind(expected)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_with_status(
    executor: impl sqlx::PgExecutor<'_>,
    opportunity_id: &str,
    status: ApplicationStatus,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM applications WHERE opportunity_id = $1 AND status = $2",
    )
    .bind(opportunity_id)
    .bind(status)
    .fetch_one(executor)
    .await
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Owner<'a> {
    Candidate(&'a str),
    Opportunity(&'a str),
}

pub(crate) async fn list(
    pool: &PgPool,
    owner: Owner<'_>,
    status: Option<ApplicationStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Application>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM applications WHERE "));
    push_filter(&mut builder, owner, status);

    builder.push(" ORDER BY applied_at DESC, id DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Application>().fetch_all(pool).await
}

pub(crate) async fn count(
    pool: &PgPool,
    owner: Owner<'_>,
    status: Option<ApplicationStatus>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM applications WHERE ");
    push_filter(&mut builder, owner, status);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

fn push_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    owner: Owner<'_>,
    status: Option<ApplicationStatus>,
) {
    match owner {
        Owner::Candidate(candidate_id) => {
            builder.push("candidate_id = ");
            builder.push_bind(candidate_id.to_string());
        }
        Owner::Opportunity(opportunity_id) => {
            builder.push("opportunity_id = ");
            builder.push_bind(opportunity_id.to_string());
        }
    }
    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}
