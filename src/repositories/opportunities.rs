use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Opportunity;
use crate::db::types::{OpportunityKind, OpportunityStatus, WorkMode};

pub(crate) const COLUMNS: &str = "\
    id, recruiter_id, title, description, kind, mode, category, skills, stipend, \
    duration_label, deadline, positions, status, created_at, updated_at";

pub(crate) struct CreateOpportunity<'a> {
    pub(crate) id: &'a str,
    pub(crate) recruiter_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) kind: OpportunityKind,
    pub(crate) mode: WorkMode,
    pub(crate) category: &'a str,
    pub(crate) skills: Vec<String>,
    pub(crate) stipend: Option<i32>,
    pub(crate) duration_label: &'a str,
    pub(crate) deadline: PrimitiveDateTime,
    pub(crate) positions: i32,
    pub(crate) now: PrimitiveDateTime,
}

/// Visibility scope for listings. `None` fields do not filter.
#[derive(Debug, Default, Clone)]
pub(crate) struct ListScope {
    pub(crate) recruiter_id: Option<String>,
    pub(crate) status: Option<OpportunityStatus>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateOpportunity<'_>,
) -> Result<Opportunity, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>(&format!(
        "INSERT INTO opportunities (
            id, recruiter_id, title, description, kind, mode, category, skills, stipend,
            duration_label, deadline, positions, status, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$14)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.recruiter_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.kind)
    .bind(params.mode)
    .bind(params.category)
    .bind(Json(params.skills))
    .bind(params.stipend)
    .bind(params.duration_label)
    .bind(params.deadline)
    .bind(params.positions)
    .bind(OpportunityStatus::Draft)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Opportunity>, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>(&format!("SELECT {COLUMNS} FROM opportunities WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Compare-and-set on status; `None` means the row changed or vanished underneath us.
pub(crate) async fn update_status_if(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    expected: OpportunityStatus,
    target: OpportunityStatus,
    now: PrimitiveDateTime,
) -> Result<Option<Opportunity>, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>(&format!(
        "UPDATE opportunities SET status = $1, updated_at = $2
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

pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM opportunities WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list(
    pool: &PgPool,
    scope: &ListScope,
    skip: i64,
    limit: i64,
) -> Result<Vec<Opportunity>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM opportunities WHERE TRUE"));
    push_scope(&mut builder, scope);

    builder.push(" ORDER BY created_at DESC, id DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Opportunity>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, scope: &ListScope) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM opportunities WHERE TRUE");
    push_scope(&mut builder, scope);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: &ListScope) {
    if let Some(recruiter_id) = &scope.recruiter_id {
        builder.push(" AND recruiter_id = ");
        builder.push_bind(recruiter_id.clone());
    }
    if let Some(status) = scope.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}
