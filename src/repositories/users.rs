use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;

/// Mirrors the verified identity locally. The provider's role wins on conflict.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    role: UserRole,
    now: PrimitiveDateTime,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, role, created_at) VALUES ($1, $2, $3)
         ON CONFLICT (id) DO UPDATE SET role = EXCLUDED.role
         RETURNING id, role, created_at",
    )
    .bind(id)
    .bind(role)
    .bind(now)
    .fetch_one(executor)
    .await
}
