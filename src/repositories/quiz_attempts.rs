use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizAttempt;

pub(crate) const COLUMNS: &str = "\
    id, quiz_id, candidate_id, score, passed, tab_switch_count, started_at, submitted_at";

/// Returns `false` when the candidate already has an attempt on this quiz.
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    quiz_id: &str,
    candidate_id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO quiz_attempts (id, quiz_id, candidate_id, tab_switch_count, started_at)
         VALUES ($1, $2, $3, 0, $4)
         ON CONFLICT ON CONSTRAINT uq_quiz_attempts_quiz_candidate DO NOTHING",
    )
    .bind(id)
    .bind(quiz_id)
    .bind(candidate_id)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!("SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Only counts switches while the attempt is still open. Returns the new count.
pub(crate) async fn increment_tab_switch(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE quiz_attempts SET tab_switch_count = tab_switch_count + 1
         WHERE id = $1 AND submitted_at IS NULL
         RETURNING tab_switch_count",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Writes the grade once. `None` means someone else already submitted.
pub(crate) async fn finalize(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    score: i32,
    passed: bool,
    now: PrimitiveDateTime,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "UPDATE quiz_attempts SET score = $1, passed = $2, submitted_at = $3
         WHERE id = $4 AND submitted_at IS NULL
         RETURNING {COLUMNS}"
    ))
    .bind(score)
    .bind(passed)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE quiz_id = $1
         ORDER BY started_at DESC, id DESC OFFSET $2 LIMIT $3"
    ))
    .bind(quiz_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn count_in_progress(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1 AND submitted_at IS NULL",
    )
    .bind(quiz_id)
    .fetch_one(executor)
    .await
}
