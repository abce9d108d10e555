use time::PrimitiveDateTime;

use crate::db::models::QuizAnswer;

pub(crate) const COLUMNS: &str =
    "id, attempt_id, question_id, selected_answer, is_correct, answered_at";

pub(crate) struct UpsertAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) attempt_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) selected_answer: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

/// Last write wins per question. Correctness is left to grading.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertAnswer<'_>,
) -> Result<QuizAnswer, sqlx::Error> {
    sqlx::query_as::<_, QuizAnswer>(&format!(
        "INSERT INTO quiz_answers (id, attempt_id, question_id, selected_answer, answered_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT ON CONSTRAINT uq_quiz_answers_attempt_question
         DO UPDATE SET selected_answer = EXCLUDED.selected_answer,
                       answered_at = EXCLUDED.answered_at
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_answer)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_attempt(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<QuizAnswer>, sqlx::Error> {
    sqlx::query_as::<_, QuizAnswer>(&format!(
        "SELECT {COLUMNS} FROM quiz_answers WHERE attempt_id = $1 ORDER BY answered_at, id"
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn set_correctness(
    executor: impl sqlx::PgExecutor<'_>,
    answer_ids: Vec<String>,
    correctness: Vec<bool>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE quiz_answers AS a SET is_correct = v.is_correct
         FROM UNNEST($1::text[], $2::bool[]) AS v(id, is_correct)
         WHERE a.id = v.id",
    )
    .bind(answer_ids)
    .bind(correctness)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
