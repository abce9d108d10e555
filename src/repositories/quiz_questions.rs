use sqlx::types::Json;

use crate::db::models::{QuestionOption, QuizQuestion};

pub(crate) const COLUMNS: &str =
    "id, quiz_id, text, options, correct_answer, points, order_index";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) correct_answer: &'a str,
    pub(crate) points: i32,
    pub(crate) order_index: i32,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<QuizQuestion, sqlx::Error> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "INSERT INTO quiz_questions (
            id, quiz_id, text, options, correct_answer, points, order_index
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.text)
    .bind(Json(params.options))
    .bind(params.correct_answer)
    .bind(params.points)
    .bind(params.order_index)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<QuizQuestion>, sqlx::Error> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {COLUMNS} FROM quiz_questions WHERE quiz_id = $1 ORDER BY order_index, id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn find_in_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
    question_id: &str,
) -> Result<Option<QuizQuestion>, sqlx::Error> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {COLUMNS} FROM quiz_questions WHERE id = $1 AND quiz_id = $2"
    ))
    .bind(question_id)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}
