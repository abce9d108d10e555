use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentActor;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::quiz::{AttemptListQuery, AttemptResponse, QuizResponse, QuizUpdate};
use crate::services::paging::PageRequest;
use crate::services::quizzes;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id", get(get_quiz).patch(update_quiz))
        .route("/:quiz_id/attempts", post(start_attempt).get(list_attempts))
}

async fn get_quiz(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizResponse>, ApiError> {
    let view = quizzes::get_quiz(state.db(), &actor, &quiz_id).await?;
    Ok(Json(QuizResponse::new(view.quiz, view.questions, view.reveal_answers)))
}

async fn update_quiz(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<QuizUpdate>,
) -> Result<Json<QuizResponse>, ApiError> {
    let view =
        quizzes::update_quiz(state.db(), &actor, &quiz_id, payload, primitive_now_utc()).await?;
    Ok(Json(QuizResponse::new(view.quiz, view.questions, view.reveal_answers)))
}

async fn start_attempt(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    let attempt =
        quizzes::start_attempt(state.db(), state.events(), &actor, &quiz_id, primitive_now_utc())
            .await?;
    Ok((StatusCode::CREATED, Json(attempt.into())))
}

async fn list_attempts(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Query(params): Query<AttemptListQuery>,
) -> Result<Json<PaginatedResponse<AttemptResponse>>, ApiError> {
    let page = PageRequest::new(params.skip, params.limit);
    let page = quizzes::list_quiz_attempts(state.db(), &actor, &quiz_id, page).await?;
    Ok(Json(PaginatedResponse::from_page(page, AttemptResponse::from)))
}
