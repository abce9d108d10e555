use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentActor;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::quiz::{
    AnswerRecord, AnswerResponse, AttemptResponse, AttemptResultResponse, QuestionOutcome,
    TabSwitchResponse,
};
use crate::services::quizzes::{self, AttemptResult};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:attempt_id/answers/:question_id", put(record_answer))
        .route("/:attempt_id/tab-switch", post(record_tab_switch))
        .route("/:attempt_id/submit", post(submit_attempt))
        .route("/:attempt_id/result", get(get_result))
}

async fn record_answer(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path((attempt_id, question_id)): Path<(String, String)>,
    Json(payload): Json<AnswerRecord>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = quizzes::record_answer(
        state.db(),
        &actor,
        &attempt_id,
        &question_id,
        &payload.selected_answer,
        primitive_now_utc(),
    )
    .await?;
    Ok(Json(answer.into()))
}

async fn record_tab_switch(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(attempt_id): Path<String>,
) -> Result<Json<TabSwitchResponse>, ApiError> {
    let tab_switch_count = quizzes::record_tab_switch(state.db(), &actor, &attempt_id).await?;
    Ok(Json(TabSwitchResponse { tab_switch_count }))
}

async fn submit_attempt(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(attempt_id): Path<String>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = quizzes::submit_attempt(
        state.db(),
        state.events(),
        &actor,
        &attempt_id,
        state.settings().quiz().submit_grace_seconds,
        primitive_now_utc(),
    )
    .await?;
    Ok(Json(attempt.into()))
}

async fn get_result(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(attempt_id): Path<String>,
) -> Result<Json<AttemptResultResponse>, ApiError> {
    let result = quizzes::get_attempt_result(state.db(), &actor, &attempt_id).await?;
    Ok(Json(build_result(result)))
}

fn build_result(result: AttemptResult) -> AttemptResultResponse {
    let AttemptResult { attempt, questions, answers } = result;
    let mut by_question: HashMap<String, _> =
        answers.into_iter().map(|answer| (answer.question_id.clone(), answer)).collect();

    let graded = attempt.submitted_at.is_some();

    let questions = questions
        .into_iter()
        .map(|question| {
            let answer = by_question.remove(&question.id);
            QuestionOutcome {
                is_correct: if graded {
                    Some(answer.as_ref().and_then(|answer| answer.is_correct).unwrap_or(false))
                } else {
                    None
                },
                selected_answer: answer.map(|answer| answer.selected_answer),
                question_id: question.id,
                points: question.points,
            }
        })
        .collect();

    AttemptResultResponse { attempt: attempt.into(), questions }
}
