use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentActor;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::application::{ApplicationCreate, ApplicationListQuery, ApplicationResponse};
use crate::schemas::opportunity::{
    OpportunityCreate, OpportunityListQuery, OpportunityResponse, OpportunityStatusUpdate,
};
use crate::schemas::quiz::{QuizCreate, QuizResponse};
use crate::services::paging::PageRequest;
use crate::services::{applications, opportunities, quizzes};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_opportunities).post(create_opportunity))
        .route("/:opportunity_id", get(get_opportunity).delete(delete_opportunity))
        .route("/:opportunity_id/status", post(change_status))
        .route(
            "/:opportunity_id/applications",
            get(list_applications).post(submit_application),
        )
        .route("/:opportunity_id/quizzes", post(create_quiz))
}

async fn create_opportunity(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Json(payload): Json<OpportunityCreate>,
) -> Result<(StatusCode, Json<OpportunityResponse>), ApiError> {
    let opportunity =
        opportunities::create(state.db(), &actor, payload, primitive_now_utc()).await?;
    Ok((StatusCode::CREATED, Json(opportunity.into())))
}

async fn list_opportunities(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(params): Query<OpportunityListQuery>,
) -> Result<Json<PaginatedResponse<OpportunityResponse>>, ApiError> {
    let page = PageRequest::new(params.skip, params.limit);
    let page = opportunities::list(state.db(), &actor, params.status, page).await?;
    Ok(Json(PaginatedResponse::from_page(page, OpportunityResponse::from)))
}

async fn get_opportunity(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
) -> Result<Json<OpportunityResponse>, ApiError> {
    let opportunity = opportunities::get(state.db(), &actor, &opportunity_id).await?;
    Ok(Json(opportunity.into()))
}

async fn delete_opportunity(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    opportunities::delete(state.db(), &actor, &opportunity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_status(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<OpportunityStatusUpdate>,
) -> Result<Json<OpportunityResponse>, ApiError> {
    let opportunity = opportunities::change_status(
        state.db(),
        &actor,
        &opportunity_id,
        payload.status,
        primitive_now_utc(),
    )
    .await?;
    Ok(Json(opportunity.into()))
}

async fn submit_application(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<ApplicationCreate>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    let application = applications::submit(
        state.db(),
        state.events(),
        &actor,
        &opportunity_id,
        payload,
        primitive_now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

async fn list_applications(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
    Query(params): Query<ApplicationListQuery>,
) -> Result<Json<PaginatedResponse<ApplicationResponse>>, ApiError> {
    let page = PageRequest::new(params.skip, params.limit);
    let page =
        applications::list_by_opportunity(state.db(), &actor, &opportunity_id, params.status, page)
            .await?;
    Ok(Json(PaginatedResponse::from_page(page, ApplicationResponse::from)))
}

async fn create_quiz(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    let view =
        quizzes::create_quiz(state.db(), &actor, &opportunity_id, payload, primitive_now_utc())
            .await?;
    let response = QuizResponse::new(view.quiz, view.questions, view.reveal_answers);
    Ok((StatusCode::CREATED, Json(response)))
}
