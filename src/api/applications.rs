use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentActor;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::application::{
    ApplicationListQuery, ApplicationResponse, ApplicationStatusUpdate,
};
use crate::services::applications;
use crate::services::paging::PageRequest;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(list_mine))
        .route("/:application_id", get(get_application))
        .route("/:application_id/status", post(transition_status))
        .route("/:application_id/withdraw", post(withdraw))
}

async fn list_mine(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Query(params): Query<ApplicationListQuery>,
) -> Result<Json<PaginatedResponse<ApplicationResponse>>, ApiError> {
    let page = PageRequest::new(params.skip, params.limit);
    let page =
        applications::list_by_candidate(state.db(), &actor, &actor.id, params.status, page).await?;
    Ok(Json(PaginatedResponse::from_page(page, ApplicationResponse::from)))
}

async fn get_application(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let application = applications::get(state.db(), &actor, &application_id).await?;
    Ok(Json(application.into()))
}

async fn transition_status(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Json(payload): Json<ApplicationStatusUpdate>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let application = applications::transition(
        state.db(),
        state.events(),
        &actor,
        &application_id,
        payload.status,
        primitive_now_utc(),
    )
    .await?;
    Ok(Json(application.into()))
}

async fn withdraw(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let application = applications::withdraw(
        state.db(),
        state.events(),
        &actor,
        &application_id,
        primitive_now_utc(),
    )
    .await?;
    Ok(Json(application.into()))
}

#[cfg(test)]
mod tests;
