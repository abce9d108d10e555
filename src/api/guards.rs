use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState, time::primitive_now_utc};
use crate::repositories;
use crate::services::policy::Actor;

/// Caller verified from the bearer token and mirrored into `users`.
pub(crate) struct CurrentActor(pub(crate) Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user =
            repositories::users::upsert(app_state.db(), &claims.sub, claims.role, primitive_now_utc())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to register actor"))?;

        Ok(CurrentActor(Actor { id: user.id, role: user.role }))
    }
}
