use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use hbnb_service::{Action, Actor, Resource, authorize};
use hbnb_types::api::{CreateUserRequest, UpdateUserRequest};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::optional_actor;

/// Public registration. Asking for `is_admin: true` needs an admin bearer.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.is_admin {
        let actor = optional_actor(&state, &headers)
            .await?
            .ok_or(ApiError::Unauthorized("Admin token required to create an admin"))?;
        authorize(&actor, Resource::Admin, Action::Create)?;
    }

    let user = blocking(&state, move |facade| facade.create_user(req)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let users = blocking(&state, |facade| facade.get_all_users()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| facade.get_user(&user_id)).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| facade.update_user(&actor, &user_id, req)).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |facade| facade.delete_user(&actor, &user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
