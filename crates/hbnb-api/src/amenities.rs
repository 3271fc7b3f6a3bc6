use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hbnb_service::Actor;
use hbnb_types::api::AmenityRequest;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::ApiJson;

pub async fn create_amenity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<AmenityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let amenity = blocking(&state, move |facade| facade.create_amenity(&actor, req)).await?;
    Ok((StatusCode::CREATED, Json(amenity)))
}

pub async fn list_amenities(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let amenities = blocking(&state, |facade| facade.get_all_amenities()).await?;
    Ok(Json(amenities))
}

pub async fn get_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let amenity = blocking(&state, move |facade| facade.get_amenity(&amenity_id)).await?;
    Ok(Json(amenity))
}

pub async fn update_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<AmenityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let amenity =
        blocking(&state, move |facade| facade.update_amenity(&actor, &amenity_id, req)).await?;
    Ok(Json(amenity))
}

pub async fn delete_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |facade| facade.delete_amenity(&actor, &amenity_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
