use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hbnb_service::Actor;
use hbnb_types::api::{CreatePlaceRequest, UpdatePlaceRequest};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::ApiJson;

/// The caller becomes the owner.
pub async fn create_place(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreatePlaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let place = blocking(&state, move |facade| facade.create_place(&actor, req)).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

pub async fn list_places(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let places = blocking(&state, |facade| facade.get_all_places()).await?;
    Ok(Json(places))
}

pub async fn get_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let place = blocking(&state, move |facade| facade.get_place(&place_id)).await?;
    Ok(Json(place))
}

pub async fn update_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<UpdatePlaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let place = blocking(&state, move |facade| facade.update_place(&actor, &place_id, req)).await?;
    Ok(Json(place))
}

pub async fn delete_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |facade| facade.delete_place(&actor, &place_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn place_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = blocking(&state, move |facade| facade.get_reviews_by_place(&place_id)).await?;
    Ok(Json(reviews))
}

pub async fn add_amenity(
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let place = blocking(&state, move |facade| {
        facade.add_amenity_to_place(&actor, &place_id, &amenity_id)
    })
    .await?;
    Ok(Json(place))
}
