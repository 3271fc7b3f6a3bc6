use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hbnb_service::Actor;
use hbnb_types::api::{CreateReviewRequest, UpdateReviewRequest};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::ApiJson;

pub async fn create_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = blocking(&state, move |facade| facade.create_review(&actor, req)).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list_reviews(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let reviews = blocking(&state, |facade| facade.get_all_reviews()).await?;
    Ok(Json(reviews))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let review = blocking(&state, move |facade| facade.get_review(&review_id)).await?;
    Ok(Json(review))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<UpdateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = blocking(&state, move |facade| facade.update_review(&actor, &review_id, req)).await?;
    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |facade| facade.delete_review(&actor, &review_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
