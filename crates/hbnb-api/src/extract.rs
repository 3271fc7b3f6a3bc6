use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json`, but a bad body answers 400 in the error envelope instead of
/// axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
