use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use hbnb_service::Actor;
use hbnb_types::api::ToggleAdminResponse;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;

pub async fn stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = blocking(&state, move |facade| facade.stats(&actor)).await?;
    Ok(Json(stats))
}

pub async fn toggle_admin(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| facade.toggle_admin(&actor, &user_id)).await?;
    let verb = if user.is_admin { "granted" } else { "revoked" };

    Ok(Json(ToggleAdminResponse {
        message: format!("Admin status {verb}"),
        user,
    }))
}
