use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};

use hbnb_service::{Actor, HbnbFacade, ServiceError};
use hbnb_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use hbnb_types::models::User;

use crate::error::ApiError;
use crate::extract::ApiJson;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub facade: HbnbFacade,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl: i64,
}

/// Runs a facade call on the blocking pool; SQLite access is synchronous.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&HbnbFacade) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.facade))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| facade.create_user(req.into())).await?;
    let access_token = create_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user, access_token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| {
        facade.authenticate_user(&req.email, &req.password)
    })
    .await?;

    let access_token = create_token(&state, &user)?;
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        access_token,
        user_id: user.id,
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |facade| facade.get_user(&actor.user_id)).await?;
    Ok(Json(user))
}

/// HS256 token carrying the user id and the admin flag at issue time.
pub fn create_token(state: &AppStateInner, user: &User) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let exp = now
        .checked_add(state.token_ttl)
        .and_then(|exp| usize::try_from(exp).ok())
        .ok_or_else(|| ApiError::Internal(format!("token lifetime {}s is out of range", state.token_ttl)))?;
    let claims = Claims {
        sub: user.id.clone(),
        is_admin: user.is_admin,
        iat: now as usize,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))
}
