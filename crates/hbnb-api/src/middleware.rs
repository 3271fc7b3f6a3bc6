use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use hbnb_service::{Actor, ServiceError};
use hbnb_types::api::Claims;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;

const MISSING_TOKEN: &str = "Missing or invalid token";
const UNKNOWN_USER: &str = "User no longer exists";

/// Validate the bearer token, reload the caller, and expose it to handlers as
/// an `Extension<Actor>`. The stored admin flag wins over the token's claim.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(req.headers(), &state.jwt_secret)
        .ok_or(ApiError::Unauthorized(MISSING_TOKEN))?;

    let actor = load_actor(&state, claims.sub).await?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// For public routes that behave differently for a signed-in caller. A bad
/// token is treated as no token.
pub async fn optional_actor(state: &AppState, headers: &HeaderMap) -> Result<Option<Actor>, ApiError> {
    let Some(claims) = bearer_claims(headers, &state.jwt_secret) else {
        return Ok(None);
    };
    match load_actor(state, claims.sub).await {
        Ok(actor) => Ok(Some(actor)),
        Err(ApiError::Unauthorized(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    let Authorization(bearer) = headers.typed_get::<Authorization<Bearer>>()?;

    decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .inspect_err(|e| debug!("Rejected bearer token: {}", e))
    .ok()
    .map(|data| data.claims)
}

async fn load_actor(state: &AppState, user_id: String) -> Result<Actor, ApiError> {
    match blocking(state, move |facade| facade.get_user(&user_id)).await {
        Ok(user) => Ok(Actor::from(&user)),
        Err(ApiError::Service(ServiceError::NotFound(_))) => Err(ApiError::Unauthorized(UNKNOWN_USER)),
        Err(other) => Err(other),
    }
}
