use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::User;

// -- JWT Claims --

/// Bearer token claims. `sub` is the user id; `is_admin` reflects the flag at
/// issue time and is informational only, the gate re-reads the stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(req: RegisterRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            is_admin: false,
        }
    }
}

/// Partial update. Fields left out are untouched; anything not listed here
/// (`id`, timestamps) is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ToggleAdminResponse {
    pub message: String,
    pub user: User,
}

// -- Places --

/// Numeric fields stay raw JSON until validation so that numeric strings can be
/// coerced and everything else rejected with a field message.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    /// Replaces the amenity set when present.
    pub amenities: Option<Vec<String>>,
}

// -- Reviews --

#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewRequest {
    pub text: Option<String>,
    pub rating: Option<Value>,
    pub place_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub rating: Option<Value>,
}

// -- Amenities --

#[derive(Debug, Default, Deserialize)]
pub struct AmenityRequest {
    pub name: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
