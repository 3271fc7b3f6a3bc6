use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{admin, amenities, places, reviews, users};

/// The full `/api/v1` surface. Routes that need a caller sit behind
/// `require_auth`; the rest are public.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/", post(users::create_user))
        .route("/users/{user_id}", get(users::get_user))
        .route("/places/", get(places::list_places))
        .route("/places/{place_id}", get(places::get_place))
        .route("/places/{place_id}/reviews", get(places::place_reviews))
        .route("/reviews/", get(reviews::list_reviews))
        .route("/reviews/{review_id}", get(reviews::get_review))
        .route("/amenities/", get(amenities::list_amenities))
        .route("/amenities/{amenity_id}", get(amenities::get_amenity));

    let protected_routes = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/users/", get(users::list_users))
        .route(
            "/users/{user_id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/places/", post(places::create_place))
        .route(
            "/places/{place_id}",
            put(places::update_place).delete(places::delete_place),
        )
        .route(
            "/places/{place_id}/amenities/{amenity_id}",
            post(places::add_amenity),
        )
        .route("/reviews/", post(reviews::create_review))
        .route(
            "/reviews/{review_id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/amenities/", post(amenities::create_amenity))
        .route(
            "/amenities/{amenity_id}",
            put(amenities::update_amenity).delete(amenities::delete_amenity),
        )
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users/{user_id}/toggle-admin", put(admin::toggle_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
