pub mod admin;
pub mod amenities;
pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod places;
pub mod reviews;
pub mod routes;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
