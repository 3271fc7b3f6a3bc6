pub mod error;
pub mod facade;
pub mod password;
pub mod policy;

pub use error::ServiceError;
pub use facade::HbnbFacade;
pub use policy::{Action, Actor, Resource, authorize};
