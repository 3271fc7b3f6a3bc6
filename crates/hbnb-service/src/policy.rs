//! One authorization check for every guarded operation.
//!
//! - No IO
//! - Admins pass every check
//! - Ownership is compared by id

use hbnb_types::models::{Place, Review, User};

use crate::error::{Result, ServiceError};

/// The authenticated caller, built from the stored user rather than token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Place(&'a Place),
    Review(&'a Review),
    User(&'a User),
    Amenity,
    /// Statistics, role changes, account management.
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

const NOT_OWNER: &str = "Unauthorized action";
const ADMIN_ONLY: &str = "Admin privileges required";

pub fn authorize(actor: &Actor, resource: Resource<'_>, action: Action) -> Result<()> {
    if actor.is_admin {
        return Ok(());
    }

    let owner = match (resource, action) {
        (_, Action::Read) if !matches!(resource, Resource::Admin) => return Ok(()),
        (Resource::Place(_) | Resource::Review(_), Action::Create) => return Ok(()),
        (Resource::Place(place), _) => &place.owner_id,
        (Resource::Review(review), _) => &review.user_id,
        (Resource::User(user), Action::Update) => &user.id,
        (Resource::User(_) | Resource::Amenity | Resource::Admin, _) => {
            return Err(ServiceError::Forbidden(ADMIN_ONLY.into()));
        }
    };

    if *owner == actor.user_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(NOT_OWNER.into()))
    }
}
