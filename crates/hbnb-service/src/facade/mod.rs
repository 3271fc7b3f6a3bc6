//! The service instance every handler talks to.
//!
//! Built once at startup around a [`Database`] and shared through router
//! state. Each public method is one business operation; those that write more
//! than one row run inside a single transaction.

mod amenities;
mod places;
mod reviews;
mod users;

use rusqlite::Connection;
use uuid::Uuid;

use hbnb_db::models::{AmenityRow, PlaceRow, ReviewRow, UserRow};
use hbnb_db::{Database, Repository, queries};
use hbnb_types::models::{Place, Stats};

use crate::error::{Result, ServiceError};
use crate::policy::{Action, Actor, Resource, authorize};

pub struct HbnbFacade {
    db: Database,
}

impl HbnbFacade {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Row counts for the admin dashboard.
    pub fn stats(&self, actor: &Actor) -> Result<Stats> {
        authorize(actor, Resource::Admin, Action::Read)?;

        self.db.with_conn(|conn| {
            Ok(Stats {
                total_users: Repository::<UserRow>::new(conn).count()?,
                total_places: Repository::<PlaceRow>::new(conn).count()?,
                total_reviews: Repository::<ReviewRow>::new(conn).count()?,
                total_amenities: Repository::<AmenityRow>::new(conn).count()?,
                admin_users: Repository::<UserRow>::new(conn).count_by_attribute("is_admin", true)?,
            })
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Loads a place together with its review and amenity ids.
fn load_place(conn: &Connection, id: &str) -> Result<Option<Place>> {
    let Some(row) = Repository::<PlaceRow>::new(conn).get(id)? else {
        return Ok(None);
    };
    Ok(Some(assemble_place(conn, row)?))
}

fn require_place(conn: &Connection, id: &str) -> Result<Place> {
    load_place(conn, id)?.ok_or(ServiceError::NotFound("Place"))
}

fn assemble_place(conn: &Connection, row: PlaceRow) -> Result<Place> {
    let reviews = queries::review_ids_for_place(conn, &row.id)?;
    let amenities = queries::amenity_ids_for_place(conn, &row.id)?;
    Ok(row.into_place(reviews, amenities))
}

#[cfg(test)]
pub(crate) mod testing {
    use hbnb_db::Database;
    use hbnb_types::api::{CreatePlaceRequest, CreateUserRequest};
    use hbnb_types::models::{Place, User};
    use serde_json::json;

    use super::HbnbFacade;
    use crate::policy::Actor;

    pub fn facade() -> HbnbFacade {
        HbnbFacade::new(Database::open_in_memory().unwrap())
    }

    pub fn user(facade: &HbnbFacade, email: &str, is_admin: bool) -> (User, Actor) {
        let user = facade
            .create_user(CreateUserRequest {
                first_name: Some("Test".into()),
                last_name: Some("User".into()),
                email: Some(email.into()),
                password: Some("secret123".into()),
                is_admin,
            })
            .unwrap();
        let actor = Actor::from(&user);
        (user, actor)
    }

    pub fn place_request(title: &str) -> CreatePlaceRequest {
        CreatePlaceRequest {
            title: Some(title.into()),
            description: Some("A quiet place".into()),
            price: Some(json!(120)),
            latitude: Some(json!(48.85)),
            longitude: Some(json!(2.35)),
            amenities: vec![],
        }
    }

    pub fn place(facade: &HbnbFacade, owner: &Actor, title: &str) -> Place {
        facade.create_place(owner, place_request(title)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing;
    use crate::ServiceError;

    #[test]
    fn stats_count_everything_for_admins_only() {
        let facade = testing::facade();
        let (_, admin) = testing::user(&facade, "admin@example.com", true);
        let (_, owner) = testing::user(&facade, "owner@example.com", false);
        testing::place(&facade, &owner, "Loft");

        let stats = facade.stats(&admin).unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.total_places, 1);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.total_amenities, 0);

        let err = facade.stats(&owner).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
