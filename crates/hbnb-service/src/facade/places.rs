use rusqlite::Connection;
use tracing::info;

use hbnb_db::models::{AmenityRow, PlaceRow, UserRow, now};
use hbnb_db::{Patch, Repository, queries};
use hbnb_types::api::{CreatePlaceRequest, UpdatePlaceRequest};
use hbnb_types::models::{Place, Review};
use hbnb_types::validate;

use super::{HbnbFacade, assemble_place, load_place, new_id, require_place};
use crate::error::{Result, ServiceError};
use crate::policy::{Action, Actor, Resource, authorize};

/// Every id must name an existing amenity.
fn check_amenities(conn: &Connection, amenity_ids: &[String]) -> Result<()> {
    let repo = Repository::<AmenityRow>::new(conn);
    for amenity_id in amenity_ids {
        if repo.get(amenity_id)?.is_none() {
            return Err(ServiceError::NotFound("Amenity"));
        }
    }
    Ok(())
}

impl HbnbFacade {
    /// Creates a place owned by `actor`. Listed amenities are checked before
    /// the insert and linked after it, in the same transaction.
    pub fn create_place(&self, actor: &Actor, req: CreatePlaceRequest) -> Result<Place> {
        let title = validate::title(&validate::required("title", "Title", req.title)?)?;
        let description =
            validate::description(&validate::required("description", "Description", req.description)?)?;
        let price = validate::price(&validate::required("price", "Price", req.price)?)?;
        let latitude = validate::latitude(&validate::required("latitude", "Latitude", req.latitude)?)?;
        let longitude =
            validate::longitude(&validate::required("longitude", "Longitude", req.longitude)?)?;

        let ts = now();
        let row = PlaceRow {
            id: new_id(),
            title,
            description,
            price,
            latitude,
            longitude,
            owner_id: actor.user_id.clone(),
            created_at: ts.clone(),
            updated_at: ts,
        };

        let place = self.db.transaction(|tx| {
            if Repository::<UserRow>::new(tx).get(&row.owner_id)?.is_none() {
                return Err(ServiceError::NotFound("User"));
            }
            check_amenities(tx, &req.amenities)?;

            Repository::<PlaceRow>::new(tx).add(&row)?;
            for amenity_id in &req.amenities {
                queries::link_amenity(tx, &row.id, amenity_id)?;
            }
            assemble_place(tx, row.clone())
        })?;

        info!("Created place {} for owner {}", place.id, place.owner_id);
        Ok(place)
    }

    pub fn get_place(&self, id: &str) -> Result<Place> {
        self.db.with_conn(|conn| require_place(conn, id))
    }

    pub fn get_all_places(&self) -> Result<Vec<Place>> {
        self.db.with_conn(|conn| {
            Repository::<PlaceRow>::new(conn)
                .get_all()?
                .into_iter()
                .map(|row| assemble_place(conn, row))
                .collect()
        })
    }

    /// Partial update by the owner or an admin. Every provided field is
    /// validated; `amenities`, when present, replaces the whole set.
    pub fn update_place(&self, actor: &Actor, id: &str, req: UpdatePlaceRequest) -> Result<Place> {
        // Existence, ownership and the write share one lock scope.
        self.db.transaction(|tx| {
            let place = require_place(tx, id)?;
            authorize(actor, Resource::Place(&place), Action::Update)?;

            let mut patch = Patch::new();
            if let Some(title) = &req.title {
                patch = patch.set("title", validate::title(title)?);
            }
            if let Some(description) = &req.description {
                patch = patch.set("description", validate::description(description)?);
            }
            if let Some(price) = &req.price {
                patch = patch.set("price", validate::price(price)?);
            }
            if let Some(latitude) = &req.latitude {
                patch = patch.set("latitude", validate::latitude(latitude)?);
            }
            if let Some(longitude) = &req.longitude {
                patch = patch.set("longitude", validate::longitude(longitude)?);
            }

            if let Some(amenity_ids) = &req.amenities {
                check_amenities(tx, amenity_ids)?;
                queries::unlink_place_amenities(tx, id)?;
                for amenity_id in amenity_ids {
                    queries::link_amenity(tx, id, amenity_id)?;
                }
            }
            let row = Repository::<PlaceRow>::new(tx).update(id, &patch)?;
            assemble_place(tx, row)
        })
    }

    /// Removes the place, every review of it and its amenity links, atomically.
    pub fn delete_place(&self, actor: &Actor, id: &str) -> Result<()> {
        let reviews = self.db.transaction(|tx| {
            let place = require_place(tx, id)?;
            authorize(actor, Resource::Place(&place), Action::Delete)?;

            let reviews = queries::delete_reviews_for_place(tx, id)?;
            queries::unlink_place_amenities(tx, id)?;
            Repository::<PlaceRow>::new(tx).delete(id)?;
            Ok::<_, ServiceError>(reviews)
        })?;

        info!("Deleted place {} and {} review(s)", id, reviews);
        Ok(())
    }

    pub fn add_amenity_to_place(&self, actor: &Actor, place_id: &str, amenity_id: &str) -> Result<Place> {
        self.db.transaction(|tx| {
            let place = require_place(tx, place_id)?;
            authorize(actor, Resource::Place(&place), Action::Update)?;

            check_amenities(tx, &[amenity_id.to_string()])?;
            if queries::link_amenity(tx, place_id, amenity_id)? {
                Repository::<PlaceRow>::new(tx).update(place_id, &Patch::new())?;
            }
            require_place(tx, place_id)
        })
    }

    /// Reviews of one place, oldest first. Unknown place is an error, not an
    /// empty list.
    pub fn get_reviews_by_place(&self, place_id: &str) -> Result<Vec<Review>> {
        self.db.with_conn(|conn| {
            if load_place(conn, place_id)?.is_none() {
                return Err(ServiceError::NotFound("Place"));
            }
            let rows = queries::reviews_for_place(conn, place_id)?;
            Ok(rows.into_iter().map(Review::from).collect())
        })
    }
}
