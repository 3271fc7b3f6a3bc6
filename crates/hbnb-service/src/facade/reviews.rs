use tracing::info;

use hbnb_db::models::{PlaceRow, ReviewRow, UserRow, now};
use hbnb_db::{Patch, Repository, queries};
use hbnb_types::api::{CreateReviewRequest, UpdateReviewRequest};
use hbnb_types::models::Review;
use hbnb_types::validate;

use super::{HbnbFacade, new_id};
use crate::error::{Result, ServiceError};
use crate::policy::{Action, Actor, Resource, authorize};

impl HbnbFacade {
    /// Posts a review as `actor`. Owners cannot review their own place and
    /// each user reviews a place at most once.
    pub fn create_review(&self, actor: &Actor, req: CreateReviewRequest) -> Result<Review> {
        let text = validate::review_text(&validate::required("text", "Text", req.text)?)?;
        let rating = validate::rating(&validate::required("rating", "Rating", req.rating)?)?;
        let place_id = validate::required("place_id", "Place id", req.place_id)?;

        let ts = now();
        let row = ReviewRow {
            id: new_id(),
            text,
            rating,
            place_id,
            user_id: actor.user_id.clone(),
            created_at: ts.clone(),
            updated_at: ts,
        };

        self.db.transaction(|tx| {
            let places = Repository::<PlaceRow>::new(tx);
            let place = places
                .get(&row.place_id)?
                .ok_or(ServiceError::NotFound("Place"))?;
            if Repository::<UserRow>::new(tx).get(&row.user_id)?.is_none() {
                return Err(ServiceError::NotFound("User"));
            }
            if place.owner_id == row.user_id {
                return Err(ServiceError::Rule("You cannot review your own place".into()));
            }
            if queries::review_by_user_for_place(tx, &row.user_id, &row.place_id)?.is_some() {
                return Err(ServiceError::Conflict(
                    "You have already reviewed this place".into(),
                ));
            }

            Repository::<ReviewRow>::new(tx).add(&row)?;
            // The place's review list changed.
            places.update(&row.place_id, &Patch::new())?;
            Ok(())
        })?;

        info!("User {} reviewed place {}", row.user_id, row.place_id);
        Ok(Review::from(row))
    }

    pub fn get_review(&self, id: &str) -> Result<Review> {
        let row = self
            .db
            .with_conn(|conn| Repository::<ReviewRow>::new(conn).get(id))?;
        row.map(Review::from).ok_or(ServiceError::NotFound("Review"))
    }

    pub fn get_all_reviews(&self) -> Result<Vec<Review>> {
        let rows = self
            .db
            .with_conn(|conn| Repository::<ReviewRow>::new(conn).get_all())?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Author or admin may change text and rating. The place and author of a
    /// review never change.
    pub fn update_review(&self, actor: &Actor, id: &str, req: UpdateReviewRequest) -> Result<Review> {
        let review = self.get_review(id)?;
        authorize(actor, Resource::Review(&review), Action::Update)?;

        let mut patch = Patch::new();
        if let Some(text) = req.text {
            patch = patch.set("text", validate::review_text(&text)?);
        }
        if let Some(rating) = req.rating {
            patch = patch.set("rating", validate::rating(&rating)?);
        }

        let row = self
            .db
            .with_conn(|conn| Repository::<ReviewRow>::new(conn).update(id, &patch))?;
        Ok(Review::from(row))
    }

    pub fn delete_review(&self, actor: &Actor, id: &str) -> Result<()> {
        let review = self.get_review(id)?;
        authorize(actor, Resource::Review(&review), Action::Delete)?;

        self.db.transaction(|tx| {
            Repository::<ReviewRow>::new(tx).delete(id)?;
            Repository::<PlaceRow>::new(tx).update(&review.place_id, &Patch::new())?;
            Ok::<_, ServiceError>(())
        })?;

        info!("Deleted review {} of place {}", id, review.place_id);
        Ok(())
    }
}
