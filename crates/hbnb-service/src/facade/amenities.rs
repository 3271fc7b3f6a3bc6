use tracing::info;

use hbnb_db::models::{AmenityRow, now};
use hbnb_db::{Patch, Repository, queries};
use hbnb_types::api::AmenityRequest;
use hbnb_types::models::Amenity;
use hbnb_types::validate;

use super::{HbnbFacade, new_id};
use crate::error::{Result, ServiceError};
use crate::policy::{Action, Actor, Resource, authorize};

const DUPLICATE_NAME: &str = "Amenity already exists";

impl HbnbFacade {
    pub fn create_amenity(&self, actor: &Actor, req: AmenityRequest) -> Result<Amenity> {
        authorize(actor, Resource::Amenity, Action::Create)?;
        let name = validate::amenity_name(&validate::required("name", "Name", req.name)?)?;

        let ts = now();
        let row = AmenityRow {
            id: new_id(),
            name,
            created_at: ts.clone(),
            updated_at: ts,
        };

        self.db.transaction(|tx| {
            let repo = Repository::<AmenityRow>::new(tx);
            if repo.get_by_attribute("name", &row.name)?.is_some() {
                return Err(ServiceError::Conflict(DUPLICATE_NAME.into()));
            }
            repo.add(&row)?;
            Ok(())
        })?;

        info!("Created amenity {} ({})", row.name, row.id);
        Ok(Amenity::from(row))
    }

    pub fn get_amenity(&self, id: &str) -> Result<Amenity> {
        let row = self
            .db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).get(id))?;
        row.map(Amenity::from).ok_or(ServiceError::NotFound("Amenity"))
    }

    pub fn get_all_amenities(&self) -> Result<Vec<Amenity>> {
        let rows = self
            .db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).get_all())?;
        Ok(rows.into_iter().map(Amenity::from).collect())
    }

    pub fn update_amenity(&self, actor: &Actor, id: &str, req: AmenityRequest) -> Result<Amenity> {
        authorize(actor, Resource::Amenity, Action::Update)?;
        self.get_amenity(id)?;

        let mut patch = Patch::new();
        let name = req.name.as_deref().map(validate::amenity_name).transpose()?;
        if let Some(name) = &name {
            patch = patch.set("name", name.clone());
        }

        let row = self.db.transaction(|tx| {
            let repo = Repository::<AmenityRow>::new(tx);
            if let Some(name) = &name {
                if let Some(existing) = repo.get_by_attribute("name", name)? {
                    if existing.id != id {
                        return Err(ServiceError::Conflict(DUPLICATE_NAME.into()));
                    }
                }
            }
            Ok(repo.update(id, &patch)?)
        })?;
        Ok(Amenity::from(row))
    }

    /// Deletes the amenity and detaches it from every place.
    pub fn delete_amenity(&self, actor: &Actor, id: &str) -> Result<()> {
        authorize(actor, Resource::Amenity, Action::Delete)?;
        self.get_amenity(id)?;

        let detached = self.db.transaction(|tx| {
            let detached = queries::unlink_amenity(tx, id)?;
            Repository::<AmenityRow>::new(tx).delete(id)?;
            Ok::<_, ServiceError>(detached)
        })?;

        info!("Deleted amenity {} from {} place(s)", id, detached);
        Ok(())
    }
}
