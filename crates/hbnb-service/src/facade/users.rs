use tracing::{info, warn};

use hbnb_db::models::{PlaceRow, UserRow, now};
use hbnb_db::{Patch, Repository, queries};
use hbnb_types::api::{CreateUserRequest, UpdateUserRequest};
use hbnb_types::models::User;
use hbnb_types::validate;

use super::{HbnbFacade, new_id};
use crate::error::{Result, ServiceError};
use crate::password::{hash_password, verify_password};
use crate::policy::{Action, Actor, Resource, authorize};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

impl HbnbFacade {
    /// Validates, hashes the password and inserts. The caller decides whether
    /// `is_admin` may be set; see [`crate::policy`].
    pub fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        let first_name = validate::first_name(&validate::required("first_name", "First name", req.first_name)?)?;
        let last_name = validate::last_name(&validate::required("last_name", "Last name", req.last_name)?)?;
        let email = validate::email(&validate::required("email", "Email", req.email)?)?;
        let password = validate::required("password", "Password", req.password)?;
        validate::password(&password)?;

        // Hash before taking the DB lock
        let password_hash = hash_password(&password)?;

        let ts = now();
        let row = UserRow {
            id: new_id(),
            first_name,
            last_name,
            email,
            password: password_hash,
            is_admin: req.is_admin,
            created_at: ts.clone(),
            updated_at: ts,
        };

        self.db.transaction(|tx| {
            let repo = Repository::<UserRow>::new(tx);
            if repo.get_by_attribute("email", &row.email)?.is_some() {
                return Err(ServiceError::Conflict("Email already registered".into()));
            }
            repo.add(&row)?;
            Ok(())
        })?;

        info!("Created user {}", row.id);
        Ok(row.into())
    }

    pub fn get_user(&self, id: &str) -> Result<User> {
        self.db
            .with_conn(|conn| Repository::<UserRow>::new(conn).get(id))?
            .map(User::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Case-insensitive: the address is normalized before lookup.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let row = self
            .db
            .with_conn(|conn| Repository::<UserRow>::new(conn).get_by_attribute("email", &email))?;
        Ok(row.map(User::from))
    }

    pub fn get_all_users(&self) -> Result<Vec<User>> {
        let rows = self
            .db
            .with_conn(|conn| Repository::<UserRow>::new(conn).get_all())?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Users may change their own names. Admins may also change email,
    /// password and admin status of any account.
    pub fn update_user(&self, actor: &Actor, id: &str, req: UpdateUserRequest) -> Result<User> {
        let target = self.get_user(id)?;
        authorize(actor, Resource::User(&target), Action::Update)?;

        if !actor.is_admin {
            if req.email.is_some() {
                return Err(ServiceError::Rule("Email cannot be updated".into()));
            }
            if req.password.is_some() {
                return Err(ServiceError::Rule(
                    "Password cannot be updated through this endpoint".into(),
                ));
            }
            if req.is_admin.is_some() {
                return Err(ServiceError::Rule("Admin status cannot be modified".into()));
            }
        }

        let mut patch = Patch::new();
        if let Some(first_name) = req.first_name {
            patch = patch.set("first_name", validate::first_name(&first_name)?);
        }
        if let Some(last_name) = req.last_name {
            patch = patch.set("last_name", validate::last_name(&last_name)?);
        }
        let email = req.email.as_deref().map(validate::email).transpose()?;
        if let Some(email) = &email {
            patch = patch.set("email", email.clone());
        }
        if let Some(password) = req.password {
            validate::password(&password)?;
            patch = patch.set("password", hash_password(&password)?);
        }
        if let Some(is_admin) = req.is_admin {
            patch = patch.set("is_admin", is_admin);
        }

        let row = self.db.transaction(|tx| {
            let repo = Repository::<UserRow>::new(tx);
            if let Some(email) = &email {
                if let Some(existing) = repo.get_by_attribute("email", email)? {
                    if existing.id != id {
                        return Err(ServiceError::Conflict("Email already registered".into()));
                    }
                }
            }
            Ok(repo.update(id, &patch)?)
        })?;

        Ok(row.into())
    }

    /// Removes the account, the places it owns (with their reviews and
    /// amenity links) and every review it wrote, atomically.
    pub fn delete_user(&self, actor: &Actor, id: &str) -> Result<()> {
        let target = self.get_user(id)?;
        authorize(actor, Resource::User(&target), Action::Delete)?;

        let (places, reviews) = self.db.transaction(|tx| {
            let mut reviews = queries::delete_reviews_by_user(tx, id)?;
            let place_ids = queries::place_ids_for_owner(tx, id)?;
            let places = Repository::<PlaceRow>::new(tx);
            for place_id in &place_ids {
                reviews += queries::delete_reviews_for_place(tx, place_id)?;
                queries::unlink_place_amenities(tx, place_id)?;
                places.delete(place_id)?;
            }
            Repository::<UserRow>::new(tx).delete(id)?;
            Ok::<_, ServiceError>((place_ids.len(), reviews))
        })?;

        info!(
            "Deleted user {} with {} place(s) and {} review(s)",
            id, places, reviews
        );
        Ok(())
    }

    /// Resolves a login. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.get_user_by_email(email)? else {
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()));
        }
        Ok(user)
    }

    /// Flips `is_admin` on the target account.
    pub fn toggle_admin(&self, actor: &Actor, id: &str) -> Result<User> {
        authorize(actor, Resource::Admin, Action::Update)?;
        let target = self.get_user(id)?;

        let row = self.db.with_conn(|conn| {
            Repository::<UserRow>::new(conn).update(id, &Patch::new().set("is_admin", !target.is_admin))
        })?;

        info!(
            "Admin status of user {} set to {} by {}",
            id, row.is_admin, actor.user_id
        );
        Ok(row.into())
    }

    /// Creates the bootstrap admin account unless the email is already taken.
    /// Returns whether an account was created.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<bool> {
        if self.get_user_by_email(email)?.is_some() {
            return Ok(false);
        }

        self.create_user(CreateUserRequest {
            first_name: Some("Admin".into()),
            last_name: Some("User".into()),
            email: Some(email.into()),
            password: Some(password.into()),
            is_admin: true,
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::testing;
    use hbnb_types::api::{CreateReviewRequest, CreateUserRequest};
    use serde_json::json;

    fn request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            first_name: Some("Grace".into()),
            last_name: Some("Hopper".into()),
            email: Some(email.into()),
            password: Some("cobol1959".into()),
            is_admin: false,
        }
    }

    #[test]
    fn create_then_get_returns_same_fields() {
        let facade = testing::facade();
        let created = facade.create_user(request("grace@example.com")).unwrap();
        let other = facade.create_user(request("other@example.com")).unwrap();

        let fetched = facade.get_user(&created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.first_name, "Grace");
        assert_eq!(fetched.last_name, "Hopper");
        assert_eq!(fetched.email, "grace@example.com");
        assert!(!fetched.is_admin);
        assert_ne!(created.id, other.id);
        assert_ne!(fetched.password_hash, "cobol1959");
    }

    #[test]
    fn duplicate_email_differing_in_case_is_rejected() {
        let facade = testing::facade();
        facade.create_user(request("grace@example.com")).unwrap();

        let err = facade.create_user(request("Grace@EXAMPLE.com")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Email already registered"));
        assert_eq!(facade.get_all_users().unwrap().len(), 1);
    }

    #[test]
    fn create_validates_fields() {
        let facade = testing::facade();

        let mut req = request("grace@example.com");
        req.first_name = None;
        let err = facade.create_user(req).unwrap_err();
        assert_eq!(err.to_string(), "First name is required");

        let err = facade.create_user(request("not-an-email")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");

        let mut req = request("grace@example.com");
        req.last_name = Some("x".repeat(51));
        assert!(matches!(facade.create_user(req), Err(ServiceError::Validation(_))));

        let mut req = request("grace@example.com");
        req.password = Some("123".into());
        assert!(matches!(facade.create_user(req), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn email_lookup_ignores_case() {
        let facade = testing::facade();
        let created = facade.create_user(request("grace@example.com")).unwrap();
        let found = facade.get_user_by_email("  GRACE@example.com ").unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
    }

    #[test]
    fn authenticate_checks_password() {
        let facade = testing::facade();
        let created = facade.create_user(request("grace@example.com")).unwrap();

        let user = facade.authenticate_user("GRACE@example.com", "cobol1959").unwrap();
        assert_eq!(user.id, created.id);

        let err = facade.authenticate_user("grace@example.com", "fortran").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == "Invalid credentials"));
        let err = facade.authenticate_user("nobody@example.com", "cobol1959").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == "Invalid credentials"));
    }

    #[test]
    fn users_update_their_own_names_only() {
        let facade = testing::facade();
        let (alice, alice_actor) = testing::user(&facade, "alice@example.com", false);
        let (bob, _) = testing::user(&facade, "bob@example.com", false);

        let updated = facade
            .update_user(
                &alice_actor,
                &alice.id,
                UpdateUserRequest {
                    first_name: Some("  Alicia ".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.created_at, alice.created_at);
        assert!(updated.updated_at >= alice.updated_at);

        let err = facade
            .update_user(&alice_actor, &bob.id, UpdateUserRequest::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = facade
            .update_user(
                &alice_actor,
                &alice.id,
                UpdateUserRequest {
                    email: Some("new@example.com".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Email cannot be updated");

        let err = facade
            .update_user(
                &alice_actor,
                &alice.id,
                UpdateUserRequest {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Admin status cannot be modified");

        let err = facade
            .update_user(
                &alice_actor,
                &alice.id,
                UpdateUserRequest {
                    last_name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn admins_update_email_and_password() {
        let facade = testing::facade();
        let (_, admin) = testing::user(&facade, "admin@example.com", true);
        let (alice, _) = testing::user(&facade, "alice@example.com", false);
        testing::user(&facade, "taken@example.com", false);

        let updated = facade
            .update_user(
                &admin,
                &alice.id,
                UpdateUserRequest {
                    email: Some("Alice.New@example.com".into()),
                    password: Some("brand-new-pass".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.email, "alice.new@example.com");
        assert!(facade.authenticate_user("alice.new@example.com", "brand-new-pass").is_ok());

        let err = facade
            .update_user(
                &admin,
                &alice.id,
                UpdateUserRequest {
                    email: Some("TAKEN@example.com".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn update_unknown_user_is_not_found() {
        let facade = testing::facade();
        let (_, admin) = testing::user(&facade, "admin@example.com", true);
        let err = facade
            .update_user(&admin, "missing", UpdateUserRequest::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("User")));
    }

    #[test]
    fn toggle_admin_flips_flag_for_admins_only() {
        let facade = testing::facade();
        let (_, admin) = testing::user(&facade, "admin@example.com", true);
        let (alice, alice_actor) = testing::user(&facade, "alice@example.com", false);

        let err = facade.toggle_admin(&alice_actor, &alice.id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(!facade.get_user(&alice.id).unwrap().is_admin);

        assert!(facade.toggle_admin(&admin, &alice.id).unwrap().is_admin);
        assert!(facade.get_user(&alice.id).unwrap().is_admin);
        assert!(!facade.toggle_admin(&admin, &alice.id).unwrap().is_admin);

        let err = facade.toggle_admin(&admin, "missing").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("User")));
    }

    #[test]
    fn delete_user_cascades_to_places_and_reviews() {
        let facade = testing::facade();
        let (_, admin) = testing::user(&facade, "admin@example.com", true);
        let (owner, owner_actor) = testing::user(&facade, "owner@example.com", false);
        let (_, guest_actor) = testing::user(&facade, "guest@example.com", false);

        let owned = testing::place(&facade, &owner_actor, "Owned");
        let guest_place = testing::place(&facade, &guest_actor, "Guest place");
        facade
            .create_review(
                &guest_actor,
                CreateReviewRequest {
                    text: Some("Great".into()),
                    rating: Some(json!(5)),
                    place_id: Some(owned.id.clone()),
                },
            )
            .unwrap();
        facade
            .create_review(
                &owner_actor,
                CreateReviewRequest {
                    text: Some("Fine".into()),
                    rating: Some(json!(3)),
                    place_id: Some(guest_place.id.clone()),
                },
            )
            .unwrap();

        let err = facade.delete_user(&owner_actor, &owner.id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        facade.delete_user(&admin, &owner.id).unwrap();
        assert!(matches!(facade.get_user(&owner.id), Err(ServiceError::NotFound("User"))));
        assert!(matches!(facade.get_place(&owned.id), Err(ServiceError::NotFound("Place"))));
        assert!(facade.get_all_reviews().unwrap().is_empty());
        assert!(facade.get_place(&guest_place.id).unwrap().reviews.is_empty());
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let facade = testing::facade();
        assert!(facade.ensure_admin("root@example.com", "rootpass").unwrap());
        assert!(!facade.ensure_admin("ROOT@example.com", "rootpass").unwrap());

        let admin = facade.get_user_by_email("root@example.com").unwrap().unwrap();
        assert!(admin.is_admin);
    }
}
