//! User lookups used by reservation ownership.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user after checking that name and email are not blank.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: String,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::BlankField { field: "User name" });
    }
    if email.trim().is_empty() {
        return Err(Error::BlankField { field: "Email" });
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        ..Default::default()
    };
    user.insert(db).await.map_err(Into::into)
}

/// Finds a user by id, returning None if absent.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}
