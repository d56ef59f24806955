//! Account lookups, updates and response projections.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::user::{self, UserRole};
use crate::error::{Error, Result};
use crate::repository::{FindOptions, Repository};

/// Account as shown to the account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateUser {
    pub uuid: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<&user::Model> for PrivateUser {
    fn from(user: &user::Model) -> Self {
        Self {
            uuid: user.uuid,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Account as shown to anyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub uuid: Uuid,
    pub username: String,
    pub created_at: DateTimeWithTimeZone,
}

impl From<&user::Model> for PublicUser {
    fn from(user: &user::Model) -> Self {
        Self {
            uuid: user.uuid,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Fields an account holder may change. Empty values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UsersService {
    users: Repository<user::Entity>,
}

impl UsersService {
    pub fn new(users: Repository<user::Entity>) -> Self {
        Self { users }
    }

    pub async fn find_user_by_uuid(&self, uuid: Uuid) -> Result<Option<user::Model>> {
        self.users
            .find_one(user::Column::Uuid.eq(uuid), FindOptions::default())
            .await
    }

    pub async fn get_user_by_uuid(&self, uuid: Uuid) -> Result<user::Model> {
        self.find_user_by_uuid(uuid)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    /// Change the username and/or email of an account.
    ///
    /// A value held by another account, soft-deleted or not, is a conflict.
    pub async fn update_user(&self, uuid: Uuid, data: UpdateUser) -> Result<user::Model> {
        let user = self.get_user_by_uuid(uuid).await?;

        let mut changes = user::ActiveModel::default();
        if let Some(username) = data.username.filter(|v| !v.is_empty()) {
            if self.held_by_other(user::Column::Username, &username, uuid).await? {
                return Err(Error::Conflict("Username is already in use".into()));
            }
            changes.username = Set(username);
        }
        if let Some(email) = data.email.filter(|v| !v.is_empty()) {
            if self.held_by_other(user::Column::Email, &email, uuid).await? {
                return Err(Error::Conflict("Email is already in use".into()));
            }
            changes.email = Set(email);
        }

        let updated = self
            .users
            .update(user::Column::Uuid.eq(user.uuid), changes)
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    async fn held_by_other(&self, column: user::Column, value: &str, uuid: Uuid) -> Result<bool> {
        let holder = self
            .users
            .find_one(column.eq(value), FindOptions::including_deleted())
            .await?;
        Ok(holder.is_some_and(|holder| holder.uuid != uuid))
    }
}
