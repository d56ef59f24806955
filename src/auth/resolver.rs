//! Mapping between a session and the account it is bound to.

use sea_orm::ColumnTrait;
use serde::{Deserialize, Serialize};
use tower_sessions::session::Record;
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::entity::user;
use crate::error::Result;
use crate::repository::{FindOptions, Repository};

/// Session key holding the identity binding.
pub const PASSPORT_KEY: &str = "passport";
/// Session key holding the remember-me flag.
pub const REMEMBER_ME_KEY: &str = "rememberMe";
/// Session key counting rolling expiry refreshes.
pub const REGENERATION_COUNTER_KEY: &str = "regenerationCounter";

/// Identity binding stored in a session record: `{ "user": <uuid> }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub user: Uuid,
}

impl Passport {
    /// Read the binding from a live session.
    pub async fn from_session(session: &Session) -> Result<Option<Self>> {
        Ok(session.get::<Self>(PASSPORT_KEY).await?)
    }

    /// Read the binding from a raw store record. A malformed binding reads as absent.
    pub fn from_record(record: &Record) -> Option<Self> {
        let value = record.data.get(PASSPORT_KEY)?;
        serde_json::from_value(value.clone()).ok()
    }
}

/// Serializes accounts into sessions and resolves them back.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    users: Repository<user::Entity>,
}

impl IdentityResolver {
    pub fn new(users: Repository<user::Entity>) -> Self {
        Self { users }
    }

    /// The durable identifier written into the session.
    pub fn serialize(&self, user: &user::Model) -> Uuid {
        user.uuid
    }

    /// Look up the account bound to a session. Soft-deleted accounts resolve to `None`.
    pub async fn deserialize(&self, uuid: Uuid) -> Result<Option<user::Model>> {
        self.users
            .find_one(user::Column::Uuid.eq(uuid), FindOptions::default())
            .await
    }

    /// Like [`deserialize`](Self::deserialize), but a lookup failure is logged
    /// and reads as anonymous.
    pub async fn resolve(&self, uuid: Uuid) -> Option<user::Model> {
        match self.deserialize(uuid).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user = %uuid, error = %e, "failed to resolve session identity");
                None
            }
        }
    }
}
