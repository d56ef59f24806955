//! Login lookup and account creation.

use sea_orm::{ColumnTrait, Condition, Set};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::password::PasswordHasher;
use crate::entity::user;
use crate::error::{Error, Result};
use crate::repository::{FindOptions, Repository};

/// Usernames that can never be registered, compared case-insensitively.
pub const BANNED_USERNAMES: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "owner",
    "system",
    "api",
    "null",
    "undefined",
];

pub fn is_banned_username(username: &str) -> bool {
    BANNED_USERNAMES
        .iter()
        .any(|banned| banned.eq_ignore_ascii_case(username))
}

/// Data needed to create an account. `password` is the plain-text password.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Verifies login credentials and creates accounts with hashed passwords.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    users: Repository<user::Entity>,
    hasher: PasswordHasher,
}

impl CredentialVerifier {
    pub fn new(users: Repository<user::Entity>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Look up an account by username or email and check its password.
    ///
    /// Returns `None` both for an unknown login and for a wrong password. An
    /// unknown login is checked against a dummy hash so the two cases cost
    /// the same.
    pub async fn validate_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<user::Model>> {
        let condition = Condition::any()
            .add(user::Column::Username.eq(login))
            .add(user::Column::Email.eq(login));

        match self.users.find_one(condition, FindOptions::default()).await? {
            Some(user) if self.hasher.verify(&user.password, password) => Ok(Some(user)),
            Some(user) => {
                debug!(user = %user.uuid, "password mismatch");
                Ok(None)
            }
            None => {
                self.hasher.verify_dummy(password);
                Ok(None)
            }
        }
    }

    /// Create an account after checking the username policy and uniqueness.
    ///
    /// Soft-deleted accounts still hold their username and email.
    pub async fn register(&self, new_user: NewUser) -> Result<user::Model> {
        if is_banned_username(&new_user.username) {
            return Err(Error::BadRequest(format!(
                "Username \"{}\" is not allowed",
                new_user.username
            )));
        }

        let username_taken = self
            .users
            .find_one(
                user::Column::Username.eq(new_user.username.as_str()),
                FindOptions::including_deleted(),
            )
            .await?
            .is_some();
        if username_taken {
            return Err(Error::Conflict(format!(
                "Username {} is already in use",
                new_user.username
            )));
        }

        let email_taken = self
            .users
            .find_one(
                user::Column::Email.eq(new_user.email.as_str()),
                FindOptions::including_deleted(),
            )
            .await?
            .is_some();
        if email_taken {
            return Err(Error::Conflict(format!(
                "Email {} is already in use",
                new_user.email
            )));
        }

        let password = self.hasher.hash(&new_user.password)?;
        let user = self
            .users
            .create(user::ActiveModel {
                username: Set(new_user.username),
                email: Set(new_user.email),
                password: Set(password),
                ..Default::default()
            })
            .await?;

        info!(user = %user.uuid, "user registered");
        Ok(user)
    }
}
