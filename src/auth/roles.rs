//! Role-based access control.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::entity::user::{self, UserRole};
use crate::error::{Error, Result};

const UNAUTHORIZED_MESSAGE: &str = "User is not authenticated";

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create and delete shared content such as skills. Admins and the owner.
    ManageContent,
    /// Edit the portfolio profiles. The owner only.
    OwnPortfolio,
}

impl Capability {
    fn denied_message(self) -> &'static str {
        match self {
            Self::ManageContent => "User is not an admin",
            Self::OwnPortfolio => "User is not an owner",
        }
    }
}

pub fn has_capability(role: UserRole, capability: Capability) -> bool {
    match capability {
        Capability::ManageContent => role >= UserRole::Admin,
        Capability::OwnPortfolio => role == UserRole::Owner,
    }
}

/// `Unauthorized` when no account is attached.
pub fn require_authenticated(user: Option<&user::Model>) -> Result<&user::Model> {
    user.ok_or_else(|| Error::Unauthorized(UNAUTHORIZED_MESSAGE.into()))
}

/// `Unauthorized` when no account is attached, `Forbidden` when its role lacks `capability`.
pub fn require_capability(
    user: Option<&user::Model>,
    capability: Capability,
) -> Result<&user::Model> {
    let user = require_authenticated(user)?;
    if has_capability(user.role, capability) {
        Ok(user)
    } else {
        Err(Error::Forbidden(capability.denied_message().into()))
    }
}

/// The account attached to the request by the session middleware, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<user::Model>);

impl CurrentUser {
    pub fn user(&self) -> Option<&user::Model> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Any signed-in account.
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts.extensions.get::<CurrentUser>().and_then(CurrentUser::user);
        require_authenticated(user).map(|user| Self(user.clone()))
    }
}

/// A signed-in account allowed to manage content.
#[derive(Debug, Clone)]
pub struct ContentManager(pub user::Model);

impl<S> FromRequestParts<S> for ContentManager
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts.extensions.get::<CurrentUser>().and_then(CurrentUser::user);
        require_capability(user, Capability::ManageContent).map(|user| Self(user.clone()))
    }
}

/// The portfolio owner.
#[derive(Debug, Clone)]
pub struct PortfolioOwner(pub user::Model);

impl<S> FromRequestParts<S> for PortfolioOwner
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts.extensions.get::<CurrentUser>().and_then(CurrentUser::user);
        require_capability(user, Capability::OwnPortfolio).map(|user| Self(user.clone()))
    }
}
