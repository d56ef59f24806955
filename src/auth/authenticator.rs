//! Session lifecycle: sign-in, sign-up, rolling refresh and sign-out.
//!
//! A session moves from anonymous to authenticated when an account is bound
//! to it, and is terminated by sign-out. The binding lives in the session
//! record as `passport = { user: <uuid> }`, next to the `rememberMe` flag that
//! selects the expiry policy.

use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tower_sessions::{Expiry, Session};
use tracing::{debug, info};

use crate::auth::credentials::{CredentialVerifier, NewUser};
use crate::auth::resolver::{
    IdentityResolver, Passport, PASSPORT_KEY, REGENERATION_COUNTER_KEY, REMEMBER_ME_KEY,
};
use crate::config::Config;
use crate::entity::user;
use crate::error::{Error, Result};
use crate::services::users::PrivateUser;

/// Session lifetimes for standard and remember-me sign-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub standard: Duration,
    pub remember_me: Duration,
}

impl ExpiryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            standard: config.session_timeout(),
            remember_me: config.remember_me_timeout(),
        }
    }

    pub fn duration(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.remember_me
        } else {
            self.standard
        }
    }

    /// Absolute expiry for a session signed in now.
    ///
    /// Fails when the lifetime does not fit in a date.
    pub fn expiry(&self, remember_me: bool) -> Result<Expiry> {
        let duration = self.duration(remember_me);
        OffsetDateTime::now_utc()
            .checked_add(duration)
            .map(Expiry::AtDateTime)
            .ok_or_else(|| Error::Config(format!("session lifetime {duration} is out of range")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    credentials: CredentialVerifier,
    resolver: IdentityResolver,
    policy: ExpiryPolicy,
}

impl SessionAuthenticator {
    pub fn new(
        credentials: CredentialVerifier,
        resolver: IdentityResolver,
        policy: ExpiryPolicy,
    ) -> Self {
        Self {
            credentials,
            resolver,
            policy,
        }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    pub fn credentials(&self) -> &CredentialVerifier {
        &self.credentials
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Bind `user` to the session and persist it.
    ///
    /// The session id is regenerated first so an identifier planted before
    /// sign-in is never authenticated.
    pub async fn sign_in(
        &self,
        session: &Session,
        user: &user::Model,
        remember_me: bool,
    ) -> Result<PrivateUser> {
        session.cycle_id().await?;
        session
            .insert(
                PASSPORT_KEY,
                Passport {
                    user: self.resolver.serialize(user),
                },
            )
            .await?;
        session.insert(REMEMBER_ME_KEY, remember_me).await?;
        session.set_expiry(Some(self.policy.expiry(remember_me)?));
        session.save().await?;

        info!(user = %user.uuid, remember_me, "signed in");
        Ok(PrivateUser::from(user))
    }

    /// Verify credentials, then [`sign_in`](Self::sign_in).
    ///
    /// Unknown logins and wrong passwords fail alike with `Unauthorized`.
    pub async fn sign_in_with_credentials(
        &self,
        session: &Session,
        request: SignInRequest,
    ) -> Result<PrivateUser> {
        let user = self
            .credentials
            .validate_credentials(&request.login, &request.password)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))?;
        self.sign_in(session, &user, request.remember_me).await
    }

    /// Create an account and sign it in.
    pub async fn sign_up(&self, session: &Session, request: SignUpRequest) -> Result<PrivateUser> {
        let user = self
            .credentials
            .register(NewUser {
                username: request.username,
                email: request.email,
                password: request.password,
            })
            .await?;
        self.sign_in(session, &user, request.remember_me).await
    }

    /// Drop the identity binding and destroy the session record.
    ///
    /// Clearing the cookie is left to the session middleware, which sees the
    /// emptied session after the handler returns.
    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        let passport = Passport::from_session(session).await?;
        session.remove_value(PASSPORT_KEY).await?;
        session.flush().await?;

        if let Some(passport) = passport {
            info!(user = %passport.user, "signed out");
        }
        Ok(())
    }

    /// Push a remember-me session's expiry forward.
    ///
    /// Returns whether the session was refreshed. Standard sessions keep the
    /// expiry set at sign-in.
    pub async fn refresh_rolling(&self, session: &Session) -> Result<bool> {
        let remember_me = session
            .get::<bool>(REMEMBER_ME_KEY)
            .await?
            .unwrap_or(false);
        if !remember_me {
            return Ok(false);
        }

        let counter = session
            .get::<u64>(REGENERATION_COUNTER_KEY)
            .await?
            .unwrap_or(0);
        session
            .insert(REGENERATION_COUNTER_KEY, counter.saturating_add(1))
            .await?;
        session.set_expiry(Some(self.policy.expiry(true)?));

        debug!(regenerations = counter + 1, "remember-me session refreshed");
        Ok(true)
    }

    /// The account bound to the session, if any.
    pub async fn current_identity(&self, session: &Session) -> Result<Option<user::Model>> {
        match Passport::from_session(session).await? {
            Some(passport) => self.resolver.deserialize(passport.user).await,
            None => Ok(None),
        }
    }
}
