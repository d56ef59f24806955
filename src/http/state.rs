//! Application state shared across handlers.

use sea_orm::DatabaseConnection;

use crate::auth::{
    CookieSigner, CredentialVerifier, ExpiryPolicy, IdentityResolver, PasswordHasher,
    SessionAuthenticator, SessionGateway,
};
use crate::config::Config;
use crate::error::Result;
use crate::repository::Repository;
use crate::services::{ContactMessagesService, ProfilesService, SkillsService, UsersService};
use crate::socket::{HandshakeAuthenticator, PresenceRegistry};
use crate::store::DbSessionStore;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: SessionGateway,
    pub auth: SessionAuthenticator,
    pub handshake: HandshakeAuthenticator,
    pub presence: PresenceRegistry,
    pub users: UsersService,
    pub profiles: ProfilesService,
    pub skills: SkillsService,
    pub contact_messages: ContactMessagesService,
}

impl AppState {
    /// Wire every component from the configuration and a connected database.
    pub fn new(config: &Config, db: DatabaseConnection) -> Result<Self> {
        let max_page_size = config.max_page_size;
        let users = Repository::new(db.clone()).with_max_page_size(max_page_size);
        let profiles = Repository::new(db.clone()).with_max_page_size(max_page_size);

        let hasher =
            PasswordHasher::new(config.password_hash_memory_kib, config.password_hash_iterations)?;
        let store = DbSessionStore::new(db.clone()).with_key_prefix(&config.session_key_prefix);
        let gateway = SessionGateway::new(
            CookieSigner::new(&config.secret_key)?,
            store,
            config.cookie_settings(),
            config.session_timeout(),
        );

        let resolver = IdentityResolver::new(users.clone());
        let auth = SessionAuthenticator::new(
            CredentialVerifier::new(users.clone(), hasher),
            resolver.clone(),
            ExpiryPolicy::from_config(config),
        );
        let handshake = HandshakeAuthenticator::new(gateway.clone(), resolver);

        Ok(Self {
            gateway,
            auth,
            handshake,
            presence: PresenceRegistry::new(),
            users: UsersService::new(users),
            profiles: ProfilesService::new(
                profiles.clone(),
                Repository::new(db.clone()).with_max_page_size(max_page_size),
                Repository::new(db.clone()).with_max_page_size(max_page_size),
            ),
            skills: SkillsService::new(
                Repository::new(db.clone()).with_max_page_size(max_page_size),
            ),
            contact_messages: ContactMessagesService::new(
                Repository::new(db.clone()).with_max_page_size(max_page_size),
                profiles,
            ),
            db,
        })
    }
}
