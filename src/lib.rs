//! # Portfolio API
//!
//! Session-authenticated backend for a personal portfolio, built on
//! [axum](https://crates.io/crates/axum), [`tower-sessions`](https://crates.io/crates/tower-sessions)
//! and [Sea-ORM](https://crates.io/crates/sea-orm).
//!
//! ## Features
//!
//! - A generic [`Repository`] over Sea-ORM entities with soft delete,
//!   column-checked filters and pagination
//! - Argon2id password storage and login by username or email
//! - Sessions persisted in the database through [`DbSessionStore`], bound to
//!   the client by an HMAC-signed cookie
//! - Remember-me sessions with rolling expiry
//! - A WebSocket side channel that authenticates from the same cookie and
//!   tracks presence
//! - Role-based access control with `user`, `admin` and `owner` roles
//!
//! ## Quick Start
//!
//! ```no_run
//! use portfolio_api::config::Config;
//! use portfolio_api::http::{create_router, AppState};
//! use portfolio_api::database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let db = database::connect(&config).await?;
//! let app = create_router(AppState::new(&config, db)?);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Entity Store
//!
//! ```no_run
//! use portfolio_api::entity::skill;
//! use portfolio_api::repository::{DeleteOptions, Filter, FindOptions, Repository};
//!
//! # async fn example(db: sea_orm::DatabaseConnection) -> portfolio_api::Result<()> {
//! let skills: Repository<skill::Entity> = Repository::new(db);
//!
//! // Soft delete; the row stays readable with `include_deleted`
//! skills.delete(Filter::eq("slug", "rust"), DeleteOptions::default()).await?;
//! assert!(skills.find_one(Filter::eq("slug", "rust"), FindOptions::default()).await?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod http;
#[cfg(feature = "migration")]
pub mod migration;
pub mod repository;
pub mod services;
pub mod socket;
pub mod store;
pub mod telemetry;

pub use error::{Error, Result};
pub use repository::Repository;

/// The database-backed session store.
///
/// See [`DbSessionStore`](store::DbSessionStore) for details.
pub use store::DbSessionStore;

// Re-export necessary types from tower-sessions for convenience
/// Session storage error types and results
pub use tower_sessions::session_store;

/// Trait for implementing session store expiration cleanup
///
/// Implemented by `DbSessionStore`; the server binary calls it periodically.
pub use tower_sessions::ExpiredDeletion;

/// Session identifier type
pub use tower_sessions::session::Id;

/// Session record type
pub use tower_sessions::session::Record;

/// Session handle extracted in request handlers
pub use tower_sessions::Session;

/// Trait for implementing session storage backends
pub use tower_sessions::SessionStore;
