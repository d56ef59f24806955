//! Session entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for session storage.
//! It provides the Sea-ORM entity definition that maps to the "sessions" table.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a stored session.
///
/// This entity is used by [`DbSessionStore`](crate::store::DbSessionStore) and
/// you typically won't need to interact with it directly.
///
/// # Database Schema
///
/// | Column      | Type                    | Description                                 |
/// |-------------|-------------------------|---------------------------------------------|
/// | id          | TEXT (Primary Key)      | Store key, `"<prefix>:<session id>"`        |
/// | data        | BYTEA                   | MessagePack serialized session record       |
/// | expiry_date | TIMESTAMPTZ             | Session expiration timestamp                |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// The store key of the session.
    ///
    /// This is the session identifier prefixed with the configured key prefix
    /// (by default `sess:`), so several applications can share one table
    /// without their identifiers colliding.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// The serialized session record.
    ///
    /// Holds the MessagePack representation of the whole `tower_sessions`
    /// record, including the `passport` identity binding and the
    /// `rememberMe` flag written at sign-in.
    pub data: Vec<u8>,

    /// The session expiration timestamp.
    ///
    /// Rows past this date are invisible to loads and are removed by the
    /// periodic expired-session cleanup.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
