//! Session cookie handling shared by every transport.
//!
//! The HTTP session middleware and the WebSocket handshake both go through
//! [`SessionGateway`]: the same cookie name, the same signing secret and the
//! same store, so a session authenticates identically on either channel.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use time::{Duration, OffsetDateTime};
use tower_sessions::cookie::Cookie;
use tower_sessions::session::{Id, Record};
use tower_sessions::{Expiry, Session, SessionStore};

use crate::auth::cookie::CookieSigner;
use crate::config::CookieSettings;
use crate::error::Result;
use crate::store::DbSessionStore;

#[derive(Debug, Clone)]
pub struct SessionGateway {
    signer: CookieSigner,
    store: Arc<DbSessionStore>,
    cookie: CookieSettings,
    default_expiry: Duration,
}

impl SessionGateway {
    pub fn new(
        signer: CookieSigner,
        store: DbSessionStore,
        cookie: CookieSettings,
        default_expiry: Duration,
    ) -> Self {
        Self {
            signer,
            store: Arc::new(store),
            cookie,
            default_expiry,
        }
    }

    pub fn store(&self) -> &DbSessionStore {
        &self.store
    }

    /// Verified session id carried by the `Cookie` headers of a request.
    pub fn session_id_from_headers(&self, headers: &HeaderMap) -> Option<Id> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| self.session_id_from_cookie_header(value))
    }

    /// Verified session id carried by a raw `Cookie` header.
    ///
    /// Returns `None` when the session cookie is absent, unsigned, badly
    /// signed, or does not hold a well-formed session id.
    pub fn session_id_from_cookie_header(&self, header: &str) -> Option<Id> {
        let raw = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie.name)
            .map(|(_, value)| value.trim().trim_matches('"'))?;

        let decoded = urlencoding::decode(raw).ok()?;
        let value = self.signer.unsign(&decoded)?;
        Id::from_str(&value).ok()
    }

    /// A session handle bound to `id` (or a fresh one), backed by the shared store.
    pub fn session(&self, id: Option<Id>) -> Session {
        Session::new(
            id,
            self.store.clone(),
            Some(Expiry::OnInactivity(self.default_expiry)),
        )
    }

    /// Read a session record without going through a [`Session`].
    ///
    /// Expired and unknown sessions read as `None`.
    pub async fn load_record(&self, id: &Id) -> Result<Option<Record>> {
        Ok(self.store.load(id).await?)
    }

    /// `Set-Cookie` value carrying the signed session id.
    pub fn session_cookie(&self, id: &Id, max_age: Option<Duration>) -> Cookie<'static> {
        let value = urlencoding::encode(&self.signer.sign(&id.to_string())).into_owned();
        let mut builder = Cookie::build((self.cookie.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(self.cookie.same_site);
        if let Some(max_age) = max_age {
            builder = builder.max_age(max_age);
            if let Some(expires) = OffsetDateTime::now_utc().checked_add(max_age) {
                builder = builder.expires(expires);
            }
        }
        builder.build()
    }

    /// `Set-Cookie` value that makes the client drop the session cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.cookie.name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(self.cookie.same_site)
            .build();
        cookie.make_removal();
        cookie
    }
}
