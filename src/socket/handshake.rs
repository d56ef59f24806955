//! Authentication of WebSocket connections from their handshake cookie.

use axum::http::{header, HeaderMap};
use tracing::{debug, warn};

use crate::auth::gateway::SessionGateway;
use crate::auth::resolver::{IdentityResolver, Passport};
use crate::entity::user;

/// Per-connection state, resolved once before any message is handled.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    pub user: Option<user::Model>,
}

/// Resolves the account behind a WebSocket handshake.
///
/// The handshake does not pass through the HTTP session middleware, so the
/// session is read here through the same [`SessionGateway`]. Nothing in this
/// path fails the connection: a missing, unsigned, tampered or expired
/// cookie, or a lookup failure, only yields an anonymous connection.
#[derive(Debug, Clone)]
pub struct HandshakeAuthenticator {
    gateway: SessionGateway,
    resolver: IdentityResolver,
}

impl HandshakeAuthenticator {
    pub fn new(gateway: SessionGateway, resolver: IdentityResolver) -> Self {
        Self { gateway, resolver }
    }

    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> ConnectionState {
        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        if cookie.is_empty() {
            return ConnectionState::default();
        }
        self.authenticate(Some(&cookie)).await
    }

    /// Resolve the connection state from a raw `Cookie` header.
    pub async fn authenticate(&self, cookie_header: Option<&str>) -> ConnectionState {
        ConnectionState {
            user: self.resolve_user(cookie_header).await,
        }
    }

    async fn resolve_user(&self, cookie_header: Option<&str>) -> Option<user::Model> {
        let session_id = self.gateway.session_id_from_cookie_header(cookie_header?)?;

        let record = match self.gateway.load_record(&session_id).await {
            Ok(record) => record?,
            Err(e) => {
                warn!(error = %e, "failed to load session for socket handshake");
                return None;
            }
        };

        let passport = Passport::from_record(&record)?;
        let user = self.resolver.resolve(passport.user).await;
        if let Some(user) = &user {
            debug!(user = %user.uuid, "socket authenticated");
        }
        user
    }
}
