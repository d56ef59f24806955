//! WebSocket endpoint and event protocol.
//!
//! Messages are JSON objects tagged by `event`. A failed guard or a malformed
//! message produces an `error` event; the connection stays open.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::roles::{require_authenticated, require_capability, Capability};
use crate::error::{Error, Result};
use crate::http::AppState;
use crate::services::users::PublicUser;
use crate::socket::handshake::ConnectionState;
use crate::socket::presence::PresenceRegistry;

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Who is this connection authenticated as.
    Whoami,
    /// Whether an account has an open connection. Requires a signed-in account.
    IsOnline { user: Uuid },
    /// Every account with an open connection. Requires an admin or the owner.
    OnlineUsers,
}

/// Events sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    Identity {
        user: Option<PublicUser>,
    },
    Presence {
        user: Uuid,
        online: bool,
        connections: usize,
    },
    OnlineUsers {
        users: Vec<Uuid>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl From<Error> for ServerEvent {
    fn from(e: Error) -> Self {
        Self::Error {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let connection = state.handshake.authenticate_headers(&headers).await;
    let presence = state.presence.clone();
    ws.on_upgrade(move |socket| serve_connection(socket, presence, connection))
}

async fn serve_connection(
    mut socket: WebSocket,
    presence: PresenceRegistry,
    connection: ConnectionState,
) {
    let user = connection.user.as_ref().map(|user| user.uuid);
    if let Some(user) = user {
        presence.connect(user).await;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let reply = match msg {
            Message::Text(text) => handle_message(&presence, &connection, text.as_str()).await,
            Message::Close(_) => break,
            _ => continue,
        };
        let payload = match serde_json::to_string(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to encode socket event");
                continue;
            }
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }

    if let Some(user) = user {
        presence.disconnect(user).await;
    }
    debug!("socket closed");
}

/// Answer one text message from a connection.
pub async fn handle_message(
    presence: &PresenceRegistry,
    connection: &ConnectionState,
    text: &str,
) -> ServerEvent {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => return Error::BadRequest(format!("malformed event: {e}")).into(),
    };
    match handle_event(presence, connection, event).await {
        Ok(reply) => reply,
        Err(e) => e.into(),
    }
}

async fn handle_event(
    presence: &PresenceRegistry,
    connection: &ConnectionState,
    event: ClientEvent,
) -> Result<ServerEvent> {
    let user = connection.user.as_ref();
    match event {
        ClientEvent::Whoami => Ok(ServerEvent::Identity {
            user: user.map(PublicUser::from),
        }),
        ClientEvent::IsOnline { user: target } => {
            require_authenticated(user)?;
            let connections = presence.connection_count(target).await;
            Ok(ServerEvent::Presence {
                user: target,
                online: connections > 0,
                connections,
            })
        }
        ClientEvent::OnlineUsers => {
            require_capability(user, Capability::ManageContent)?;
            Ok(ServerEvent::OnlineUsers {
                users: presence.online_users().await,
            })
        }
    }
}
