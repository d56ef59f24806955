//! Real-time side channel over WebSocket.

pub mod handler;
pub mod handshake;
pub mod presence;

pub use handler::{handle_message, ws_handler, ClientEvent, ServerEvent};
pub use handshake::{ConnectionState, HandshakeAuthenticator};
pub use presence::PresenceRegistry;
