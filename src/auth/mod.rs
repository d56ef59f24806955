//! Authentication and session management.
//!
//! - [`password`]: Argon2id hashing of stored passwords.
//! - [`credentials`]: login lookup and account registration.
//! - [`resolver`]: the `passport` binding between a session and an account.
//! - [`authenticator`]: sign-in, sign-up, sign-out and rolling expiry.
//! - [`cookie`] and [`gateway`]: the signed session cookie and store lookup
//!   shared by the HTTP middleware and the WebSocket handshake.
//! - [`middleware`]: the axum session middleware.
//! - [`roles`]: capabilities, guards and extractors.

pub mod authenticator;
pub mod cookie;
pub mod credentials;
pub mod gateway;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod roles;

pub use authenticator::{ExpiryPolicy, SessionAuthenticator, SignInRequest, SignUpRequest};
pub use cookie::CookieSigner;
pub use credentials::{CredentialVerifier, NewUser};
pub use gateway::SessionGateway;
pub use password::PasswordHasher;
pub use resolver::{IdentityResolver, Passport};
pub use roles::{
    has_capability, require_authenticated, require_capability, Authenticated, Capability,
    ContentManager, CurrentUser, PortfolioOwner,
};
