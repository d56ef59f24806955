//! HTTP session middleware.
//!
//! Resolves the signed session cookie into a [`Session`] and the account bound
//! to it before the handler runs, then persists the session and writes the
//! cookie back once the handler has returned.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_sessions::{Expiry, Session};
use tracing::warn;

use crate::auth::gateway::SessionGateway;
use crate::auth::roles::CurrentUser;
use crate::error::Result;
use crate::http::AppState;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let gateway = &state.gateway;
    let session_id = gateway.session_id_from_headers(req.headers());
    let had_cookie = session_id.is_some();
    let session = gateway.session(session_id);

    if let Err(e) = state.auth.refresh_rolling(&session).await {
        return e.into_response();
    }

    // A session that cannot be resolved is treated as anonymous.
    let user = match state.auth.current_identity(&session).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "failed to resolve session identity");
            None
        }
    };

    req.extensions_mut().insert(session.clone());
    req.extensions_mut().insert(CurrentUser(user));

    let mut response = next.run(req).await;

    if let Err(e) = persist(gateway, &session, had_cookie, &mut response).await {
        return e.into_response();
    }
    response
}

async fn persist(
    gateway: &SessionGateway,
    session: &Session,
    had_cookie: bool,
    response: &mut Response,
) -> Result<()> {
    if !session.is_modified() {
        return Ok(());
    }

    if session.is_empty().await {
        // Signed out or flushed
        if had_cookie {
            set_cookie(response, &gateway.removal_cookie().to_string());
        }
        return Ok(());
    }

    session.save().await?;

    if let Some(id) = session.id() {
        let max_age = match session.expiry() {
            Some(Expiry::OnSessionEnd) | None => None,
            Some(_) => Some(session.expiry_age()),
        };
        set_cookie(response, &gateway.session_cookie(&id, max_age).to_string());
    }
    Ok(())
}

fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "session cookie is not a valid header value"),
    }
}
