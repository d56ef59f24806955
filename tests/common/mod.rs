//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use portfolio_api::auth::NewUser;
use portfolio_api::config::Config;
use portfolio_api::entity::user::{self, UserRole};
use portfolio_api::http::AppState;
use portfolio_api::migration::{Migrator, MigratorTrait};
use portfolio_api::repository::{Filter, Repository};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

pub const COOKIE_NAME: &str = "portfolio.sid";
pub const SECRET_KEY: &str = "integration-test-secret";

/// A migrated in-memory SQLite database.
///
/// The pool holds a single connection so every query sees the same database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Configuration with a cheap password hash.
pub fn test_config() -> Config {
    let values = HashMap::from([
        ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ("SECRET_KEY".to_string(), SECRET_KEY.to_string()),
        ("PASSWORD_HASH_MEMORY_KIB".to_string(), "8".to_string()),
        ("PASSWORD_HASH_ITERATIONS".to_string(), "1".to_string()),
    ]);
    Config::from_map(&values).unwrap()
}

pub async fn test_state() -> AppState {
    AppState::new(&test_config(), setup_db().await).unwrap()
}

/// Register an account and give it `role`.
pub async fn seed_user(
    state: &AppState,
    username: &str,
    password: &str,
    role: UserRole,
) -> user::Model {
    let user = state
        .auth
        .credentials()
        .register(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
        })
        .await
        .unwrap();
    if role == UserRole::User {
        return user;
    }

    let users: Repository<user::Entity> = Repository::new(state.db.clone());
    users
        .update(
            Filter::eq("uuid", user.uuid),
            user::ActiveModel {
                role: Set(role),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .remove(0)
}

/// Response status, `Set-Cookie` headers and JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` of the session cookie set by the response, for a `Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookies
            .iter()
            .filter(|c| c.starts_with(&format!("{COOKIE_NAME}=")))
            .map(|c| c.split(';').next().unwrap_or_default().to_string())
            .next_back()
    }
}

/// Helper to make JSON requests.
pub async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let set_cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        set_cookies,
        body,
    }
}
