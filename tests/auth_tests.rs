//! Integration tests for credentials, session identity and the session store.

mod common;

use common::{seed_user, setup_db, test_state};
use portfolio_api::auth::resolver::{REGENERATION_COUNTER_KEY, REMEMBER_ME_KEY};
use portfolio_api::auth::{NewUser, Passport, SignInRequest, SignUpRequest};
use portfolio_api::entity::session;
use portfolio_api::entity::user::{self, UserRole};
use portfolio_api::repository::{DeleteOptions, Filter, FindOptions, Repository};
use portfolio_api::{DbSessionStore, Error, ExpiredDeletion, Id, Record, SessionStore};
use sea_orm::EntityTrait;
use serde_json::json;
use time::{Duration, OffsetDateTime};

#[tokio::test]
async fn test_validate_credentials() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let credentials = state.auth.credentials();

    let found = credentials
        .validate_credentials("alice", "s3cret")
        .await
        .unwrap()
        .expect("valid credentials");
    assert_eq!(found.uuid, alice.uuid);

    let by_email = credentials
        .validate_credentials("alice@example.com", "s3cret")
        .await
        .unwrap();
    assert_eq!(by_email.map(|u| u.uuid), Some(alice.uuid));

    assert!(credentials
        .validate_credentials("alice", "wrong")
        .await
        .unwrap()
        .is_none());
    assert!(credentials
        .validate_credentials("bob", "s3cret")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_stored_password_is_hashed() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    assert_ne!(alice.password, "s3cret");
    assert!(alice.password.starts_with("$argon2id$"));
    assert_eq!(alice.role, UserRole::User);
}

#[tokio::test]
async fn test_soft_deleted_user_cannot_sign_in() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    Repository::<user::Entity>::new(state.db.clone())
        .delete(Filter::eq("uuid", alice.uuid), DeleteOptions::default())
        .await
        .unwrap();

    assert!(state
        .auth
        .credentials()
        .validate_credentials("alice", "s3cret")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_register_rejects_banned_username() {
    let state = test_state().await;
    let err = state
        .auth
        .credentials()
        .register(NewUser {
            username: "Admin".into(),
            email: "admin@example.com".into(),
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn test_register_conflicts() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let credentials = state.auth.credentials();

    let err = credentials
        .register(NewUser {
            username: "alice".into(),
            email: "other@example.com".into(),
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ref m) if m.contains("Username")));

    let err = credentials
        .register(NewUser {
            username: "alicia".into(),
            email: "alice@example.com".into(),
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ref m) if m.contains("Email")));

    // A soft-deleted account still holds its username
    Repository::<user::Entity>::new(state.db.clone())
        .delete(Filter::eq("uuid", alice.uuid), DeleteOptions::default())
        .await
        .unwrap();
    let err = credentials
        .register(NewUser {
            username: "alice".into(),
            email: "new@example.com".into(),
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_resolver_round_trip() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let resolver = state.auth.resolver();

    let key = resolver.serialize(&alice);
    assert_eq!(key, alice.uuid);
    let resolved = resolver.deserialize(key).await.unwrap().unwrap();
    assert_eq!(resolved.uuid, alice.uuid);
    assert_eq!(resolved.username, "alice");

    assert!(resolver
        .deserialize(uuid::Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sign_in_binds_identity_under_new_id() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;

    // An anonymous session that already has a stored id
    let session = state.gateway.session(None);
    session.insert("theme", "dark").await.unwrap();
    session.save().await.unwrap();
    let anonymous_id = session.id().unwrap();

    let user = state
        .auth
        .sign_in_with_credentials(
            &session,
            SignInRequest {
                login: "alice".into(),
                password: "s3cret".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(user.uuid, alice.uuid);

    let id = session.id().unwrap();
    assert_ne!(id, anonymous_id);
    assert!(state.gateway.load_record(&anonymous_id).await.unwrap().is_none());

    let row = session::Entity::find_by_id(format!("sess:{id}"))
        .one(&state.db)
        .await
        .unwrap();
    assert!(row.is_some());

    let record = state.gateway.load_record(&id).await.unwrap().unwrap();
    assert_eq!(Passport::from_record(&record), Some(Passport { user: alice.uuid }));
    assert_eq!(record.data.get(REMEMBER_ME_KEY), Some(&json!(false)));

    let current = state.auth.current_identity(&session).await.unwrap().unwrap();
    assert_eq!(current.uuid, alice.uuid);
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let state = test_state().await;
    seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let session = state.gateway.session(None);

    let err = state
        .auth
        .sign_in_with_credentials(
            &session,
            SignInRequest {
                login: "alice".into(),
                password: "nope".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(ref m) if m == "Invalid credentials"));
    assert!(session.id().is_none());
}

#[tokio::test]
async fn test_remember_me_expiry_outlasts_standard() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let now = OffsetDateTime::now_utc();

    let standard = state.gateway.session(None);
    state.auth.sign_in(&standard, &alice, false).await.unwrap();
    let remembered = state.gateway.session(None);
    state.auth.sign_in(&remembered, &alice, true).await.unwrap();

    let standard_ttl = standard.expiry_date() - now;
    let remembered_ttl = remembered.expiry_date() - now;
    assert!(standard_ttl > Duration::ZERO);
    assert!(remembered_ttl >= standard_ttl * 10);
    assert!(remembered_ttl >= state.auth.policy().remember_me);
}

#[tokio::test]
async fn test_refresh_rolling_only_for_remember_me() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;

    let standard = state.gateway.session(None);
    state.auth.sign_in(&standard, &alice, false).await.unwrap();
    assert!(!state.auth.refresh_rolling(&standard).await.unwrap());

    let remembered = state.gateway.session(None);
    state.auth.sign_in(&remembered, &alice, true).await.unwrap();
    assert!(state.auth.refresh_rolling(&remembered).await.unwrap());
    assert!(state.auth.refresh_rolling(&remembered).await.unwrap());
    let counter: Option<u64> = remembered.get(REGENERATION_COUNTER_KEY).await.unwrap();
    assert_eq!(counter, Some(2));
}

#[tokio::test]
async fn test_sign_up_then_sign_out() {
    let state = test_state().await;
    let session = state.gateway.session(None);

    let user = state
        .auth
        .sign_up(
            &session,
            SignUpRequest {
                username: "carol".into(),
                email: "carol@example.com".into(),
                password: "s3cret".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(user.username, "carol");
    let id = session.id().unwrap();
    assert!(state.gateway.load_record(&id).await.unwrap().is_some());

    state.auth.sign_out(&session).await.unwrap();
    assert!(state.gateway.load_record(&id).await.unwrap().is_none());
    assert!(state.auth.current_identity(&session).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleted_account_resolves_anonymous() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    let session = state.gateway.session(None);
    state.auth.sign_in(&session, &alice, false).await.unwrap();

    Repository::<user::Entity>::new(state.db.clone())
        .delete(Filter::eq("uuid", alice.uuid), DeleteOptions::default())
        .await
        .unwrap();
    assert!(state.auth.current_identity(&session).await.unwrap().is_none());

    // The account row is still there
    let row = Repository::<user::Entity>::new(state.db.clone())
        .find_one(Filter::eq("uuid", alice.uuid), FindOptions::including_deleted())
        .await
        .unwrap();
    assert!(row.is_some());
}

fn record(expiry_date: OffsetDateTime) -> Record {
    Record {
        id: Id::default(),
        data: [("passport".to_string(), json!({ "user": uuid::Uuid::new_v4() }))]
            .into_iter()
            .collect(),
        expiry_date,
    }
}

#[tokio::test]
async fn test_store_create_load_delete() {
    let store = DbSessionStore::new(setup_db().await);
    let mut record = record(OffsetDateTime::now_utc() + Duration::hours(1));

    store.create(&mut record).await.unwrap();
    let loaded = store.load(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded.data, record.data);

    record.data.insert("rememberMe".into(), json!(true));
    store.save(&record).await.unwrap();
    let loaded = store.load(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.data.get("rememberMe"), Some(&json!(true)));

    store.delete(&record.id).await.unwrap();
    assert!(store.load(&record.id).await.unwrap().is_none());
    // Deleting again is fine
    store.delete(&record.id).await.unwrap();
}

#[tokio::test]
async fn test_store_save_inserts_missing_record() {
    let store = DbSessionStore::new(setup_db().await);
    let record = record(OffsetDateTime::now_utc() + Duration::hours(1));
    store.save(&record).await.unwrap();
    assert!(store.load(&record.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_store_hides_and_deletes_expired() {
    let db = setup_db().await;
    let store = DbSessionStore::new(db.clone());
    let other = DbSessionStore::new(db.clone()).with_key_prefix("other");

    let expired = record(OffsetDateTime::now_utc() - Duration::minutes(1));
    let live = record(OffsetDateTime::now_utc() + Duration::hours(1));
    let foreign = record(OffsetDateTime::now_utc() - Duration::minutes(1));
    store.save(&expired).await.unwrap();
    store.save(&live).await.unwrap();
    other.save(&foreign).await.unwrap();

    assert!(store.load(&expired.id).await.unwrap().is_none());

    store.delete_expired().await.unwrap();

    let rows = session::Entity::find().all(&db).await.unwrap();
    let keys: Vec<String> = rows.into_iter().map(|row| row.id).collect();
    assert!(!keys.contains(&store.key(&expired.id)));
    assert!(keys.contains(&store.key(&live.id)));
    // Rows of another prefix are left alone
    assert!(keys.contains(&other.key(&foreign.id)));
}

#[tokio::test]
async fn test_store_rows_hold_messagepack_records() {
    let db = setup_db().await;
    let store = DbSessionStore::new(db.clone());
    let record = record(OffsetDateTime::now_utc() + Duration::hours(1));
    store.save(&record).await.unwrap();

    let row = session::Entity::find_by_id(store.key(&record.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&row.data).is_err());
    let decoded: Record = rmp_serde::from_slice(&row.data).unwrap();
    assert_eq!(decoded.id, record.id);
    assert_eq!(decoded.data, record.data);
}
