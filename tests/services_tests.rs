//! Integration tests for the domain services.

mod common;

use chrono::NaiveDate;
use common::{seed_user, test_state};
use portfolio_api::entity::user::UserRole;
use portfolio_api::repository::PageQuery;
use portfolio_api::services::profiles::{NewProfile, UpdateLinkedInProfile, UpdateProfile};
use portfolio_api::services::skills::NewSkill;
use portfolio_api::services::users::UpdateUser;
use portfolio_api::services::{NewContactMessage, ProfilesService};
use portfolio_api::Error;
use uuid::Uuid;

#[tokio::test]
async fn test_get_user_by_uuid() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;

    let found = state.users.get_user_by_uuid(alice.uuid).await.unwrap();
    assert_eq!(found.username, "alice");

    let err = state.users.get_user_by_uuid(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m == "User not found"));
}

#[tokio::test]
async fn test_update_user() {
    let state = test_state().await;
    let alice = seed_user(&state, "alice", "s3cret", UserRole::User).await;
    seed_user(&state, "bob", "s3cret", UserRole::User).await;

    let err = state
        .users
        .update_user(
            alice.uuid,
            UpdateUser {
                username: Some("bob".into()),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Keeping one's own username is not a conflict
    let updated = state
        .users
        .update_user(
            alice.uuid,
            UpdateUser {
                username: Some("alice".into()),
                email: Some("alice@portfolio.dev".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.email, "alice@portfolio.dev");
    assert!(updated.updated_at >= alice.updated_at);
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let state = test_state().await;
    let created = state
        .profiles
        .create_profile(NewProfile {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 15),
            location: Some("Lyon".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let uuid = created.profile.uuid;
    assert!(created.linkedin.is_some());
    assert!(created.github.is_some());

    let updated = state
        .profiles
        .update_profile(
            uuid,
            UpdateProfile {
                title: Some("Engineer".into()),
                location: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("Engineer"));
    assert_eq!(updated.location, None);
    assert_eq!(updated.first_name, "Jane");

    let err = state
        .profiles
        .update_profile(
            uuid,
            UpdateProfile {
                birth_date: Some("15/05/1990".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    state
        .profiles
        .update_linkedin_profile(
            uuid,
            UpdateLinkedInProfile {
                slug: Some("jane-doe".into()),
            },
        )
        .await
        .unwrap();

    let page = state.profiles.get_profiles(PageQuery::default()).await.unwrap();
    assert_eq!(page.pagination.total_items, 1);
    let formatted = ProfilesService::format_profile(&page.data[0]);
    assert_eq!(formatted.full_name, "Jane Doe");
    assert_eq!(
        formatted.linked_in.profile_url.as_deref(),
        Some("https://www.linkedin.com/in/jane-doe")
    );
    assert_eq!(formatted.git_hub.profile_url, None);
    assert!(formatted.age.is_some());
}

#[tokio::test]
async fn test_profile_not_found() {
    let state = test_state().await;
    let err = state
        .profiles
        .update_linkedin_profile(Uuid::new_v4(), UpdateLinkedInProfile::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m == "Profile not found"));
}

#[tokio::test]
async fn test_profiles_are_paginated() {
    let state = test_state().await;
    for name in ["Ann", "Ben", "Cid"] {
        state
            .profiles
            .create_profile(NewProfile {
                first_name: name.into(),
                last_name: "Doe".into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let page = state.profiles.get_profiles(PageQuery::new(2, 2)).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].profile.first_name, "Cid");
    assert!(page.data[0].github.is_some());
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn test_skills() {
    let state = test_state().await;
    let skill = state
        .skills
        .create_skill(NewSkill {
            label: "C++".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(skill.slug, "c-plus-plus");

    let err = state
        .skills
        .create_skill(NewSkill {
            label: "!!!".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    state.skills.delete_skill("c-plus-plus").await.unwrap();
    let page = state.skills.get_skills(PageQuery::default()).await.unwrap();
    assert!(page.data.is_empty());

    // The slug of a deleted skill stays taken
    let err = state
        .skills
        .create_skill(NewSkill {
            label: "C++".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = state.skills.delete_skill("c-plus-plus").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref m) if m == "Skill not found"));
}

fn contact_message(profile_uuid: Uuid) -> NewContactMessage {
    NewContactMessage {
        profile_uuid,
        first_name: "John".into(),
        last_name: "Smith".into(),
        organization_name: Some(String::new()),
        email: "john@example.com".into(),
        phone_number: None,
        message: "Hello".into(),
        lang: "fr".into(),
    }
}

#[tokio::test]
async fn test_contact_messages() {
    let state = test_state().await;
    let profile = state
        .profiles
        .create_profile(NewProfile {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .profile;

    let message = state
        .contact_messages
        .create_contact_message(contact_message(profile.uuid))
        .await
        .unwrap();
    assert_eq!(message.profile_uuid, profile.uuid);
    assert_eq!(message.organization_name, None);
    assert_eq!(message.lang, "fr");

    let mut empty = contact_message(profile.uuid);
    empty.message = "  ".into();
    let err = state
        .contact_messages
        .create_contact_message(empty)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let err = state
        .contact_messages
        .create_contact_message(contact_message(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
