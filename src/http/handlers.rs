//! HTTP handlers. Each one delegates to a service and maps the result.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::{Authenticated, ContentManager, PortfolioOwner, SignInRequest, SignUpRequest};
use crate::database;
use crate::error::Result;
use crate::http::state::AppState;
use crate::repository::{PageQuery, Paginated};
use crate::services::profiles::{UpdateGitHubProfile, UpdateLinkedInProfile, UpdateProfile};
use crate::services::skills::NewSkill;
use crate::services::{
    FormattedProfile, FormattedSkill, NewContactMessage, PrivateUser, ProfilesService,
    SkillsService,
};

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    database::ping(&state.db).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignInRequest>,
) -> Result<Json<PrivateUser>> {
    let user = state.auth.sign_in_with_credentials(&session, request).await?;
    Ok(Json(user))
}

pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<PrivateUser>)> {
    let user = state.auth.sign_up(&session, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    _user: Authenticated,
    session: Session,
) -> Result<StatusCode> {
    state.auth.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Authenticated(user): Authenticated) -> Json<PrivateUser> {
    Json(PrivateUser::from(&user))
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FormattedProfile>>> {
    let page = state.profiles.get_profiles(query).await?;
    Ok(Json(page.map(|profile| ProfilesService::format_profile(&profile))))
}

pub async fn update_profile(
    State(state): State<AppState>,
    _owner: PortfolioOwner,
    Path(uuid): Path<Uuid>,
    Json(data): Json<UpdateProfile>,
) -> Result<StatusCode> {
    state.profiles.update_profile(uuid, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_linkedin_profile(
    State(state): State<AppState>,
    _owner: PortfolioOwner,
    Path(uuid): Path<Uuid>,
    Json(data): Json<UpdateLinkedInProfile>,
) -> Result<StatusCode> {
    state.profiles.update_linkedin_profile(uuid, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_github_profile(
    State(state): State<AppState>,
    _owner: PortfolioOwner,
    Path(uuid): Path<Uuid>,
    Json(data): Json<UpdateGitHubProfile>,
) -> Result<StatusCode> {
    state.profiles.update_github_profile(uuid, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_skills(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FormattedSkill>>> {
    let page = state.skills.get_skills(query).await?;
    Ok(Json(page.map(|skill| SkillsService::format_skill(&skill))))
}

pub async fn create_skill(
    State(state): State<AppState>,
    _manager: ContentManager,
    Json(data): Json<NewSkill>,
) -> Result<(StatusCode, Json<FormattedSkill>)> {
    let skill = state.skills.create_skill(data).await?;
    Ok((StatusCode::CREATED, Json(SkillsService::format_skill(&skill))))
}

pub async fn delete_skill(
    State(state): State<AppState>,
    _manager: ContentManager,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    state.skills.delete_skill(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_contact_message(
    State(state): State<AppState>,
    Json(data): Json<NewContactMessage>,
) -> Result<(StatusCode, Json<Value>)> {
    let message = state.contact_messages.create_contact_message(data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "uuid": message.uuid }))))
}
