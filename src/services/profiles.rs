//! Portfolio profiles and their linked LinkedIn and GitHub accounts.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::entity::{github_profile, linkedin_profile, profile};
use crate::error::{Error, Result};
use crate::repository::{Filter, FindOptions, PageInfo, PageQuery, Paginated, Repository};

/// A profile with its linked accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileWithLinks {
    pub profile: profile::Model,
    pub linkedin: Option<linkedin_profile::Model>,
    pub github: Option<github_profile::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub profile_url: Option<String>,
}

/// Profile as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedProfile {
    pub uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub title: Option<String>,
    pub biography: Option<String>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
    pub linked_in: LinkedAccount,
    pub git_hub: LinkedAccount,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
}

/// Profile changes. Absent fields are left alone; an empty string clears an
/// optional field. `birthDate` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub biography: Option<String>,
    pub birth_date: Option<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLinkedInProfile {
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGitHubProfile {
    pub username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfilesService {
    profiles: Repository<profile::Entity>,
    linkedin_profiles: Repository<linkedin_profile::Entity>,
    github_profiles: Repository<github_profile::Entity>,
}

impl ProfilesService {
    pub fn new(
        profiles: Repository<profile::Entity>,
        linkedin_profiles: Repository<linkedin_profile::Entity>,
        github_profiles: Repository<github_profile::Entity>,
    ) -> Self {
        Self {
            profiles,
            linkedin_profiles,
            github_profiles,
        }
    }

    /// Create a profile together with its (empty) LinkedIn and GitHub rows.
    pub async fn create_profile(&self, data: NewProfile) -> Result<ProfileWithLinks> {
        let profile = self
            .profiles
            .create(profile::ActiveModel {
                first_name: Set(data.first_name),
                last_name: Set(data.last_name),
                title: Set(data.title),
                biography: Set(data.biography),
                birth_date: Set(data.birth_date),
                location: Set(data.location),
                contact_email: Set(data.contact_email),
                contact_phone_number: Set(data.contact_phone_number),
                ..Default::default()
            })
            .await?;
        let linkedin = self
            .linkedin_profiles
            .create(linkedin_profile::ActiveModel {
                profile_uuid: Set(profile.uuid),
                slug: Set(None),
                ..Default::default()
            })
            .await?;
        let github = self
            .github_profiles
            .create(github_profile::ActiveModel {
                profile_uuid: Set(profile.uuid),
                username: Set(None),
                ..Default::default()
            })
            .await?;

        info!(profile = %profile.uuid, "profile created");
        Ok(ProfileWithLinks {
            profile,
            linkedin: Some(linkedin),
            github: Some(github),
        })
    }

    pub async fn get_profiles(&self, query: PageQuery) -> Result<Paginated<ProfileWithLinks>> {
        let window = self.profiles.get_pagination_params(query);
        let profiles = self
            .profiles
            .find_many(Filter::All, FindOptions::paginated(window))
            .await?;
        let total = self
            .profiles
            .count(Filter::All, FindOptions::default())
            .await?;

        let uuids: Vec<Uuid> = profiles.iter().map(|p| p.uuid).collect();
        let mut linkedin: HashMap<Uuid, linkedin_profile::Model> = self
            .linkedin_profiles
            .find_many(
                linkedin_profile::Column::ProfileUuid.is_in(uuids.clone()),
                FindOptions::default(),
            )
            .await?
            .into_iter()
            .map(|row| (row.profile_uuid, row))
            .collect();
        let mut github: HashMap<Uuid, github_profile::Model> = self
            .github_profiles
            .find_many(
                github_profile::Column::ProfileUuid.is_in(uuids),
                FindOptions::default(),
            )
            .await?
            .into_iter()
            .map(|row| (row.profile_uuid, row))
            .collect();

        let data = profiles
            .into_iter()
            .map(|profile| ProfileWithLinks {
                linkedin: linkedin.remove(&profile.uuid),
                github: github.remove(&profile.uuid),
                profile,
            })
            .collect();

        Ok(Paginated {
            data,
            pagination: PageInfo::new(query, window, total),
        })
    }

    pub async fn get_profile(&self, uuid: Uuid) -> Result<profile::Model> {
        self.profiles
            .find_one(profile::Column::Uuid.eq(uuid), FindOptions::default())
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".into()))
    }

    pub async fn update_profile(&self, uuid: Uuid, data: UpdateProfile) -> Result<profile::Model> {
        let profile = self.get_profile(uuid).await?;

        let mut changes = profile::ActiveModel::default();
        if let Some(first_name) = data.first_name.filter(|v| !v.is_empty()) {
            changes.first_name = Set(first_name);
        }
        if let Some(last_name) = data.last_name.filter(|v| !v.is_empty()) {
            changes.last_name = Set(last_name);
        }
        if let Some(title) = data.title {
            changes.title = Set(non_empty(title));
        }
        if let Some(biography) = data.biography {
            changes.biography = Set(non_empty(biography));
        }
        if let Some(birth_date) = data.birth_date {
            changes.birth_date = Set(parse_birth_date(&birth_date)?);
        }
        if let Some(location) = data.location {
            changes.location = Set(non_empty(location));
        }
        if let Some(contact_email) = data.contact_email {
            changes.contact_email = Set(non_empty(contact_email));
        }
        if let Some(contact_phone_number) = data.contact_phone_number {
            changes.contact_phone_number = Set(non_empty(contact_phone_number));
        }

        self.profiles
            .update(profile::Column::Uuid.eq(profile.uuid), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("Profile not found".into()))
    }

    pub async fn update_linkedin_profile(
        &self,
        profile_uuid: Uuid,
        data: UpdateLinkedInProfile,
    ) -> Result<linkedin_profile::Model> {
        self.get_profile(profile_uuid).await?;
        let linkedin = self
            .linkedin_profiles
            .find_one(
                linkedin_profile::Column::ProfileUuid.eq(profile_uuid),
                FindOptions::default(),
            )
            .await?
            .ok_or_else(|| Error::NotFound("LinkedIn profile not found".into()))?;

        let mut changes = linkedin_profile::ActiveModel::default();
        if let Some(slug) = data.slug {
            changes.slug = Set(non_empty(slug));
        }

        self.linkedin_profiles
            .update(linkedin_profile::Column::Uuid.eq(linkedin.uuid), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("LinkedIn profile not found".into()))
    }

    pub async fn update_github_profile(
        &self,
        profile_uuid: Uuid,
        data: UpdateGitHubProfile,
    ) -> Result<github_profile::Model> {
        self.get_profile(profile_uuid).await?;
        let github = self
            .github_profiles
            .find_one(
                github_profile::Column::ProfileUuid.eq(profile_uuid),
                FindOptions::default(),
            )
            .await?
            .ok_or_else(|| Error::NotFound("GitHub profile not found".into()))?;

        let mut changes = github_profile::ActiveModel::default();
        if let Some(username) = data.username {
            changes.username = Set(non_empty(username));
        }

        self.github_profiles
            .update(github_profile::Column::Uuid.eq(github.uuid), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("GitHub profile not found".into()))
    }

    pub fn format_profile(profile: &ProfileWithLinks) -> FormattedProfile {
        let today = Utc::now().date_naive();
        let p = &profile.profile;
        FormattedProfile {
            uuid: p.uuid,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            full_name: format!("{} {}", p.first_name, p.last_name),
            title: p.title.clone(),
            biography: p.biography.clone(),
            age: p.birth_date.map(|birth_date| calculate_age(birth_date, today)),
            location: p.location.clone(),
            contact_email: p.contact_email.clone(),
            contact_phone_number: p.contact_phone_number.clone(),
            linked_in: LinkedAccount {
                profile_url: profile
                    .linkedin
                    .as_ref()
                    .and_then(|l| l.slug.as_deref())
                    .map(|slug| format!("https://www.linkedin.com/in/{slug}")),
            },
            git_hub: LinkedAccount {
                profile_url: profile
                    .github
                    .as_ref()
                    .and_then(|g| g.username.as_deref())
                    .map(|username| format!("https://github.com/{username}")),
            },
            updated_at: p.updated_at,
        }
    }
}

/// Whole years between `birth_date` and `today`.
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_birth_date(value: &str) -> Result<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::BadRequest(format!("invalid birth date `{value}`")))
}
