//! Messages left through the contact form.

use sea_orm::{ColumnTrait, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entity::{contact_message, profile};
use crate::error::{Error, Result};
use crate::repository::{FindOptions, Repository};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub profile_uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub organization_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub message: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Clone)]
pub struct ContactMessagesService {
    messages: Repository<contact_message::Entity>,
    profiles: Repository<profile::Entity>,
}

impl ContactMessagesService {
    pub fn new(
        messages: Repository<contact_message::Entity>,
        profiles: Repository<profile::Entity>,
    ) -> Self {
        Self { messages, profiles }
    }

    /// Store a message addressed to an existing profile.
    pub async fn create_contact_message(
        &self,
        data: NewContactMessage,
    ) -> Result<contact_message::Model> {
        for (field, value) in [
            ("firstName", &data.first_name),
            ("lastName", &data.last_name),
            ("email", &data.email),
            ("message", &data.message),
        ] {
            if value.trim().is_empty() {
                return Err(Error::BadRequest(format!("{field} must not be empty")));
            }
        }

        let profile = self
            .profiles
            .find_one(profile::Column::Uuid.eq(data.profile_uuid), FindOptions::default())
            .await?;
        if profile.is_none() {
            return Err(Error::NotFound("Profile not found".into()));
        }

        let message = self
            .messages
            .create(contact_message::ActiveModel {
                profile_uuid: Set(data.profile_uuid),
                first_name: Set(data.first_name),
                last_name: Set(data.last_name),
                organization_name: Set(data.organization_name.filter(|v| !v.is_empty())),
                email: Set(data.email),
                phone_number: Set(data.phone_number.filter(|v| !v.is_empty())),
                message: Set(data.message),
                lang: Set(data.lang),
                ..Default::default()
            })
            .await?;

        info!(message = %message.uuid, profile = %message.profile_uuid, "contact message received");
        Ok(message)
    }
}
