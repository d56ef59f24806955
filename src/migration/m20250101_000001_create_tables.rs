use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    contact_message, github_profile, linkedin_profile, profile, session, skill, user,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(create_table(&schema, session::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, user::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, profile::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, linkedin_profile::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, github_profile::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, skill::Entity))
            .await?;
        manager
            .create_table(create_table(&schema, contact_message::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_expiry_date")
                    .table(session::Entity)
                    .col(session::Column::ExpiryDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contact_messages_profile_uuid")
                    .table(contact_message::Entity)
                    .col(contact_message::Column::ProfileUuid)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(contact_message::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(skill::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(github_profile::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(linkedin_profile::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(profile::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(session::Entity).to_owned())
            .await
    }
}

fn create_table<E>(schema: &Schema, entity: E) -> TableCreateStatement
where
    E: EntityTrait,
{
    schema
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned()
}
