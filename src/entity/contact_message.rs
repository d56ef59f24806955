//! Messages sent through the portfolio contact form.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::repository::RowSchema;

/// A contact message addressed to a profile. Messages are append-only: the
/// table has neither an update nor a soft-delete timestamp.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contact_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub profile_uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub organization_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub lang: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.uuid.is_not_set() {
                self.uuid = Set(Uuid::new_v4());
            }
            self.created_at = Set(super::now());
        }
        Ok(self)
    }
}

impl RowSchema for Entity {
    fn uuid_column() -> Column {
        Column::Uuid
    }
}
