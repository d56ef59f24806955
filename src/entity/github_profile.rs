//! GitHub account attached to a profile.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::repository::RowSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "github_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    #[sea_orm(unique)]
    pub profile_uuid: Uuid,
    pub username: Option<String>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.uuid.is_not_set() {
            self.uuid = Set(Uuid::new_v4());
        }
        self.updated_at = Set(super::now());
        Ok(self)
    }
}

impl RowSchema for Entity {
    fn uuid_column() -> Column {
        Column::Uuid
    }

    fn updated_at_column() -> Option<Column> {
        Some(Column::UpdatedAt)
    }
}
