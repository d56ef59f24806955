//! Generic entity store.
//!
//! [`Repository`] translates CRUD operations with a [`Filter`] into Sea-ORM
//! queries and applies the soft-delete visibility rule uniformly: when an
//! entity has a `deleted_at` column, rows carrying a deletion timestamp are
//! invisible to reads unless [`FindOptions::include_deleted`] is set.
//!
//! The store is a stateless accessor. It keeps no entity past the call that
//! returns it, takes no locks, and does not retry: database failures surface
//! as [`Error::Database`](crate::error::Error::Database).

mod filter;
mod pagination;

pub use filter::Filter;
pub use pagination::{PageInfo, PageQuery, PageWindow, Paginated, MAX_PAGE_SIZE};

use std::marker::PhantomData;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    EntityName, EntityTrait, IdenStatic, IntoActiveModel, Iterable, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entity::now;
use crate::error::{Error, Result};

/// Static description of an entity's table beyond what Sea-ORM derives:
/// which column holds the stable external identifier, and which optional
/// columns carry the update and soft-delete timestamps.
pub trait RowSchema: EntityTrait {
    /// Column holding the immutable `uuid` identifier.
    fn uuid_column() -> Self::Column;

    /// Column stamped with the current time on every update, if any.
    fn updated_at_column() -> Option<Self::Column> {
        None
    }

    /// Column marking soft-deleted rows, if the entity supports soft delete.
    fn deleted_at_column() -> Option<Self::Column> {
        None
    }
}

/// Options for read operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Also return soft-deleted rows.
    pub include_deleted: bool,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn including_deleted() -> Self {
        Self {
            include_deleted: true,
            ..Self::default()
        }
    }

    pub fn paginated(window: PageWindow) -> Self {
        Self {
            offset: Some(window.offset),
            limit: Some(window.limit),
            ..Self::default()
        }
    }
}

/// Options for [`Repository::delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Physically remove rows even when the entity supports soft delete.
    pub hard_delete: bool,
}

impl DeleteOptions {
    pub fn hard() -> Self {
        Self { hard_delete: true }
    }
}

/// CRUD accessor for one entity, parameterized by its [`RowSchema`].
pub struct Repository<E> {
    conn: DatabaseConnection,
    max_page_size: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            max_page_size: self.max_page_size,
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for Repository<E>
where
    E: EntityTrait,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &E::default().table_name())
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl<E> Repository<E>
where
    E: RowSchema,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    /// Create a repository with the default page size cap.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            max_page_size: MAX_PAGE_SIZE,
            _entity: PhantomData,
        }
    }

    /// Override the maximum page size.
    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    /// Return the first row matching `filter`, or `None`.
    ///
    /// There is no tie-break between several matching rows; callers needing a
    /// deterministic result must filter on a unique column.
    pub async fn find_one(
        &self,
        filter: impl Into<Filter>,
        options: FindOptions,
    ) -> Result<Option<E::Model>> {
        let condition = self.visible(Self::build_condition(filter.into())?, options);
        Ok(E::find().filter(condition).one(&self.conn).await?)
    }

    /// Return matching rows in primary-key order, windowed by `offset`/`limit`.
    pub async fn find_many(
        &self,
        filter: impl Into<Filter>,
        options: FindOptions,
    ) -> Result<Vec<E::Model>> {
        let condition = self.visible(Self::build_condition(filter.into())?, options);

        let mut query = E::find().filter(condition);
        for key in E::PrimaryKey::iter() {
            query = query.order_by_asc(key.into_column());
        }

        query = match (options.offset, options.limit.filter(|limit| *limit > 0)) {
            (offset, Some(limit)) => query.offset(offset).limit(limit),
            // SQLite rejects OFFSET without LIMIT.
            (Some(offset), None) => query.offset(offset).limit(i64::MAX as u64),
            (None, None) => query,
        };

        Ok(query.all(&self.conn).await?)
    }

    /// Insert exactly one row and return it with its generated identifier and timestamps.
    pub async fn create(&self, data: E::ActiveModel) -> Result<E::Model> {
        let model = data.insert(&self.conn).await?;
        debug!(table = E::default().table_name(), "row created");
        Ok(model)
    }

    /// Apply `data` to every row matching `filter` and return the resulting rows.
    ///
    /// Only the columns set on `data` change. When the entity has an
    /// `updated_at` column it is stamped with the current time.
    pub async fn update(
        &self,
        filter: impl Into<Filter>,
        mut data: E::ActiveModel,
    ) -> Result<Vec<E::Model>> {
        let condition = Self::build_condition(filter.into())?;
        let uuid_column = E::uuid_column();

        let txn = self.conn.begin().await?;

        let uuids: Vec<Uuid> = E::find()
            .select_only()
            .column(uuid_column)
            .filter(condition)
            .into_tuple()
            .all(&txn)
            .await?;
        if uuids.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let updated_at = E::updated_at_column();
        if let Some(column) = updated_at {
            data.not_set(column);
        }
        let has_changes = E::Column::iter().any(|column| !data.is_not_set(column));

        if has_changes || updated_at.is_some() {
            let mut update = E::update_many()
                .set(data)
                .filter(uuid_column.is_in(uuids.clone()));
            if let Some(column) = updated_at {
                update = update.col_expr(column, Expr::value(now()));
            }
            update.exec(&txn).await?;
        }

        let mut reread = E::find().filter(uuid_column.is_in(uuids));
        for key in E::PrimaryKey::iter() {
            reread = reread.order_by_asc(key.into_column());
        }
        let rows = reread.all(&txn).await?;
        txn.commit().await?;

        debug!(
            table = E::default().table_name(),
            rows = rows.len(),
            "rows updated"
        );
        Ok(rows)
    }

    /// Delete every row matching `filter`.
    ///
    /// Rows are soft-deleted (stamped with `deleted_at`) when the entity
    /// supports it, unless [`DeleteOptions::hard_delete`] is set. Rows that are
    /// already soft-deleted keep their original deletion time.
    pub async fn delete(&self, filter: impl Into<Filter>, options: DeleteOptions) -> Result<()> {
        let condition = Self::build_condition(filter.into())?;

        match E::deleted_at_column() {
            Some(deleted_at) if !options.hard_delete => {
                let result = E::update_many()
                    .col_expr(deleted_at, Expr::value(now()))
                    .filter(condition)
                    .filter(deleted_at.is_null())
                    .exec(&self.conn)
                    .await?;
                debug!(
                    table = E::default().table_name(),
                    rows = result.rows_affected,
                    "rows soft-deleted"
                );
            }
            _ => {
                let result = E::delete_many().filter(condition).exec(&self.conn).await?;
                debug!(
                    table = E::default().table_name(),
                    rows = result.rows_affected,
                    "rows deleted"
                );
            }
        }
        Ok(())
    }

    /// Count rows matching `filter` under the same visibility rule as [`find_many`](Self::find_many).
    pub async fn count(&self, filter: impl Into<Filter>, options: FindOptions) -> Result<u64> {
        let condition = self.visible(Self::build_condition(filter.into())?, options);
        Ok(E::find().filter(condition).count(&self.conn).await?)
    }

    /// Translate a page request into a row window. Pure; performs no I/O.
    pub fn get_pagination_params(&self, query: PageQuery) -> PageWindow {
        PageWindow::from_query(query, self.max_page_size)
    }

    fn visible(&self, condition: Condition, options: FindOptions) -> Condition {
        match E::deleted_at_column() {
            Some(deleted_at) if !options.include_deleted => condition.add(deleted_at.is_null()),
            _ => condition,
        }
    }

    fn build_condition(filter: Filter) -> Result<Condition> {
        match filter {
            Filter::All => Ok(Condition::all()),
            Filter::Fields(fields) => {
                fields
                    .into_iter()
                    .try_fold(Condition::all(), |condition, (name, value)| {
                        let column = Self::column(&name)?;
                        Ok(condition.add(column.eq(value)))
                    })
            }
            Filter::Condition(condition) => Ok(Condition::all().add(condition)),
            Filter::Conditions(conditions) => Ok(conditions
                .into_iter()
                .fold(Condition::all(), |all, condition| all.add(condition))),
        }
    }

    fn column(name: &str) -> Result<E::Column> {
        E::Column::iter()
            .find(|column| column.as_str() == name)
            .ok_or_else(|| Error::UnknownColumn {
                table: E::default().table_name().to_string(),
                column: name.to_string(),
            })
    }
}
