//! SQLite content store
//!
//! Three tables per entity type:
//!
//! ```text
//! <type>                  id, bundle, langcode, revision_id (default revision)
//! <type>_revision         revision_id, id, langcode, revision_user, revision_created, revision_log
//! <type>_field_revision   one row per (revision_id, langcode)
//! ```
//!
//! Entity and revision ids come from `AUTOINCREMENT` columns, so they are
//! monotonic and never reused.

use super::{ContentStore, RevisionFilter, SaveOutcome, SaveStatus, SortOrder, prepare_save};
use crate::entity::{
	ContentEntity, EntityId, EntityParts, RevisionId, Translation, TranslationParts,
};
use crate::error::{EntityError, EntityResult};
use crate::identity::validate_machine_name;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sea_query::{
	Alias, ColumnDef, Expr, ExprTrait, Func, Index, Order, Query, SelectStatement,
	SqliteQueryBuilder, Table,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

fn database(context: &'static str) -> impl FnOnce(sqlx::Error) -> EntityError {
	move |e| EntityError::Database(format!("{}: {}", context, e))
}

fn parse_time(value: &str) -> EntityResult<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| EntityError::Database(format!("invalid timestamp '{}': {}", value, e)))
}

fn col(name: &str) -> Alias {
	Alias::new(name)
}

/// Content store backed by an SQLite database
///
/// # Examples
///
/// ```rust,no_run
/// use entity_tools_core::entity::ContentEntity;
/// use entity_tools_core::storage::{ContentStore, SqliteContentStore};
///
/// # async fn example() -> entity_tools_core::error::EntityResult<()> {
/// let store = SqliteContentStore::connect("contact", "sqlite::memory:").await?;
/// store.create_tables().await?;
///
/// let mut entity = ContentEntity::new("contact", "en", "Jane");
/// let outcome = store.save(&mut entity).await?;
/// assert_eq!(store.load(outcome.entity_id).await?.label(), "Jane");
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SqliteContentStore {
	entity_type: String,
	pool: Arc<SqlitePool>,
}

impl SqliteContentStore {
	/// Connect to a database URL such as `sqlite::memory:` or `sqlite://content.db`
	///
	/// File databases are created when missing. An in-memory database is
	/// private to its connection, so the pool keeps exactly one open.
	pub async fn connect(entity_type: impl Into<String>, database_url: &str) -> EntityResult<Self> {
		let options = SqliteConnectOptions::from_str(database_url)
			.map_err(database("invalid database url"))?
			.create_if_missing(true);

		let pool_options = if database_url.contains(":memory:") {
			SqlitePoolOptions::new()
				.max_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			SqlitePoolOptions::new()
		};

		let pool = pool_options
			.connect_with(options)
			.await
			.map_err(database("database connection error"))?;

		Self::from_pool(entity_type, Arc::new(pool))
	}

	/// Use an existing pool
	pub fn from_pool(entity_type: impl Into<String>, pool: Arc<SqlitePool>) -> EntityResult<Self> {
		let entity_type = entity_type.into();
		// The type id becomes part of every table name
		validate_machine_name("entity type id", &entity_type)?;
		Ok(Self { entity_type, pool })
	}

	fn base_table(&self) -> Alias {
		Alias::new(self.entity_type.clone())
	}

	fn revision_table(&self) -> Alias {
		Alias::new(format!("{}_revision", self.entity_type))
	}

	fn field_table(&self) -> Alias {
		Alias::new(format!("{}_field_revision", self.entity_type))
	}

	/// Create the entity, revision and field tables if they don't exist
	pub async fn create_tables(&self) -> EntityResult<()> {
		let base = Table::create()
			.table(self.base_table())
			.if_not_exists()
			.col(
				ColumnDef::new(col("id"))
					.integer()
					.not_null()
					.auto_increment()
					.primary_key(),
			)
			.col(ColumnDef::new(col("bundle")).string_len(32).null())
			.col(ColumnDef::new(col("langcode")).string_len(12).not_null())
			.col(ColumnDef::new(col("revision_id")).big_integer().not_null())
			.to_owned();

		let revision = Table::create()
			.table(self.revision_table())
			.if_not_exists()
			.col(
				ColumnDef::new(col("revision_id"))
					.integer()
					.not_null()
					.auto_increment()
					.primary_key(),
			)
			.col(ColumnDef::new(col("id")).big_integer().not_null())
			.col(ColumnDef::new(col("langcode")).string_len(12).not_null())
			.col(ColumnDef::new(col("revision_user")).big_integer().null())
			.col(ColumnDef::new(col("revision_created")).text().not_null())
			.col(ColumnDef::new(col("revision_log")).text().null())
			.to_owned();

		let field = Table::create()
			.table(self.field_table())
			.if_not_exists()
			.col(ColumnDef::new(col("revision_id")).big_integer().not_null())
			.col(ColumnDef::new(col("id")).big_integer().not_null())
			.col(ColumnDef::new(col("langcode")).string_len(12).not_null())
			.col(ColumnDef::new(col("delta")).integer().not_null())
			.col(ColumnDef::new(col("default_langcode")).integer().not_null())
			.col(ColumnDef::new(col("name")).text().not_null())
			.col(ColumnDef::new(col("fields")).text().not_null())
			.col(ColumnDef::new(col("owner_id")).big_integer().null())
			.col(ColumnDef::new(col("published")).integer().not_null())
			.col(ColumnDef::new(col("created")).text().not_null())
			.col(ColumnDef::new(col("changed")).text().not_null())
			.col(
				ColumnDef::new(col("revision_translation_affected"))
					.integer()
					.not_null(),
			)
			.to_owned();

		for sql in [
			base.to_string(SqliteQueryBuilder),
			revision.to_string(SqliteQueryBuilder),
			field.to_string(SqliteQueryBuilder),
		] {
			sqlx::query(&sql)
				.execute(&*self.pool)
				.await
				.map_err(database("failed to create table"))?;
		}

		let indexes = [
			Index::create()
				.if_not_exists()
				.name(format!("idx_{}_revision_id", self.entity_type))
				.table(self.revision_table())
				.col(col("id"))
				.to_owned(),
			Index::create()
				.if_not_exists()
				.name(format!("idx_{}_revision_user", self.entity_type))
				.table(self.revision_table())
				.col(col("revision_user"))
				.to_owned(),
			Index::create()
				.if_not_exists()
				.unique()
				.name(format!("idx_{}_field_revision_langcode", self.entity_type))
				.table(self.field_table())
				.col(col("revision_id"))
				.col(col("langcode"))
				.to_owned(),
		];

		for index in indexes {
			let sql = index.to_string(SqliteQueryBuilder);
			sqlx::query(&sql)
				.execute(&*self.pool)
				.await
				.map_err(database("failed to create index"))?;
		}

		tracing::debug!(entity_type = %self.entity_type, "created content tables");
		Ok(())
	}

	fn apply_filter(query: &mut SelectStatement, filter: &RevisionFilter) {
		if let Some(id) = filter.entity_id {
			query.and_where(Expr::col(col("id")).eq(id as i64));
		}
		if let Some(author) = filter.author_id {
			query.and_where(Expr::col(col("revision_user")).eq(author as i64));
		}
		if let Some(langcode) = &filter.langcode {
			query.and_where(Expr::col(col("langcode")).eq(langcode.as_str()));
		}
	}

	async fn translations(
		&self,
		revision_id: RevisionId,
	) -> EntityResult<(String, IndexMap<String, Translation>)> {
		let sql = Query::select()
			.columns([
				col("langcode"),
				col("default_langcode"),
				col("name"),
				col("fields"),
				col("owner_id"),
				col("published"),
				col("created"),
				col("changed"),
				col("revision_translation_affected"),
			])
			.from(self.field_table())
			.and_where(Expr::col(col("revision_id")).eq(revision_id as i64))
			.order_by(col("delta"), Order::Asc)
			.to_string(SqliteQueryBuilder);

		let rows = sqlx::query(&sql)
			.fetch_all(&*self.pool)
			.await
			.map_err(database("failed to load translations"))?;

		let mut default_langcode = None;
		let mut translations = IndexMap::new();
		for row in rows {
			let langcode: String = row.try_get("langcode").map_err(database("invalid langcode"))?;
			let is_default: i64 = row
				.try_get("default_langcode")
				.map_err(database("invalid default_langcode"))?;
			let fields: String = row.try_get("fields").map_err(database("invalid fields"))?;
			let created: String = row.try_get("created").map_err(database("invalid created"))?;
			let changed: String = row.try_get("changed").map_err(database("invalid changed"))?;
			let owner_id: Option<i64> =
				row.try_get("owner_id").map_err(database("invalid owner_id"))?;
			let published: i64 = row.try_get("published").map_err(database("invalid published"))?;
			let affected: i64 = row
				.try_get("revision_translation_affected")
				.map_err(database("invalid revision_translation_affected"))?;

			if is_default != 0 {
				default_langcode = Some(langcode.clone());
			}

			translations.insert(
				langcode,
				Translation::from(TranslationParts {
					name: row.try_get("name").map_err(database("invalid name"))?,
					fields: serde_json::from_str(&fields)?,
					owner_id: owner_id.map(|id| id as u64),
					published: published != 0,
					created: parse_time(&created)?,
					changed: parse_time(&changed)?,
					revision_translation_affected: affected != 0,
				}),
			);
		}

		let default_langcode = default_langcode.ok_or_else(|| {
			EntityError::Database(format!("revision {} has no default translation", revision_id))
		})?;
		Ok((default_langcode, translations))
	}

	async fn default_revision_id(&self, id: EntityId) -> EntityResult<Option<RevisionId>> {
		let sql = Query::select()
			.column(col("revision_id"))
			.from(self.base_table())
			.and_where(Expr::col(col("id")).eq(id as i64))
			.to_string(SqliteQueryBuilder);

		let row = sqlx::query(&sql)
			.fetch_optional(&*self.pool)
			.await
			.map_err(database("failed to load entity"))?;

		row.map(|row| row.try_get::<i64, _>("revision_id").map(|rid| rid as RevisionId))
			.transpose()
			.map_err(database("invalid revision_id"))
	}
}

#[async_trait]
impl ContentStore for SqliteContentStore {
	fn entity_type(&self) -> &str {
		&self.entity_type
	}

	async fn load(&self, id: EntityId) -> EntityResult<ContentEntity> {
		let revision_id = self
			.default_revision_id(id)
			.await?
			.ok_or_else(|| EntityError::NotFound(format!("entity {}", id)))?;
		self.load_revision(revision_id).await
	}

	async fn load_revision(&self, revision_id: RevisionId) -> EntityResult<ContentEntity> {
		let sql = Query::select()
			.columns([
				col("id"),
				col("langcode"),
				col("revision_user"),
				col("revision_created"),
				col("revision_log"),
			])
			.from(self.revision_table())
			.and_where(Expr::col(col("revision_id")).eq(revision_id as i64))
			.to_string(SqliteQueryBuilder);

		let row = sqlx::query(&sql)
			.fetch_optional(&*self.pool)
			.await
			.map_err(database("failed to load revision"))?
			.ok_or_else(|| EntityError::NotFound(format!("revision {}", revision_id)))?;

		let id = row.try_get::<i64, _>("id").map_err(database("invalid id"))? as EntityId;
		let revision_langcode: String =
			row.try_get("langcode").map_err(database("invalid langcode"))?;
		let author: Option<i64> =
			row.try_get("revision_user").map_err(database("invalid revision_user"))?;
		let created: String = row
			.try_get("revision_created")
			.map_err(database("invalid revision_created"))?;
		let log: Option<String> =
			row.try_get("revision_log").map_err(database("invalid revision_log"))?;

		let sql = Query::select()
			.columns([col("bundle"), col("revision_id")])
			.from(self.base_table())
			.and_where(Expr::col(col("id")).eq(id as i64))
			.to_string(SqliteQueryBuilder);

		let base = sqlx::query(&sql)
			.fetch_optional(&*self.pool)
			.await
			.map_err(database("failed to load entity"))?
			.ok_or_else(|| EntityError::NotFound(format!("entity {}", id)))?;
		let bundle: Option<String> = base.try_get("bundle").map_err(database("invalid bundle"))?;
		let default_revision: i64 = base
			.try_get("revision_id")
			.map_err(database("invalid revision_id"))?;

		let (default_langcode, translations) = self.translations(revision_id).await?;

		tracing::debug!(entity_type = %self.entity_type, entity_id = id, revision_id, "loaded revision");

		ContentEntity::from_parts(EntityParts {
			entity_type: self.entity_type.clone(),
			bundle,
			id,
			revision_id,
			default_langcode,
			revision_langcode,
			translations,
			revision_author_id: author.map(|a| a as u64),
			revision_created: parse_time(&created)?,
			revision_log_message: log,
			default_revision: default_revision as RevisionId == revision_id,
		})
	}

	async fn save(&self, entity: &mut ContentEntity) -> EntityResult<SaveOutcome> {
		// Read before the transaction; an in-memory pool has a single connection
		let original = match entity.id() {
			Some(id) => Some(self.load(id).await?),
			None => None,
		};
		prepare_save(&self.entity_type, entity, original.as_ref())?;

		let mut tx = self
			.pool
			.begin()
			.await
			.map_err(database("failed to begin transaction"))?;

		let (status, entity_id) = match entity.id() {
			Some(id) => (SaveStatus::Updated, id),
			None => {
				let sql = Query::insert()
					.into_table(self.base_table())
					.columns([col("bundle"), col("langcode"), col("revision_id")])
					.values_panic([
						entity.bundle().map(str::to_string).into(),
						entity.langcode().into(),
						0i64.into(),
					])
					.to_string(SqliteQueryBuilder);

				let result = sqlx::query(&sql)
					.execute(&mut *tx)
					.await
					.map_err(database("failed to insert entity"))?;
				(SaveStatus::New, result.last_insert_rowid() as EntityId)
			}
		};

		let author = entity.revision_author_id().map(|a| a as i64);
		let created = entity.revision_created_time().to_rfc3339();
		let log = entity.revision_log_message().map(str::to_string);

		let revision_id = match entity.revision_id() {
			Some(current) if !entity.is_new_revision() => {
				let sql = Query::update()
					.table(self.revision_table())
					.value(col("langcode"), entity.revision_langcode())
					.value(col("revision_user"), author)
					.value(col("revision_created"), created)
					.value(col("revision_log"), log)
					.and_where(Expr::col(col("revision_id")).eq(current as i64))
					.and_where(Expr::col(col("id")).eq(entity_id as i64))
					.to_string(SqliteQueryBuilder);

				let result = sqlx::query(&sql)
					.execute(&mut *tx)
					.await
					.map_err(database("failed to update revision"))?;
				if result.rows_affected() == 0 {
					return Err(EntityError::InvalidState(format!(
						"revision {} does not belong to entity {}",
						current, entity_id
					)));
				}

				let sql = Query::delete()
					.from_table(self.field_table())
					.and_where(Expr::col(col("revision_id")).eq(current as i64))
					.to_string(SqliteQueryBuilder);
				sqlx::query(&sql)
					.execute(&mut *tx)
					.await
					.map_err(database("failed to replace translations"))?;

				current
			}
			_ => {
				let sql = Query::insert()
					.into_table(self.revision_table())
					.columns([
						col("id"),
						col("langcode"),
						col("revision_user"),
						col("revision_created"),
						col("revision_log"),
					])
					.values_panic([
						(entity_id as i64).into(),
						entity.revision_langcode().into(),
						author.into(),
						created.into(),
						log.into(),
					])
					.to_string(SqliteQueryBuilder);

				let result = sqlx::query(&sql)
					.execute(&mut *tx)
					.await
					.map_err(database("failed to insert revision"))?;
				result.last_insert_rowid() as RevisionId
			}
		};

		for (delta, (langcode, translation)) in entity.translations().enumerate() {
			let sql = Query::insert()
				.into_table(self.field_table())
				.columns([
					col("revision_id"),
					col("id"),
					col("langcode"),
					col("delta"),
					col("default_langcode"),
					col("name"),
					col("fields"),
					col("owner_id"),
					col("published"),
					col("created"),
					col("changed"),
					col("revision_translation_affected"),
				])
				.values_panic([
					(revision_id as i64).into(),
					(entity_id as i64).into(),
					langcode.into(),
					(delta as i64).into(),
					i64::from(langcode == entity.langcode()).into(),
					translation.name().into(),
					serde_json::to_string(translation.fields())?.into(),
					translation.owner_id().map(|o| o as i64).into(),
					i64::from(translation.is_published()).into(),
					translation.created_time().to_rfc3339().into(),
					translation.changed_time().to_rfc3339().into(),
					i64::from(translation.is_revision_translation_affected()).into(),
				])
				.to_string(SqliteQueryBuilder);

			sqlx::query(&sql)
				.execute(&mut *tx)
				.await
				.map_err(database("failed to insert translation"))?;
		}

		if entity.is_default_revision() {
			let sql = Query::update()
				.table(self.base_table())
				.value(col("revision_id"), revision_id as i64)
				.value(col("langcode"), entity.langcode())
				.and_where(Expr::col(col("id")).eq(entity_id as i64))
				.to_string(SqliteQueryBuilder);

			sqlx::query(&sql)
				.execute(&mut *tx)
				.await
				.map_err(database("failed to update default revision"))?;
		}

		tx.commit()
			.await
			.map_err(database("failed to commit transaction"))?;

		entity.assign_ids(entity_id, revision_id);

		tracing::debug!(
			entity_type = %self.entity_type,
			entity_id,
			revision_id,
			?status,
			"saved entity"
		);

		Ok(SaveOutcome {
			status,
			entity_id,
			revision_id,
		})
	}

	async fn delete_revision(&self, revision_id: RevisionId) -> EntityResult<()> {
		let sql = Query::select()
			.column(col("id"))
			.from(self.revision_table())
			.and_where(Expr::col(col("revision_id")).eq(revision_id as i64))
			.to_string(SqliteQueryBuilder);

		let entity_id = sqlx::query(&sql)
			.fetch_optional(&*self.pool)
			.await
			.map_err(database("failed to load revision"))?
			.ok_or_else(|| EntityError::NotFound(format!("revision {}", revision_id)))?
			.try_get::<i64, _>("id")
			.map_err(database("invalid id"))? as EntityId;

		if self.default_revision_id(entity_id).await? == Some(revision_id) {
			return Err(EntityError::InvalidState(format!(
				"revision {} is the default revision of entity {}",
				revision_id, entity_id
			)));
		}

		let mut tx = self
			.pool
			.begin()
			.await
			.map_err(database("failed to begin transaction"))?;

		for table in [self.field_table(), self.revision_table()] {
			let sql = Query::delete()
				.from_table(table)
				.and_where(Expr::col(col("revision_id")).eq(revision_id as i64))
				.to_string(SqliteQueryBuilder);
			sqlx::query(&sql)
				.execute(&mut *tx)
				.await
				.map_err(database("failed to delete revision"))?;
		}

		tx.commit()
			.await
			.map_err(database("failed to commit transaction"))?;
		Ok(())
	}

	async fn delete(&self, id: EntityId) -> EntityResult<()> {
		if self.default_revision_id(id).await?.is_none() {
			return Err(EntityError::NotFound(format!("entity {}", id)));
		}

		let mut tx = self
			.pool
			.begin()
			.await
			.map_err(database("failed to begin transaction"))?;

		for table in [self.field_table(), self.revision_table(), self.base_table()] {
			let sql = Query::delete()
				.from_table(table)
				.and_where(Expr::col(col("id")).eq(id as i64))
				.to_string(SqliteQueryBuilder);
			sqlx::query(&sql)
				.execute(&mut *tx)
				.await
				.map_err(database("failed to delete entity"))?;
		}

		tx.commit()
			.await
			.map_err(database("failed to commit transaction"))?;

		tracing::debug!(entity_type = %self.entity_type, entity_id = id, "deleted entity");
		Ok(())
	}

	async fn query_revision_ids(
		&self,
		filter: &RevisionFilter,
		order: SortOrder,
	) -> EntityResult<Vec<RevisionId>> {
		let mut query = Query::select();
		query.column(col("revision_id")).from(self.revision_table());
		Self::apply_filter(&mut query, filter);
		query.order_by(
			col("revision_id"),
			match order {
				SortOrder::Ascending => Order::Asc,
				SortOrder::Descending => Order::Desc,
			},
		);
		let sql = query.to_string(SqliteQueryBuilder);

		tracing::debug!(entity_type = %self.entity_type, %sql, "querying revision ids");

		let rows = sqlx::query(&sql)
			.fetch_all(&*self.pool)
			.await
			.map_err(database("failed to query revisions"))?;

		rows.iter()
			.map(|row| {
				row.try_get::<i64, _>("revision_id")
					.map(|rid| rid as RevisionId)
					.map_err(database("invalid revision_id"))
			})
			.collect()
	}

	async fn count_revisions(&self, filter: &RevisionFilter) -> EntityResult<u64> {
		let mut query = Query::select();
		query
			.expr_as(Func::count(Expr::col(col("revision_id"))), col("total"))
			.from(self.revision_table());
		Self::apply_filter(&mut query, filter);
		let sql = query.to_string(SqliteQueryBuilder);

		let row = sqlx::query(&sql)
			.fetch_one(&*self.pool)
			.await
			.map_err(database("failed to count revisions"))?;

		let total: i64 = row.try_get("total").map_err(database("invalid count"))?;
		Ok(total as u64)
	}

	async fn update_revision_langcode(&self, from: &str, to: &str) -> EntityResult<u64> {
		let sql = Query::update()
			.table(self.revision_table())
			.value(col("langcode"), to)
			.and_where(Expr::col(col("langcode")).eq(from))
			.to_string(SqliteQueryBuilder);

		let result = sqlx::query(&sql)
			.execute(&*self.pool)
			.await
			.map_err(database("failed to update revision language"))?;
		Ok(result.rows_affected())
	}
}
