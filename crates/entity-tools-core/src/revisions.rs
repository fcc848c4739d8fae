//! Revision history
//!
//! [`RevisionHistory`] lists, reverts and deletes the revisions of one entity
//! type and shapes the revision overview. It works against any
//! [`ContentStore`].
//!
//! Reverting never rewrites history: it appends a copy of the chosen revision
//! as the new default revision.

use crate::access::RevisionOperation;
use crate::account::{Account, ActorId};
use crate::entity::{ContentEntity, EntityId, LANGCODE_NOT_SPECIFIED, RevisionId};
use crate::error::{EntityError, EntityResult};
use crate::identity::EntityTypeDescriptor;
use crate::permissions::{EntityPermission, admin_permission};
use crate::routes::{EntityRoute, RouteParameters};
use crate::storage::{ContentStore, RevisionFilter, SaveOutcome, SortOrder};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

/// Default format of revision dates
pub const DEFAULT_DATE_FORMAT: &str = "%a, %m/%d/%Y - %H:%M";

/// Which translations a revert carries over from the historical revision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertTranslations {
	/// Keep every translation of the historical revision
	#[default]
	Preserve,
	/// Keep only the default translation
	DefaultOnly,
}

impl FromStr for RevertTranslations {
	type Err = EntityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"preserve" => Ok(RevertTranslations::Preserve),
			"default_only" => Ok(RevertTranslations::DefaultOnly),
			other => Err(EntityError::InvalidArgument(format!(
				"unknown revert translations policy '{}'",
				other
			))),
		}
	}
}

/// Options of the revision history manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionOptions {
	/// Language the overview is shown in when the entity has a translation for it
	pub default_langcode: String,
	/// chrono format string for revision dates
	pub date_format: String,
	/// Translation policy of [`RevisionHistory::revert`]
	pub revert_translations: RevertTranslations,
}

impl Default for RevisionOptions {
	fn default() -> Self {
		Self {
			default_langcode: "en".to_string(),
			date_format: DEFAULT_DATE_FORMAT.to_string(),
			revert_translations: RevertTranslations::Preserve,
		}
	}
}

impl RevisionOptions {
	/// Set the overview language
	pub fn with_default_langcode(mut self, langcode: impl Into<String>) -> Self {
		self.default_langcode = langcode.into();
		self
	}

	/// Set the date format
	pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
		self.date_format = format.into();
		self
	}

	/// Set the revert translation policy
	pub fn with_revert_translations(mut self, policy: RevertTranslations) -> Self {
		self.revert_translations = policy;
		self
	}
}

/// Reject chrono format strings that contain invalid specifiers
pub fn validate_date_format(format: &str) -> EntityResult<()> {
	if format.is_empty() {
		return Err(EntityError::InvalidArgument(
			"date format must not be empty".to_string(),
		));
	}
	if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
		return Err(EntityError::InvalidArgument(format!(
			"invalid date format '{}'",
			format
		)));
	}
	Ok(())
}

/// A link from an overview row to a revision operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLink {
	/// Revert or delete
	pub operation: RevisionOperation,
	/// Link text
	pub title: String,
	/// Confirmation route
	pub route: EntityRoute,
	/// Route parameters
	pub parameters: RouteParameters,
}

/// One row of the revision overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRow {
	/// Revision id
	pub revision_id: RevisionId,
	/// Revision creation time
	pub created: DateTime<Utc>,
	/// Formatted creation time
	pub date: String,
	/// Revision author
	pub author_id: Option<ActorId>,
	/// Revision log message
	pub log_message: Option<String>,
	/// Whether this is the "Current revision" row
	pub is_current: bool,
	/// Where the date links to: the canonical page for the default revision,
	/// the revision page otherwise
	pub link: EntityRoute,
	/// Link parameters
	pub link_parameters: RouteParameters,
	/// Revert and delete links the actor may use; empty on the current row
	pub operations: Vec<OperationLink>,
}

/// The revision overview of one entity in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionOverview {
	/// Page title
	pub title: String,
	/// Language the overview is shown in
	pub langcode: String,
	/// Rows, newest first
	pub rows: Vec<RevisionRow>,
}

impl RevisionOverview {
	/// The row labeled "Current revision", if any
	pub fn current(&self) -> Option<&RevisionRow> {
		self.rows.iter().find(|row| row.is_current)
	}
}

/// Where the caller should go after a revert
#[derive(Debug, Clone, PartialEq)]
pub struct RevertOutcome {
	/// The newly saved default revision
	pub revision: ContentEntity,
	/// Ids written by the save
	pub save: SaveOutcome,
	/// Formatted creation date of the revision that was copied
	pub original_date: String,
	/// Next page
	pub redirect: EntityRoute,
	/// Parameters of the next page
	pub parameters: RouteParameters,
}

/// Where the caller should go after deleting a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
	/// Revisions left on the entity
	pub remaining_revisions: u64,
	/// The overview with more than one revision left, the canonical page otherwise
	pub redirect: EntityRoute,
	/// Parameters of the next page
	pub parameters: RouteParameters,
}

/// Revision history manager for one entity type
///
/// # Examples
///
/// ```
/// use entity_tools_core::account::SimpleAccount;
/// use entity_tools_core::entity::ContentEntity;
/// use entity_tools_core::identity::EntityTypeDescriptor;
/// use entity_tools_core::revisions::{RevisionHistory, RevisionOptions};
/// use entity_tools_core::storage::{ContentStore, MemoryContentStore};
/// use std::sync::Arc;
///
/// # async fn example() -> entity_tools_core::error::EntityResult<()> {
/// let store = Arc::new(MemoryContentStore::new("contact"));
/// let descriptor = EntityTypeDescriptor::new("contact", "Contact")?;
/// let history = RevisionHistory::new(store.clone(), descriptor, RevisionOptions::default());
///
/// let mut entity = ContentEntity::new("contact", "en", "Jane");
/// let first = store.save(&mut entity).await?;
/// entity.set_name("Jane Doe");
/// store.save(&mut entity).await?;
///
/// let editor = SimpleAccount::new(2);
/// let outcome = history.revert(first.entity_id, first.revision_id, &editor).await?;
///
/// assert_eq!(outcome.revision.label(), "Jane");
/// assert_eq!(history.list_revisions(first.entity_id).await?.len(), 3);
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```
#[derive(Debug)]
pub struct RevisionHistory<S: ContentStore> {
	store: Arc<S>,
	descriptor: EntityTypeDescriptor,
	options: RevisionOptions,
}

impl<S: ContentStore> Clone for RevisionHistory<S> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			descriptor: self.descriptor.clone(),
			options: self.options.clone(),
		}
	}
}

impl<S: ContentStore> RevisionHistory<S> {
	/// Create a manager over a store
	pub fn new(store: Arc<S>, descriptor: EntityTypeDescriptor, options: RevisionOptions) -> Self {
		Self {
			store,
			descriptor,
			options,
		}
	}

	/// The underlying store
	pub fn store(&self) -> &Arc<S> {
		&self.store
	}

	/// The managed entity type
	pub fn descriptor(&self) -> &EntityTypeDescriptor {
		&self.descriptor
	}

	/// Current options
	pub fn options(&self) -> &RevisionOptions {
		&self.options
	}

	/// Revision ids of an entity, oldest first
	pub async fn list_revisions(&self, entity_id: EntityId) -> EntityResult<Vec<RevisionId>> {
		self.store
			.query_revision_ids(&RevisionFilter::entity(entity_id), SortOrder::Ascending)
			.await
	}

	/// Revision ids authored by an actor across all entities, oldest first
	pub async fn list_revisions_by_author(&self, author_id: ActorId) -> EntityResult<Vec<RevisionId>> {
		self.store
			.query_revision_ids(&RevisionFilter::author(author_id), SortOrder::Ascending)
			.await
	}

	/// Number of revisions stored for an entity's default language
	///
	/// Every revision stores exactly one default-language translation row.
	pub async fn count_default_language_revisions(&self, entity_id: EntityId) -> EntityResult<u64> {
		self.store
			.count_revisions(&RevisionFilter::entity(entity_id))
			.await
	}

	/// Reassign every revision recorded in `langcode` to the "not specified" language
	///
	/// Returns the number of revisions changed; a second run returns zero.
	pub async fn clear_revisions_language(&self, langcode: &str) -> EntityResult<u64> {
		if langcode.is_empty() || langcode == LANGCODE_NOT_SPECIFIED {
			return Err(EntityError::InvalidArgument(format!(
				"cannot clear language '{}'",
				langcode
			)));
		}

		let affected = self
			.store
			.update_revision_langcode(langcode, LANGCODE_NOT_SPECIFIED)
			.await?;

		tracing::info!(
			entity_type = self.descriptor.type_id(),
			langcode,
			affected,
			"cleared revision language"
		);
		Ok(affected)
	}

	/// Load one revision, checking it belongs to the entity
	pub async fn revision(&self, entity_id: EntityId, revision_id: RevisionId) -> EntityResult<ContentEntity> {
		let revision = self.store.load_revision(revision_id).await?;
		if revision.id() != Some(entity_id) {
			return Err(EntityError::NotFound(format!(
				"revision {} of entity {}",
				revision_id, entity_id
			)));
		}
		Ok(revision)
	}

	/// Title of the single revision page
	pub async fn revision_title(&self, revision_id: RevisionId) -> EntityResult<String> {
		let revision = self.store.load_revision(revision_id).await?;
		Ok(format!(
			"Revision of {} from {}",
			revision.label(),
			self.format_date(revision.revision_created_time())?
		))
	}

	/// Build the revision overview of an entity
	///
	/// Without an explicit `langcode` the overview uses the configured default
	/// language when the entity has that translation, and the entity's own
	/// language otherwise. Revisions that don't affect the shown language are
	/// left out.
	pub async fn overview<A: Account + ?Sized>(
		&self,
		entity: &ContentEntity,
		langcode: Option<&str>,
		account: &A,
	) -> EntityResult<RevisionOverview> {
		let entity_id = entity.id().ok_or_else(|| {
			EntityError::InvalidArgument("cannot list revisions of an unsaved entity".to_string())
		})?;

		let langcode = match langcode {
			Some(langcode) => langcode.to_string(),
			None if entity.has_translation(&self.options.default_langcode) => {
				self.options.default_langcode.clone()
			}
			None => entity.langcode().to_string(),
		};

		let label = entity
			.translation(&langcode)
			.map(|t| t.name())
			.unwrap_or_else(|| entity.label());
		let title = if entity.translation_languages().len() > 1 {
			format!("{} revisions for {}", langcode, label)
		} else {
			format!("Revisions for {}", label)
		};

		let may_revert = self.may(entity, EntityPermission::RevertRevisions, account);
		let may_delete = self.may(entity, EntityPermission::DeleteRevisions, account);
		let type_id = self.descriptor.type_id();

		let revision_ids = self
			.store
			.query_revision_ids(&RevisionFilter::entity(entity_id), SortOrder::Descending)
			.await?;

		let mut rows = Vec::new();
		for revision_id in revision_ids {
			let revision = self.store.load_revision(revision_id).await?;
			let shown = revision
				.translation(&langcode)
				.is_some_and(|t| t.is_revision_translation_affected());
			if !shown {
				continue;
			}

			let is_current = rows.is_empty();
			let parameters = RouteParameters::revision(type_id, entity_id, revision_id);

			let (link, link_parameters) = if Some(revision_id) == entity.revision_id() {
				(EntityRoute::Canonical, RouteParameters::entity(type_id, entity_id))
			} else {
				(EntityRoute::Revision, parameters.clone())
			};

			let mut operations = Vec::new();
			if !is_current {
				if may_revert {
					operations.push(OperationLink {
						operation: RevisionOperation::Revert,
						title: "Revert".to_string(),
						route: EntityRoute::RevisionRevertConfirm,
						parameters: parameters.clone(),
					});
				}
				if may_delete {
					operations.push(OperationLink {
						operation: RevisionOperation::Delete,
						title: "Delete".to_string(),
						route: EntityRoute::RevisionDeleteConfirm,
						parameters,
					});
				}
			}

			rows.push(RevisionRow {
				revision_id,
				created: revision.revision_created_time(),
				date: self.format_date(revision.revision_created_time())?,
				author_id: revision.revision_author_id(),
				log_message: revision.revision_log_message().map(str::to_string),
				is_current,
				link,
				link_parameters,
				operations,
			});
		}

		tracing::debug!(
			entity_type = type_id,
			entity_id,
			%langcode,
			rows = rows.len(),
			"built revision overview"
		);

		Ok(RevisionOverview {
			title,
			langcode,
			rows,
		})
	}

	/// Revert an entity to a historical revision
	///
	/// Saves a copy of the revision as the new default revision, authored by
	/// `actor`. Fails with `InvalidState` for an unknown revision id and with
	/// `NotFound` when the revision belongs to another entity.
	pub async fn revert<A: Account + ?Sized>(
		&self,
		entity_id: EntityId,
		revision_id: RevisionId,
		actor: &A,
	) -> EntityResult<RevertOutcome> {
		let mut revision = match self.store.load_revision(revision_id).await {
			Ok(revision) => revision,
			Err(EntityError::NotFound(_)) => {
				return Err(EntityError::InvalidState(format!(
					"cannot revert to unknown revision {}",
					revision_id
				)));
			}
			Err(e) => return Err(e),
		};
		if revision.id() != Some(entity_id) {
			return Err(EntityError::NotFound(format!(
				"revision {} of entity {}",
				revision_id, entity_id
			)));
		}

		let original_date = self.format_date(revision.revision_created_time())?;

		if self.options.revert_translations == RevertTranslations::DefaultOnly {
			revision.retain_default_translation();
		}

		revision
			.set_new_revision(true)
			.set_default_revision(true)
			.set_revision_created_time(Utc::now())
			.set_revision_author_id(actor.id())
			.set_revision_log_message(format!("Copy of the revision from {}.", original_date));

		let save = self.store.save(&mut revision).await?;

		tracing::info!(
			entity_type = self.descriptor.type_id(),
			entity_id,
			from_revision = revision_id,
			revision_id = save.revision_id,
			actor = actor.id(),
			"reverted {} revision",
			revision.label()
		);

		Ok(RevertOutcome {
			revision,
			save,
			original_date,
			redirect: EntityRoute::VersionHistory,
			parameters: RouteParameters::entity(self.descriptor.type_id(), entity_id),
		})
	}

	/// Delete a non-default revision
	///
	/// The default revision, including the last remaining one, can't be
	/// deleted here; delete the entity through the store instead.
	pub async fn delete_revision(
		&self,
		entity_id: EntityId,
		revision_id: RevisionId,
	) -> EntityResult<DeleteOutcome> {
		let revision = self.revision(entity_id, revision_id).await?;
		if revision.is_default_revision() {
			return Err(EntityError::InvalidState(format!(
				"revision {} is the default revision of entity {}",
				revision_id, entity_id
			)));
		}

		self.store.delete_revision(revision_id).await?;

		let remaining_revisions = self
			.store
			.count_revisions(&RevisionFilter::entity(entity_id))
			.await?;

		tracing::info!(
			entity_type = self.descriptor.type_id(),
			entity_id,
			revision_id,
			remaining_revisions,
			"deleted {} revision",
			revision.label()
		);

		let redirect = if remaining_revisions > 1 {
			EntityRoute::VersionHistory
		} else {
			EntityRoute::Canonical
		};

		Ok(DeleteOutcome {
			remaining_revisions,
			redirect,
			parameters: RouteParameters::entity(self.descriptor.type_id(), entity_id),
		})
	}

	fn may<A: Account + ?Sized>(
		&self,
		entity: &ContentEntity,
		permission: EntityPermission,
		account: &A,
	) -> bool {
		if account.has_permission(&admin_permission(self.descriptor.type_id())) {
			return true;
		}
		match entity.permission_key(&self.descriptor) {
			Ok(key) => account.has_permission(&permission.name(&key)),
			Err(e) => {
				tracing::warn!(
					entity_type = entity.entity_type(),
					error = %e,
					"revision links without a usable permission key"
				);
				false
			}
		}
	}

	fn format_date(&self, date: DateTime<Utc>) -> EntityResult<String> {
		let mut out = String::new();
		write!(out, "{}", date.format(&self.options.date_format)).map_err(|_| {
			EntityError::InvalidArgument(format!(
				"invalid date format '{}'",
				self.options.date_format
			))
		})?;
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::account::SimpleAccount;
	use crate::storage::MemoryContentStore;
	use chrono::TimeZone;
	use rstest::rstest;

	fn history(options: RevisionOptions) -> RevisionHistory<MemoryContentStore> {
		RevisionHistory::new(
			Arc::new(MemoryContentStore::new("contact")),
			EntityTypeDescriptor::new("contact", "Contact").unwrap(),
			options,
		)
	}

	#[rstest]
	#[case("%Y-%m-%d", true)]
	#[case(DEFAULT_DATE_FORMAT, true)]
	#[case("", false)]
	#[case("%Q", false)]
	fn test_validate_date_format(#[case] format: &str, #[case] valid: bool) {
		assert_eq!(validate_date_format(format).is_ok(), valid);
	}

	#[rstest]
	fn test_format_date_uses_configured_format() {
		let history = history(RevisionOptions::default().with_date_format("%Y-%m-%d %H:%M"));
		let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
		assert_eq!(history.format_date(date).unwrap(), "2024-03-09 14:05");

		let default = history_default();
		assert_eq!(default.format_date(date).unwrap(), "Sat, 03/09/2024 - 14:05");
	}

	fn history_default() -> RevisionHistory<MemoryContentStore> {
		history(RevisionOptions::default())
	}

	#[rstest]
	#[case("preserve", Some(RevertTranslations::Preserve))]
	#[case("default_only", Some(RevertTranslations::DefaultOnly))]
	#[case("all", None)]
	fn test_parse_revert_translations(
		#[case] value: &str,
		#[case] expected: Option<RevertTranslations>,
	) {
		assert_eq!(value.parse::<RevertTranslations>().ok(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_revert_default_only_drops_translations() {
		let history = history(
			RevisionOptions::default().with_revert_translations(RevertTranslations::DefaultOnly),
		);
		let store = history.store().clone();

		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.add_translation("fr", "Jeanne").unwrap();
		let first = store.save(&mut entity).await.unwrap();
		store.save(&mut entity).await.unwrap();

		let actor = SimpleAccount::new(8);
		let outcome = history
			.revert(first.entity_id, first.revision_id, &actor)
			.await
			.unwrap();

		assert_eq!(outcome.revision.translation_languages(), vec!["en"]);
		assert_eq!(outcome.revision.revision_author_id(), Some(8));
	}

	#[rstest]
	#[tokio::test]
	async fn test_clear_not_specified_language_rejected() {
		let history = history_default();
		assert!(matches!(
			history.clear_revisions_language(LANGCODE_NOT_SPECIFIED).await,
			Err(EntityError::InvalidArgument(_))
		));
		assert!(history.clear_revisions_language("").await.is_err());
	}

	#[rstest]
	#[tokio::test]
	async fn test_overview_of_unsaved_entity_fails() {
		let history = history_default();
		let entity = ContentEntity::new("contact", "en", "Jane");
		let account = SimpleAccount::new(1);

		assert!(history.overview(&entity, None, &account).await.is_err());
	}
}
