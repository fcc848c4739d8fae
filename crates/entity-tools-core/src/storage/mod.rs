//! Content stores
//!
//! A [`ContentStore`] persists the revisions of one entity type. Stores
//! assign entity and revision ids atomically: the in-memory store under its
//! write lock, the SQLite store through auto-increment columns inside a
//! transaction.
//!
//! ## Architecture
//!
//! ```text
//! ContentStore (trait)
//! ├── MemoryContentStore   tokio RwLock over ordered maps
//! └── SqliteContentStore   sqlx pool, sea-query statements (feature "sqlite")
//! ```

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryContentStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteContentStore;

use crate::account::ActorId;
use crate::entity::{ContentEntity, EntityId, RevisionId};
use crate::error::{EntityError, EntityResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether a save created the entity or updated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
	/// The entity was inserted
	New,
	/// An existing entity was updated
	Updated,
}

/// Result of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
	/// Insert or update
	pub status: SaveStatus,
	/// Entity id, assigned on insert
	pub entity_id: EntityId,
	/// Revision the save wrote to
	pub revision_id: RevisionId,
}

impl SaveOutcome {
	/// Whether the save inserted a new entity
	pub fn is_new(&self) -> bool {
		self.status == SaveStatus::New
	}
}

/// Ordering of revision id queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
	/// Oldest first
	#[default]
	Ascending,
	/// Newest first
	Descending,
}

/// Conditions on stored revisions; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionFilter {
	/// Revisions of this entity
	pub entity_id: Option<EntityId>,
	/// Revisions authored by this actor
	pub author_id: Option<ActorId>,
	/// Revisions whose recorded language is this code
	pub langcode: Option<String>,
}

impl RevisionFilter {
	/// Filter on an entity
	pub fn entity(entity_id: EntityId) -> Self {
		Self {
			entity_id: Some(entity_id),
			..Self::default()
		}
	}

	/// Filter on a revision author
	pub fn author(author_id: ActorId) -> Self {
		Self {
			author_id: Some(author_id),
			..Self::default()
		}
	}

	/// Also require the recorded revision language
	pub fn with_langcode(mut self, langcode: impl Into<String>) -> Self {
		self.langcode = Some(langcode.into());
		self
	}

	/// Whether a revision satisfies every set condition
	pub fn matches(&self, revision: &ContentEntity) -> bool {
		self.entity_id.is_none_or(|id| revision.id() == Some(id))
			&& self
				.author_id
				.is_none_or(|author| revision.revision_author_id() == Some(author))
			&& self
				.langcode
				.as_deref()
				.is_none_or(|langcode| revision.revision_langcode() == langcode)
	}
}

/// Revision-aware persistence for one entity type
///
/// Loaded entities are set to create a new revision on their next save;
/// callers that want to update the loaded revision in place clear the flag
/// with [`ContentEntity::set_new_revision`].
#[async_trait]
pub trait ContentStore: Send + Sync {
	/// Machine name of the entity type this store holds
	fn entity_type(&self) -> &str;

	/// Load the default revision of an entity
	async fn load(&self, id: EntityId) -> EntityResult<ContentEntity>;

	/// Load a specific revision
	async fn load_revision(&self, revision_id: RevisionId) -> EntityResult<ContentEntity>;

	/// Save an entity, assigning ids on the entity
	///
	/// New entities always become the default revision. Existing entities
	/// get a new revision unless [`ContentEntity::is_new_revision`] is false,
	/// in which case the loaded revision is overwritten.
	async fn save(&self, entity: &mut ContentEntity) -> EntityResult<SaveOutcome>;

	/// Delete a non-default revision
	///
	/// Fails with `InvalidState` for the default revision and `NotFound` for
	/// an unknown id.
	async fn delete_revision(&self, revision_id: RevisionId) -> EntityResult<()>;

	/// Delete an entity and all of its revisions
	async fn delete(&self, id: EntityId) -> EntityResult<()>;

	/// Revision ids matching a filter
	async fn query_revision_ids(
		&self,
		filter: &RevisionFilter,
		order: SortOrder,
	) -> EntityResult<Vec<RevisionId>>;

	/// Number of revisions matching a filter
	async fn count_revisions(&self, filter: &RevisionFilter) -> EntityResult<u64>;

	/// Rewrite the recorded language of every revision in `from` to `to`
	///
	/// Returns the number of revisions changed.
	async fn update_revision_langcode(&self, from: &str, to: &str) -> EntityResult<u64>;
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStore for Arc<S> {
	fn entity_type(&self) -> &str {
		(**self).entity_type()
	}

	async fn load(&self, id: EntityId) -> EntityResult<ContentEntity> {
		(**self).load(id).await
	}

	async fn load_revision(&self, revision_id: RevisionId) -> EntityResult<ContentEntity> {
		(**self).load_revision(revision_id).await
	}

	async fn save(&self, entity: &mut ContentEntity) -> EntityResult<SaveOutcome> {
		(**self).save(entity).await
	}

	async fn delete_revision(&self, revision_id: RevisionId) -> EntityResult<()> {
		(**self).delete_revision(revision_id).await
	}

	async fn delete(&self, id: EntityId) -> EntityResult<()> {
		(**self).delete(id).await
	}

	async fn query_revision_ids(
		&self,
		filter: &RevisionFilter,
		order: SortOrder,
	) -> EntityResult<Vec<RevisionId>> {
		(**self).query_revision_ids(filter, order).await
	}

	async fn count_revisions(&self, filter: &RevisionFilter) -> EntityResult<u64> {
		(**self).count_revisions(filter).await
	}

	async fn update_revision_langcode(&self, from: &str, to: &str) -> EntityResult<u64> {
		(**self).update_revision_langcode(from, to).await
	}
}

/// Shared pre-write step of every store
///
/// `original` is the current default revision of an existing entity.
pub(crate) fn prepare_save(
	entity_type: &str,
	entity: &mut ContentEntity,
	original: Option<&ContentEntity>,
) -> EntityResult<()> {
	if entity.entity_type() != entity_type {
		return Err(EntityError::InvalidArgument(format!(
			"cannot save a '{}' entity in the '{}' store",
			entity.entity_type(),
			entity_type
		)));
	}

	if entity.is_new() {
		entity.set_default_revision(true);
	} else if !entity.is_new_revision() && entity.revision_id().is_none() {
		return Err(EntityError::InvalidState(
			"an existing entity without a revision id must be saved as a new revision"
				.to_string(),
		));
	}

	let new_revision = entity.is_new() || entity.is_new_revision();
	entity.refresh_revision_metadata(new_revision);
	entity.pre_save();
	entity.mark_affected_translations(original);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_filter_matches() {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.assign_ids(4, 10);
		entity.set_revision_author_id(2);

		assert!(RevisionFilter::default().matches(&entity));
		assert!(RevisionFilter::entity(4).matches(&entity));
		assert!(!RevisionFilter::entity(5).matches(&entity));
		assert!(RevisionFilter::author(2).with_langcode("en").matches(&entity));
		assert!(!RevisionFilter::author(2).with_langcode("fr").matches(&entity));
	}

	#[rstest]
	fn test_prepare_save_rejects_foreign_type() {
		let mut entity = ContentEntity::new("node", "en", "Hello");
		let result = prepare_save("contact", &mut entity, None);
		assert!(matches!(result, Err(EntityError::InvalidArgument(_))));
	}

	#[rstest]
	fn test_prepare_save_forces_default_on_insert() {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.set_default_revision(false);

		prepare_save("contact", &mut entity, None).unwrap();

		assert!(entity.is_default_revision());
		assert!(entity.default_translation().is_revision_translation_affected());
	}
}
