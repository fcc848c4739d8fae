//! In-memory content store

use super::{ContentStore, RevisionFilter, SaveOutcome, SaveStatus, SortOrder, prepare_save};
use crate::entity::{ContentEntity, EntityId, RevisionId};
use crate::error::{EntityError, EntityResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
	last_entity_id: EntityId,
	last_revision_id: RevisionId,
	/// Entity id to its default revision
	entities: BTreeMap<EntityId, RevisionId>,
	revisions: BTreeMap<RevisionId, ContentEntity>,
}

impl MemoryState {
	fn snapshot(&self, revision_id: RevisionId) -> EntityResult<ContentEntity> {
		let stored = self
			.revisions
			.get(&revision_id)
			.ok_or_else(|| EntityError::NotFound(format!("revision {}", revision_id)))?;

		let mut entity = stored.clone();
		let is_default = stored
			.id()
			.and_then(|id| self.entities.get(&id))
			.is_some_and(|default| *default == revision_id);
		entity.set_default_revision(is_default).set_new_revision(true);
		Ok(entity)
	}

	fn default_revision(&self, id: EntityId) -> EntityResult<RevisionId> {
		self.entities
			.get(&id)
			.copied()
			.ok_or_else(|| EntityError::NotFound(format!("entity {}", id)))
	}
}

/// Content store keeping every revision in process memory
///
/// Clones share the same state.
///
/// # Examples
///
/// ```
/// use entity_tools_core::entity::ContentEntity;
/// use entity_tools_core::storage::{ContentStore, MemoryContentStore};
///
/// # async fn example() -> entity_tools_core::error::EntityResult<()> {
/// let store = MemoryContentStore::new("contact");
///
/// let mut entity = ContentEntity::new("contact", "en", "Jane");
/// let outcome = store.save(&mut entity).await?;
///
/// assert!(outcome.is_new());
/// assert_eq!(store.load(outcome.entity_id).await?.label(), "Jane");
/// # Ok(())
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MemoryContentStore {
	entity_type: String,
	state: Arc<RwLock<MemoryState>>,
}

impl MemoryContentStore {
	/// Create an empty store for an entity type
	pub fn new(entity_type: impl Into<String>) -> Self {
		Self {
			entity_type: entity_type.into(),
			state: Arc::new(RwLock::new(MemoryState::default())),
		}
	}
}

#[async_trait]
impl ContentStore for MemoryContentStore {
	fn entity_type(&self) -> &str {
		&self.entity_type
	}

	async fn load(&self, id: EntityId) -> EntityResult<ContentEntity> {
		let state = self.state.read().await;
		let revision_id = state.default_revision(id)?;
		state.snapshot(revision_id)
	}

	async fn load_revision(&self, revision_id: RevisionId) -> EntityResult<ContentEntity> {
		self.state.read().await.snapshot(revision_id)
	}

	async fn save(&self, entity: &mut ContentEntity) -> EntityResult<SaveOutcome> {
		let mut state = self.state.write().await;

		let original = match entity.id() {
			Some(id) => Some(state.snapshot(state.default_revision(id)?)?),
			None => None,
		};
		prepare_save(&self.entity_type, entity, original.as_ref())?;

		let (status, entity_id) = match entity.id() {
			Some(id) => (SaveStatus::Updated, id),
			None => {
				state.last_entity_id += 1;
				(SaveStatus::New, state.last_entity_id)
			}
		};

		let revision_id = match entity.revision_id() {
			Some(current) if !entity.is_new_revision() => {
				let owner = state.revisions.get(&current).and_then(ContentEntity::id);
				if owner != Some(entity_id) {
					return Err(EntityError::InvalidState(format!(
						"revision {} does not belong to entity {}",
						current, entity_id
					)));
				}
				current
			}
			_ => {
				state.last_revision_id += 1;
				state.last_revision_id
			}
		};

		entity.assign_ids(entity_id, revision_id);
		if entity.is_default_revision() {
			state.entities.insert(entity_id, revision_id);
		}
		state.revisions.insert(revision_id, entity.clone());

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
		let mut state = self.state.write().await;

		let entity_id = state
			.revisions
			.get(&revision_id)
			.and_then(ContentEntity::id)
			.ok_or_else(|| EntityError::NotFound(format!("revision {}", revision_id)))?;

		if state.entities.get(&entity_id) == Some(&revision_id) {
			return Err(EntityError::InvalidState(format!(
				"revision {} is the default revision of entity {}",
				revision_id, entity_id
			)));
		}

		state.revisions.remove(&revision_id);
		Ok(())
	}

	async fn delete(&self, id: EntityId) -> EntityResult<()> {
		let mut state = self.state.write().await;

		if state.entities.remove(&id).is_none() {
			return Err(EntityError::NotFound(format!("entity {}", id)));
		}
		state.revisions.retain(|_, revision| revision.id() != Some(id));

		tracing::debug!(entity_type = %self.entity_type, entity_id = id, "deleted entity");
		Ok(())
	}

	async fn query_revision_ids(
		&self,
		filter: &RevisionFilter,
		order: SortOrder,
	) -> EntityResult<Vec<RevisionId>> {
		let state = self.state.read().await;

		let matching = state
			.revisions
			.iter()
			.filter(|(_, revision)| filter.matches(revision))
			.map(|(revision_id, _)| *revision_id);

		Ok(match order {
			SortOrder::Ascending => matching.collect(),
			SortOrder::Descending => matching.rev().collect(),
		})
	}

	async fn count_revisions(&self, filter: &RevisionFilter) -> EntityResult<u64> {
		let state = self.state.read().await;
		Ok(state
			.revisions
			.values()
			.filter(|revision| filter.matches(revision))
			.count() as u64)
	}

	async fn update_revision_langcode(&self, from: &str, to: &str) -> EntityResult<u64> {
		let mut state = self.state.write().await;

		let mut affected = 0;
		for revision in state.revisions.values_mut() {
			if revision.revision_langcode() == from {
				revision.set_revision_langcode(to);
				affected += 1;
			}
		}
		Ok(affected)
	}
}
