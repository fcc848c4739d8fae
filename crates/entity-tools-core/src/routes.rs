//! Route names and parameters for entity and revision pages
//!
//! Only naming lives here; building route tables is left to the web layer.

use crate::entity::{EntityId, RevisionId};
use crate::error::{EntityError, EntityResult};
use serde::{Deserialize, Serialize};

/// Pages an entity type exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRoute {
	/// The entity's canonical page
	Canonical,
	/// Revision overview
	VersionHistory,
	/// A single revision
	Revision,
	/// Confirmation before reverting to a revision
	RevisionRevertConfirm,
	/// Confirmation before deleting a revision
	RevisionDeleteConfirm,
}

impl EntityRoute {
	/// Route name for an entity type, e.g. `entity.contact.version_history`
	///
	/// # Examples
	///
	/// ```
	/// use entity_tools_core::routes::EntityRoute;
	///
	/// assert_eq!(EntityRoute::Revision.name("contact"), "entity.contact.revision");
	/// ```
	pub fn name(&self, type_id: &str) -> String {
		format!("entity.{}.{}", type_id, self.suffix())
	}

	fn suffix(&self) -> &'static str {
		match self {
			EntityRoute::Canonical => "canonical",
			EntityRoute::VersionHistory => "version_history",
			EntityRoute::Revision => "revision",
			EntityRoute::RevisionRevertConfirm => "revision_revert_confirm",
			EntityRoute::RevisionDeleteConfirm => "revision_delete_confirm",
		}
	}

	/// Static page title, if the page has one
	///
	/// The single revision page computes its title from the revision instead.
	pub fn title(&self) -> Option<&'static str> {
		match self {
			EntityRoute::VersionHistory => Some("Revisions"),
			EntityRoute::RevisionRevertConfirm => Some("Revert to earlier revision"),
			EntityRoute::RevisionDeleteConfirm => Some("Delete earlier revision"),
			EntityRoute::Canonical | EntityRoute::Revision => None,
		}
	}

	/// Whether the route takes a revision id
	pub fn takes_revision(&self) -> bool {
		matches!(
			self,
			EntityRoute::Revision
				| EntityRoute::RevisionRevertConfirm
				| EntityRoute::RevisionDeleteConfirm
		)
	}
}

/// Parameters of a route to an entity or one of its revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParameters {
	/// Entity type id
	pub entity_type: String,
	/// Entity id
	pub entity_id: EntityId,
	/// Revision id, for revision routes
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub revision_id: Option<RevisionId>,
}

impl RouteParameters {
	/// Parameters addressing an entity
	pub fn entity(entity_type: impl Into<String>, entity_id: EntityId) -> Self {
		Self {
			entity_type: entity_type.into(),
			entity_id,
			revision_id: None,
		}
	}

	/// Parameters addressing one revision of an entity
	pub fn revision(
		entity_type: impl Into<String>,
		entity_id: EntityId,
		revision_id: RevisionId,
	) -> Self {
		Self {
			entity_type: entity_type.into(),
			entity_id,
			revision_id: Some(revision_id),
		}
	}

	/// Parse raw path segments; both ids must be decimal digits only
	pub fn parse(entity_type: &str, entity_id: &str, revision_id: Option<&str>) -> EntityResult<Self> {
		Ok(Self {
			entity_type: entity_type.to_string(),
			entity_id: parse_id(entity_id)?,
			revision_id: revision_id.map(parse_id).transpose()?,
		})
	}

	/// Route name together with these parameters
	pub fn route_name(&self, route: EntityRoute) -> String {
		route.name(&self.entity_type)
	}
}

/// Parse an id path segment matching `\d+`
pub fn parse_id(segment: &str) -> EntityResult<u64> {
	if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
		return Err(EntityError::InvalidArgument(format!(
			"'{}' is not a numeric id",
			segment
		)));
	}
	segment
		.parse()
		.map_err(|e| EntityError::InvalidArgument(format!("'{}' is not a valid id: {}", segment, e)))
}
