//! Access evaluation
//!
//! Pure decision functions over an entity's publish state and owner, the
//! permission key of its type or bundle, and the actor's permissions. Nothing
//! here is cached; callers that cache decisions must vary them per actor.

use crate::account::Account;
use crate::entity::ContentEntity;
use crate::identity::{EntityTypeDescriptor, PermissionKey};
use crate::permissions::{EntityPermission, admin_permission};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operations on an existing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOperation {
	/// View the entity
	View,
	/// Edit the entity
	Update,
	/// Delete the entity
	Delete,
}

impl FromStr for AccessOperation {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"view" => Ok(AccessOperation::View),
			"update" => Ok(AccessOperation::Update),
			"delete" => Ok(AccessOperation::Delete),
			other => Err(format!("unknown operation '{}'", other)),
		}
	}
}

/// Operations on the revisions of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionOperation {
	/// View the revision history or a single revision
	View,
	/// Revert to a revision
	Revert,
	/// Delete a revision
	Delete,
}

impl RevisionOperation {
	fn permission(self) -> EntityPermission {
		match self {
			RevisionOperation::View => EntityPermission::ViewRevisions,
			RevisionOperation::Revert => EntityPermission::RevertRevisions,
			RevisionOperation::Delete => EntityPermission::DeleteRevisions,
		}
	}

	fn entity_operation(self) -> AccessOperation {
		match self {
			RevisionOperation::View => AccessOperation::View,
			RevisionOperation::Revert => AccessOperation::Update,
			RevisionOperation::Delete => AccessOperation::Delete,
		}
	}
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
	/// A rule granted access
	Allowed,
	/// No rule matched; treated as denied unless an outer default allows
	Neutral,
}

impl AccessDecision {
	/// Whether access was granted
	pub fn is_allowed(self) -> bool {
		matches!(self, AccessDecision::Allowed)
	}

	fn allowed_if(condition: bool) -> Self {
		if condition {
			AccessDecision::Allowed
		} else {
			AccessDecision::Neutral
		}
	}
}

/// Access evaluator for one entity type
///
/// # Examples
///
/// ```
/// use entity_tools_core::access::{AccessEvaluator, AccessOperation};
/// use entity_tools_core::account::SimpleAccount;
/// use entity_tools_core::entity::ContentEntity;
/// use entity_tools_core::identity::EntityTypeDescriptor;
///
/// let contact = EntityTypeDescriptor::new("contact", "Contact").unwrap();
/// let evaluator = AccessEvaluator::new(contact);
///
/// let entity = ContentEntity::new("contact", "en", "Jane").with_owner(3);
/// let owner = SimpleAccount::new(3).with_permission("edit own contact entities");
/// let stranger = SimpleAccount::new(4).with_permission("edit own contact entities");
///
/// assert!(evaluator.check(&entity, AccessOperation::Update, &owner).is_allowed());
/// assert!(!evaluator.check(&entity, AccessOperation::Update, &stranger).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
	descriptor: EntityTypeDescriptor,
}

impl AccessEvaluator {
	/// Create an evaluator for the given entity type
	pub fn new(descriptor: EntityTypeDescriptor) -> Self {
		Self { descriptor }
	}

	/// Entity type this evaluator checks
	pub fn descriptor(&self) -> &EntityTypeDescriptor {
		&self.descriptor
	}

	/// Check an operation on an existing entity
	pub fn check<A: Account + ?Sized>(
		&self,
		entity: &ContentEntity,
		operation: AccessOperation,
		account: &A,
	) -> AccessDecision {
		let Some(key) = self.key_for(entity) else {
			return AccessDecision::Neutral;
		};
		let has = |permission: EntityPermission| account.has_permission(&permission.name(&key));
		let is_owner = is_owner(entity, account);
		let published = entity.is_published();

		let allowed = match operation {
			AccessOperation::View => {
				(!published && has(EntityPermission::ViewUnpublished))
					|| (published && has(EntityPermission::ViewAny))
					|| (published && has(EntityPermission::ViewOwn) && is_owner)
			}
			AccessOperation::Update => {
				has(EntityPermission::EditAny) || (has(EntityPermission::EditOwn) && is_owner)
			}
			AccessOperation::Delete => {
				has(EntityPermission::DeleteAny) || (has(EntityPermission::DeleteOwn) && is_owner)
			}
		};

		AccessDecision::allowed_if(allowed)
	}

	/// Check an operation given by name
	///
	/// Unknown operations are never allowed.
	pub fn check_named<A: Account + ?Sized>(
		&self,
		entity: &ContentEntity,
		operation: &str,
		account: &A,
	) -> AccessDecision {
		match operation.parse::<AccessOperation>() {
			Ok(operation) => self.check(entity, operation, account),
			Err(_) => AccessDecision::Neutral,
		}
	}

	/// Check whether the actor may create an entity of this type and bundle
	pub fn check_create<A: Account + ?Sized>(
		&self,
		bundle: Option<&str>,
		account: &A,
	) -> AccessDecision {
		match self.descriptor.permission_key(bundle) {
			Ok(key) => AccessDecision::allowed_if(
				account.has_permission(&EntityPermission::Create.name(&key)),
			),
			Err(e) => {
				tracing::warn!(
					entity_type = self.descriptor.type_id(),
					error = %e,
					"create access check without a usable permission key"
				);
				AccessDecision::Neutral
			}
		}
	}

	/// Check an operation on the revisions of an entity
	///
	/// Requires the revision permission (or the administer permission) and the
	/// matching entity access: view for viewing, update for reverting, delete
	/// for deleting.
	pub fn check_revision<A: Account + ?Sized>(
		&self,
		entity: &ContentEntity,
		operation: RevisionOperation,
		account: &A,
	) -> AccessDecision {
		let Some(key) = self.key_for(entity) else {
			return AccessDecision::Neutral;
		};

		let permitted = account.has_permission(&operation.permission().name(&key))
			|| account.has_permission(&admin_permission(self.descriptor.type_id()));

		AccessDecision::allowed_if(
			permitted
				&& self
					.check(entity, operation.entity_operation(), account)
					.is_allowed(),
		)
	}

	fn key_for(&self, entity: &ContentEntity) -> Option<PermissionKey> {
		match entity.permission_key(&self.descriptor) {
			Ok(key) => Some(key),
			Err(e) => {
				tracing::warn!(
					entity_type = entity.entity_type(),
					entity_id = ?entity.id(),
					error = %e,
					"access check without a usable permission key"
				);
				None
			}
		}
	}
}

/// Ownership requires a non-anonymous actor equal to the entity owner
pub fn is_owner<A: Account + ?Sized>(entity: &ContentEntity, account: &A) -> bool {
	!account.is_anonymous() && entity.owner_id() == Some(account.id())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::account::{ANONYMOUS_ID, SimpleAccount};
	use rstest::{fixture, rstest};

	#[fixture]
	fn evaluator() -> AccessEvaluator {
		AccessEvaluator::new(EntityTypeDescriptor::new("contact", "Contact").unwrap())
	}

	fn entity(owner: u64, published: bool) -> ContentEntity {
		let mut entity = ContentEntity::new("contact", "en", "Jane").with_owner(owner);
		entity.set_published(published);
		entity
	}

	#[rstest]
	#[case(true, true)]
	#[case(false, false)]
	fn test_view_own_requires_published(
		evaluator: AccessEvaluator,
		#[case] published: bool,
		#[case] expected: bool,
	) {
		let owner = SimpleAccount::new(5).with_permission("view own contact entities");
		let decision = evaluator.check(&entity(5, published), AccessOperation::View, &owner);
		assert_eq!(decision.is_allowed(), expected);
	}

	#[rstest]
	fn test_anonymous_never_owns(evaluator: AccessEvaluator) {
		let anonymous = SimpleAccount::anonymous().with_permissions([
			"view own contact entities",
			"edit own contact entities",
			"delete own contact entities",
		]);
		let entity = entity(ANONYMOUS_ID, true);

		for operation in [
			AccessOperation::View,
			AccessOperation::Update,
			AccessOperation::Delete,
		] {
			assert_eq!(
				evaluator.check(&entity, operation, &anonymous),
				AccessDecision::Neutral
			);
		}
	}

	#[rstest]
	fn test_view_unpublished(evaluator: AccessEvaluator) {
		let reviewer = SimpleAccount::new(9).with_permission("view unpublished contact entities");

		assert!(evaluator
			.check(&entity(1, false), AccessOperation::View, &reviewer)
			.is_allowed());
		// view unpublished does not cover published content
		assert!(!evaluator
			.check(&entity(1, true), AccessOperation::View, &reviewer)
			.is_allowed());
	}

	#[rstest]
	fn test_view_any_ignores_owner_but_not_status(evaluator: AccessEvaluator) {
		let viewer = SimpleAccount::new(9).with_permission("view any contact entities");

		assert!(evaluator
			.check(&entity(1, true), AccessOperation::View, &viewer)
			.is_allowed());
		assert!(!evaluator
			.check(&entity(1, false), AccessOperation::View, &viewer)
			.is_allowed());
	}

	#[rstest]
	#[case(AccessOperation::Update, "edit")]
	#[case(AccessOperation::Delete, "delete")]
	fn test_any_and_own_rules(
		evaluator: AccessEvaluator,
		#[case] operation: AccessOperation,
		#[case] verb: &str,
	) {
		let any = SimpleAccount::new(2).with_permission(format!("{} any contact entities", verb));
		let own = SimpleAccount::new(2).with_permission(format!("{} own contact entities", verb));

		// status doesn't matter for update and delete
		let foreign = entity(3, false);
		let owned = entity(2, false);

		assert!(evaluator.check(&foreign, operation, &any).is_allowed());
		assert!(!evaluator.check(&foreign, operation, &own).is_allowed());
		assert!(evaluator.check(&owned, operation, &own).is_allowed());
	}

	#[rstest]
	fn test_unknown_operation_is_neutral(evaluator: AccessEvaluator) {
		let root = SimpleAccount::new(1).superuser();
		assert_eq!(
			evaluator.check_named(&entity(1, true), "publish", &root),
			AccessDecision::Neutral
		);
		assert!(evaluator
			.check_named(&entity(1, true), "view", &root)
			.is_allowed());
	}

	#[rstest]
	fn test_create_access_bundled() {
		let mut node = EntityTypeDescriptor::new("node", "Content")
			.unwrap()
			.with_bundle_type("node_type")
			.unwrap();
		node.add_bundle("article", "Article").unwrap();
		let evaluator = AccessEvaluator::new(node);

		let author = SimpleAccount::new(4).with_permission("create node article entities");

		assert!(evaluator.check_create(Some("article"), &author).is_allowed());
		assert!(!evaluator.check_create(Some("page"), &author).is_allowed());
		assert!(!evaluator.check_create(None, &author).is_allowed());
	}

	#[rstest]
	fn test_bundled_entity_without_bundle_is_neutral() {
		let node = EntityTypeDescriptor::new("node", "Content")
			.unwrap()
			.with_bundle_type("node_type")
			.unwrap();
		let evaluator = AccessEvaluator::new(node);
		let root = SimpleAccount::new(1).superuser();

		let entity = ContentEntity::new("node", "en", "Orphan");
		assert_eq!(
			evaluator.check(&entity, AccessOperation::View, &root),
			AccessDecision::Neutral
		);
	}

	#[rstest]
	fn test_revision_access_needs_entity_access(evaluator: AccessEvaluator) {
		let entity = entity(1, true);

		let revert_only = SimpleAccount::new(2).with_permission("revert contact revisions");
		assert!(!evaluator
			.check_revision(&entity, RevisionOperation::Revert, &revert_only)
			.is_allowed());

		let editor = revert_only.with_permission("edit any contact entities");
		assert!(evaluator
			.check_revision(&entity, RevisionOperation::Revert, &editor)
			.is_allowed());

		let admin = SimpleAccount::new(3).with_permissions([
			"administer contact entities",
			"delete any contact entities",
		]);
		assert!(evaluator
			.check_revision(&entity, RevisionOperation::Delete, &admin)
			.is_allowed());
		assert!(!evaluator
			.check_revision(&entity, RevisionOperation::View, &admin)
			.is_allowed());
	}
}
