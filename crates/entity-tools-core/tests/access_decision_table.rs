//! Access Decision Table Tests
//!
//! Systematic decision tables for the access evaluator: every combination of
//! publish state, ownership and granted permission for each operation.
//!
//! # Test Categories
//!
//! - View: published/unpublished x owner/stranger x permission
//! - Update and delete: any/own permissions x ownership
//! - Revisions: revision permission x administer x co-required entity access
//! - Create: bundled and unbundled types

use entity_tools_core::prelude::*;
use rstest::*;

// =============================================================================
// Fixtures
// =============================================================================

#[fixture]
fn contact() -> AccessEvaluator {
	AccessEvaluator::new(EntityTypeDescriptor::new("contact", "Contact").unwrap())
}

#[fixture]
fn node() -> AccessEvaluator {
	let mut node = EntityTypeDescriptor::new("node", "Content")
		.unwrap()
		.with_bundle_type("node_type")
		.unwrap();
	node.add_bundle("article", "Article").unwrap();
	node.add_bundle("page", "Basic page").unwrap();
	AccessEvaluator::new(node)
}

const OWNER: ActorId = 5;
const STRANGER: ActorId = 6;

fn contact_entity(published: bool) -> ContentEntity {
	let mut entity = ContentEntity::new("contact", "en", "Jane").with_owner(OWNER);
	entity.set_published(published);
	entity
}

// =============================================================================
// View Decision Table
// =============================================================================

#[rstest]
#[case(true, OWNER, "view any contact entities", true, "any, published, owner")]
#[case(true, STRANGER, "view any contact entities", true, "any, published, stranger")]
#[case(false, OWNER, "view any contact entities", false, "any, unpublished")]
#[case(true, OWNER, "view own contact entities", true, "own, published, owner")]
#[case(true, STRANGER, "view own contact entities", false, "own, published, stranger")]
#[case(false, OWNER, "view own contact entities", false, "own, unpublished, owner")]
#[case(false, OWNER, "view unpublished contact entities", true, "unpublished, owner")]
#[case(false, STRANGER, "view unpublished contact entities", true, "unpublished, stranger")]
#[case(true, STRANGER, "view unpublished contact entities", false, "unpublished perm, published entity")]
#[case(true, OWNER, "edit any contact entities", false, "edit does not grant view")]
fn test_view_decision_table(
	contact: AccessEvaluator,
	#[case] published: bool,
	#[case] actor: ActorId,
	#[case] permission: &str,
	#[case] expected: bool,
	#[case] desc: &str,
) {
	let account = SimpleAccount::new(actor).with_permission(permission);
	let decision = contact.check(&contact_entity(published), AccessOperation::View, &account);

	assert_eq!(decision.is_allowed(), expected, "view failed for: {}", desc);
}

// =============================================================================
// Update / Delete Decision Table
// =============================================================================

#[rstest]
#[case(AccessOperation::Update, "edit any contact entities", STRANGER, true)]
#[case(AccessOperation::Update, "edit own contact entities", OWNER, true)]
#[case(AccessOperation::Update, "edit own contact entities", STRANGER, false)]
#[case(AccessOperation::Update, "delete any contact entities", OWNER, false)]
#[case(AccessOperation::Delete, "delete any contact entities", STRANGER, true)]
#[case(AccessOperation::Delete, "delete own contact entities", OWNER, true)]
#[case(AccessOperation::Delete, "delete own contact entities", STRANGER, false)]
#[case(AccessOperation::Delete, "administer contact entities", OWNER, false)]
fn test_update_delete_decision_table(
	contact: AccessEvaluator,
	#[case] operation: AccessOperation,
	#[case] permission: &str,
	#[case] actor: ActorId,
	#[case] expected: bool,
) {
	let account = SimpleAccount::new(actor).with_permission(permission);

	for published in [true, false] {
		let decision = contact.check(&contact_entity(published), operation, &account);
		assert_eq!(
			decision.is_allowed(),
			expected,
			"{:?} with '{}' (published: {})",
			operation,
			permission,
			published
		);
	}
}

#[rstest]
#[case("view")]
#[case("update")]
#[case("delete")]
fn test_named_operations_match_typed(contact: AccessEvaluator, #[case] operation: &str) {
	let account = SimpleAccount::new(OWNER).with_permissions([
		"view own contact entities",
		"edit own contact entities",
		"delete own contact entities",
	]);
	let entity = contact_entity(true);
	let typed: AccessOperation = operation.parse().unwrap();

	assert_eq!(
		contact.check_named(&entity, operation, &account),
		contact.check(&entity, typed, &account)
	);
}

// =============================================================================
// Bundles
// =============================================================================

#[rstest]
fn test_view_any_article_end_to_end(node: AccessEvaluator) {
	let catalog = build_catalog(node.descriptor());
	assert!(catalog.contains("view any node article entities"));

	let reader = SimpleAccount::new(10).with_permission("view any node article entities");
	let article = ContentEntity::new("node", "en", "News")
		.with_bundle("article")
		.with_owner(3);
	let page = ContentEntity::new("node", "en", "About")
		.with_bundle("page")
		.with_owner(3);

	assert_eq!(
		node.check(&article, AccessOperation::View, &reader),
		AccessDecision::Allowed
	);
	assert_eq!(
		node.check(&page, AccessOperation::View, &reader),
		AccessDecision::Neutral
	);
}

#[rstest]
#[case(Some("article"), "create node article entities", true)]
#[case(Some("page"), "create node article entities", false)]
#[case(None, "create node article entities", false)]
#[case(Some("article"), "create node entities", false)]
fn test_create_decision_table(
	node: AccessEvaluator,
	#[case] bundle: Option<&str>,
	#[case] permission: &str,
	#[case] expected: bool,
) {
	let account = SimpleAccount::new(4).with_permission(permission);
	assert_eq!(node.check_create(bundle, &account).is_allowed(), expected);
}

#[rstest]
fn test_unbundled_create_ignores_bundle(contact: AccessEvaluator) {
	let account = SimpleAccount::new(4).with_permission("create contact entities");
	assert!(contact.check_create(None, &account).is_allowed());
	assert!(contact.check_create(Some("anything"), &account).is_allowed());
}

// =============================================================================
// Revision Decision Table
// =============================================================================

#[rstest]
#[case(RevisionOperation::View, false, false, true, false)]
#[case(RevisionOperation::View, true, false, false, false)]
#[case(RevisionOperation::View, true, false, true, true)]
#[case(RevisionOperation::View, false, true, true, true)]
#[case(RevisionOperation::Revert, true, false, true, true)]
#[case(RevisionOperation::Revert, false, true, false, false)]
#[case(RevisionOperation::Delete, true, false, true, true)]
#[case(RevisionOperation::Delete, false, false, true, false)]
fn test_revision_decision_table(
	node: AccessEvaluator,
	#[case] operation: RevisionOperation,
	#[case] revision_permission: bool,
	#[case] administer: bool,
	#[case] entity_access: bool,
	#[case] expected: bool,
) {
	let (revision_name, entity_name) = match operation {
		RevisionOperation::View => ("view node article revisions", "view any node article entities"),
		RevisionOperation::Revert => ("revert node article revisions", "edit any node article entities"),
		RevisionOperation::Delete => ("delete node article revisions", "delete any node article entities"),
	};

	let mut account = SimpleAccount::new(STRANGER);
	if revision_permission {
		account = account.with_permission(revision_name);
	}
	if administer {
		account = account.with_permission("administer node entities");
	}
	if entity_access {
		account = account.with_permission(entity_name);
	}

	let article = ContentEntity::new("node", "en", "News")
		.with_bundle("article")
		.with_owner(OWNER);

	assert_eq!(
		node.check_revision(&article, operation, &account).is_allowed(),
		expected
	);
}

// =============================================================================
// Boundary Conditions
// =============================================================================

#[rstest]
fn test_entity_of_other_type_is_neutral(contact: AccessEvaluator) {
	let root = SimpleAccount::new(1).superuser();
	let foreign = ContentEntity::new("node", "en", "News").with_bundle("article");

	assert_eq!(
		contact.check(&foreign, AccessOperation::View, &root),
		AccessDecision::Neutral
	);
}

#[rstest]
fn test_anonymous_owner_matches_nobody(contact: AccessEvaluator) {
	let mut entity = ContentEntity::new("contact", "en", "Anonymous post");
	entity.pre_save();
	assert_eq!(entity.owner_id(), Some(ANONYMOUS_ID));

	let anonymous = SimpleAccount::anonymous().with_permission("edit own contact entities");
	assert!(!contact
		.check(&entity, AccessOperation::Update, &anonymous)
		.is_allowed());
}
