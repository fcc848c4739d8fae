//! Permission catalog
//!
//! Every entity type gets one restricted administer permission, then eleven
//! permissions per permission key: once for an unbundled type, once per bundle
//! for a bundled one.

use crate::identity::{EntityTypeDescriptor, PermissionKey, permission_key};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The per-key permissions generated for an entity type or bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityPermission {
	/// Create new content
	Create,
	/// View unpublished content
	ViewUnpublished,
	/// View any published content
	ViewAny,
	/// View own published content
	ViewOwn,
	/// Edit any content
	EditAny,
	/// Edit own content
	EditOwn,
	/// Delete any content
	DeleteAny,
	/// Delete own content
	DeleteOwn,
	/// View revisions
	ViewRevisions,
	/// Revert revisions
	RevertRevisions,
	/// Delete revisions
	DeleteRevisions,
}

impl EntityPermission {
	/// All per-key permissions in catalog order
	pub const ALL: [EntityPermission; 11] = [
		EntityPermission::Create,
		EntityPermission::ViewUnpublished,
		EntityPermission::ViewAny,
		EntityPermission::ViewOwn,
		EntityPermission::EditAny,
		EntityPermission::EditOwn,
		EntityPermission::DeleteAny,
		EntityPermission::DeleteOwn,
		EntityPermission::ViewRevisions,
		EntityPermission::RevertRevisions,
		EntityPermission::DeleteRevisions,
	];

	/// Permission name for the given key
	///
	/// # Examples
	///
	/// ```
	/// use entity_tools_core::identity::EntityTypeDescriptor;
	/// use entity_tools_core::permissions::EntityPermission;
	///
	/// let contact = EntityTypeDescriptor::new("contact", "Contact").unwrap();
	/// let key = contact.permission_key(None).unwrap();
	///
	/// assert_eq!(EntityPermission::EditOwn.name(&key), "edit own contact entities");
	/// assert_eq!(EntityPermission::RevertRevisions.name(&key), "revert contact revisions");
	/// ```
	pub fn name(&self, key: &PermissionKey) -> String {
		match self {
			EntityPermission::Create => format!("create {} entities", key),
			EntityPermission::ViewUnpublished => format!("view unpublished {} entities", key),
			EntityPermission::ViewAny => format!("view any {} entities", key),
			EntityPermission::ViewOwn => format!("view own {} entities", key),
			EntityPermission::EditAny => format!("edit any {} entities", key),
			EntityPermission::EditOwn => format!("edit own {} entities", key),
			EntityPermission::DeleteAny => format!("delete any {} entities", key),
			EntityPermission::DeleteOwn => format!("delete own {} entities", key),
			EntityPermission::ViewRevisions => format!("view {} revisions", key),
			EntityPermission::RevertRevisions => format!("revert {} revisions", key),
			EntityPermission::DeleteRevisions => format!("delete {} revisions", key),
		}
	}

	/// Human-readable title, prefixed with the type or bundle label
	pub fn title(&self, label: &str) -> String {
		let action = match self {
			EntityPermission::Create => "Create new content",
			EntityPermission::ViewUnpublished => "View unpublished content",
			EntityPermission::ViewAny => "View any content",
			EntityPermission::ViewOwn => "View own content",
			EntityPermission::EditAny => "Edit any content",
			EntityPermission::EditOwn => "Edit own content",
			EntityPermission::DeleteAny => "Delete any content",
			EntityPermission::DeleteOwn => "Delete own content",
			EntityPermission::ViewRevisions => "View revisions",
			EntityPermission::RevertRevisions => "Revert revisions",
			EntityPermission::DeleteRevisions => "Delete revisions",
		};
		format!("{}: {}", label, action)
	}

	/// Description, present only for the revision permissions
	pub fn description(&self) -> Option<&'static str> {
		match self {
			EntityPermission::ViewRevisions => Some(
				"To view a revision, you also need permission to view the content item.",
			),
			EntityPermission::RevertRevisions => Some(
				"To revert a revision, you also need permission to edit the content item.",
			),
			EntityPermission::DeleteRevisions => Some(
				"To delete a revision, you also need permission to delete the content item.",
			),
			_ => None,
		}
	}
}

/// Name of the administer permission of an entity type
pub fn admin_permission(type_id: &str) -> String {
	format!("administer {} entities", type_id)
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
	/// Human-readable title
	pub title: String,

	/// Optional longer description
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,

	/// Whether granting this permission has security implications
	#[serde(default, rename = "restrict access")]
	pub restricted: bool,
}

/// Ordered mapping of permission name to definition
///
/// Insertion order starts with the administer permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCatalog {
	permissions: IndexMap<String, PermissionDefinition>,
}

impl PermissionCatalog {
	/// Create an empty catalog
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of permissions
	pub fn len(&self) -> usize {
		self.permissions.len()
	}

	/// Whether the catalog is empty
	pub fn is_empty(&self) -> bool {
		self.permissions.is_empty()
	}

	/// Whether a permission name is present
	pub fn contains(&self, name: &str) -> bool {
		self.permissions.contains_key(name)
	}

	/// Look up a permission definition
	pub fn get(&self, name: &str) -> Option<&PermissionDefinition> {
		self.permissions.get(name)
	}

	/// Permission names in catalog order
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.permissions.keys().map(String::as_str)
	}

	/// Iterate over `(name, definition)` pairs in catalog order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionDefinition)> {
		self.permissions.iter().map(|(k, v)| (k.as_str(), v))
	}

	fn insert(&mut self, name: String, definition: PermissionDefinition) {
		// Keys are distinct per (type, bundle)
		debug_assert!(!self.permissions.contains_key(&name), "duplicate permission {}", name);
		self.permissions.insert(name, definition);
	}

	fn extend_for_key(&mut self, key: &PermissionKey, label: &str) {
		for permission in EntityPermission::ALL {
			self.insert(
				permission.name(key),
				PermissionDefinition {
					title: permission.title(label),
					description: permission.description().map(str::to_string),
					restricted: false,
				},
			);
		}
	}
}

impl<'a> IntoIterator for &'a PermissionCatalog {
	type Item = (&'a String, &'a PermissionDefinition);
	type IntoIter = indexmap::map::Iter<'a, String, PermissionDefinition>;

	fn into_iter(self) -> Self::IntoIter {
		self.permissions.iter()
	}
}

/// Build the full permission catalog of an entity type
///
/// A bundled type with no bundles yields only the administer permission.
pub fn build_catalog(descriptor: &EntityTypeDescriptor) -> PermissionCatalog {
	let mut catalog = PermissionCatalog::new();

	catalog.insert(
		admin_permission(descriptor.type_id()),
		PermissionDefinition {
			title: format!("{}: Administer content", descriptor.label()),
			description: Some(
				"Allow to access the administration form to configure entities.".to_string(),
			),
			restricted: true,
		},
	);

	if descriptor.is_bundled() {
		for bundle in descriptor.bundles() {
			// Registered bundles are validated machine names
			if let Ok(key) = permission_key(descriptor, Some(&bundle.id)) {
				catalog.extend_for_key(&key, &bundle.label);
			}
		}
	} else if let Ok(key) = permission_key(descriptor, None) {
		catalog.extend_for_key(&key, descriptor.label());
	}

	catalog
}
