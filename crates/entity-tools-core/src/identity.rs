//! Entity type identity
//!
//! An entity type is either unbundled (one permission key, the type id) or
//! bundled (one permission key per bundle, `"<type id> <bundle id>"`).

use crate::error::{EntityError, EntityResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A sub-type partition of an entity type, e.g. `article` under `node`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
	/// Machine name of the bundle
	pub id: String,

	/// Human-readable label
	pub label: String,
}

/// Describes an entity type and, when it has one, its bundle type
///
/// # Examples
///
/// ```
/// use entity_tools_core::identity::EntityTypeDescriptor;
///
/// let user = EntityTypeDescriptor::new("contact", "Contact").unwrap();
/// assert!(!user.is_bundled());
/// assert!(user.bundles().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
	type_id: String,
	label: String,
	bundle_type_id: Option<String>,
	bundles: Vec<Bundle>,
}

impl EntityTypeDescriptor {
	/// Create an unbundled entity type descriptor
	///
	/// The type id must be a machine name (`[a-z0-9_]+`).
	pub fn new(type_id: impl Into<String>, label: impl Into<String>) -> EntityResult<Self> {
		let type_id = type_id.into();
		validate_machine_name("entity type id", &type_id)?;

		Ok(Self {
			type_id,
			label: label.into(),
			bundle_type_id: None,
			bundles: Vec::new(),
		})
	}

	/// Declare the bundle type of this entity type
	///
	/// Once set, every permission key needs a bundle id.
	pub fn with_bundle_type(mut self, bundle_type_id: impl Into<String>) -> EntityResult<Self> {
		let bundle_type_id = bundle_type_id.into();
		validate_machine_name("bundle type id", &bundle_type_id)?;
		self.bundle_type_id = Some(bundle_type_id);
		Ok(self)
	}

	/// Register a bundle
	///
	/// Fails for unbundled types, duplicate ids and invalid machine names.
	pub fn add_bundle(
		&mut self,
		bundle_id: impl Into<String>,
		label: impl Into<String>,
	) -> EntityResult<&Bundle> {
		if self.bundle_type_id.is_none() {
			return Err(EntityError::InvalidArgument(format!(
				"entity type '{}' does not support bundles",
				self.type_id
			)));
		}

		let bundle_id = bundle_id.into();
		validate_machine_name("bundle id", &bundle_id)?;

		if self.bundle(&bundle_id).is_some() {
			return Err(EntityError::InvalidArgument(format!(
				"bundle '{}' already exists on entity type '{}'",
				bundle_id, self.type_id
			)));
		}

		self.bundles.push(Bundle {
			id: bundle_id,
			label: label.into(),
		});

		Ok(&self.bundles[self.bundles.len() - 1])
	}

	/// Remove a bundle, returning it if it was registered
	pub fn remove_bundle(&mut self, bundle_id: &str) -> Option<Bundle> {
		let index = self.bundles.iter().position(|b| b.id == bundle_id)?;
		Some(self.bundles.remove(index))
	}

	/// Machine name of the entity type
	pub fn type_id(&self) -> &str {
		&self.type_id
	}

	/// Human-readable label of the entity type
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Machine name of the bundle type, if any
	pub fn bundle_type_id(&self) -> Option<&str> {
		self.bundle_type_id.as_deref()
	}

	/// Registered bundles in insertion order
	pub fn bundles(&self) -> &[Bundle] {
		&self.bundles
	}

	/// Look up a registered bundle
	pub fn bundle(&self, bundle_id: &str) -> Option<&Bundle> {
		self.bundles.iter().find(|b| b.id == bundle_id)
	}

	/// Whether this entity type supports bundles
	pub fn is_bundled(&self) -> bool {
		self.bundle_type_id.is_some()
	}

	/// Permission key for this type and an optional bundle
	pub fn permission_key(&self, bundle_id: Option<&str>) -> EntityResult<PermissionKey> {
		permission_key(self, bundle_id)
	}
}

/// Stem of every generated permission name for a (type, bundle) pair
///
/// Never stored; always derived through [`permission_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionKey(String);

impl PermissionKey {
	/// The key as a string slice
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for PermissionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for PermissionKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Whether the descriptor supports bundles
pub fn is_bundled(descriptor: &EntityTypeDescriptor) -> bool {
	descriptor.is_bundled()
}

/// Derive the permission key for an entity type and optional bundle
///
/// For an unbundled type the key is the type id and any bundle argument is
/// ignored. For a bundled type a bundle id is required and the key is
/// `"<type id> <bundle id>"`.
///
/// # Examples
///
/// ```
/// use entity_tools_core::identity::{EntityTypeDescriptor, permission_key};
///
/// let node = EntityTypeDescriptor::new("node", "Content")
/// 	.unwrap()
/// 	.with_bundle_type("node_type")
/// 	.unwrap();
///
/// let key = permission_key(&node, Some("article")).unwrap();
/// assert_eq!(key.as_str(), "node article");
/// assert!(permission_key(&node, None).is_err());
/// ```
pub fn permission_key(
	descriptor: &EntityTypeDescriptor,
	bundle_id: Option<&str>,
) -> EntityResult<PermissionKey> {
	if !descriptor.is_bundled() {
		return Ok(PermissionKey(descriptor.type_id.clone()));
	}

	match bundle_id {
		Some(bundle) if !bundle.is_empty() => {
			validate_machine_name("bundle id", bundle)?;
			Ok(PermissionKey(format!("{} {}", descriptor.type_id, bundle)))
		}
		_ => Err(EntityError::InvalidArgument(format!(
			"entity type '{}' is bundled and requires a bundle id",
			descriptor.type_id
		))),
	}
}

/// Machine names are non-empty and limited to `[a-z0-9_]`
///
/// Keeping spaces out of both halves is what keeps permission keys injective.
pub fn validate_machine_name(what: &str, value: &str) -> EntityResult<()> {
	if value.is_empty() {
		return Err(EntityError::InvalidArgument(format!("{} must not be empty", what)));
	}

	if !value
		.chars()
		.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
	{
		return Err(EntityError::InvalidArgument(format!(
			"{} '{}' must contain only lowercase letters, digits and underscores",
			what, value
		)));
	}

	Ok(())
}
