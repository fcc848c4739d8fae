//! Actors and their granted permissions
//!
//! Access checks never look up a "current user" themselves; the actor is
//! always passed in explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier of an actor (user account)
pub type ActorId = u64;

/// Identifier of the anonymous actor
pub const ANONYMOUS_ID: ActorId = 0;

/// An actor whose permissions can be queried
///
/// # Examples
///
/// ```
/// use entity_tools_core::account::{Account, SimpleAccount};
///
/// let editor = SimpleAccount::new(7).with_permission("edit any contact entities");
///
/// assert!(editor.has_permission("edit any contact entities"));
/// assert!(!editor.has_permission("delete any contact entities"));
/// assert!(!editor.is_anonymous());
/// ```
pub trait Account: Send + Sync {
	/// Identifier of this actor
	fn id(&self) -> ActorId;

	/// Whether this actor holds the named permission
	fn has_permission(&self, permission: &str) -> bool;

	/// Whether this is the anonymous actor
	fn is_anonymous(&self) -> bool {
		self.id() == ANONYMOUS_ID
	}

	/// Whether this actor holds at least one of the named permissions
	fn has_any_permission(&self, permissions: &[&str]) -> bool {
		permissions.iter().any(|p| self.has_permission(p))
	}
}

/// An in-memory account with an explicit permission set
///
/// Superusers hold every permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleAccount {
	/// Actor identifier
	pub id: ActorId,

	/// Granted permission names
	pub permissions: HashSet<String>,

	/// Whether this account bypasses permission checks
	#[serde(default)]
	pub is_superuser: bool,
}

impl SimpleAccount {
	/// Create an account with no permissions
	pub fn new(id: ActorId) -> Self {
		Self {
			id,
			permissions: HashSet::new(),
			is_superuser: false,
		}
	}

	/// Create the anonymous account
	pub fn anonymous() -> Self {
		Self::new(ANONYMOUS_ID)
	}

	/// Grant one permission
	pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
		self.permissions.insert(permission.into());
		self
	}

	/// Grant several permissions
	pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.permissions
			.extend(permissions.into_iter().map(Into::into));
		self
	}

	/// Mark the account as superuser
	pub fn superuser(mut self) -> Self {
		self.is_superuser = true;
		self
	}
}

impl Account for SimpleAccount {
	fn id(&self) -> ActorId {
		self.id
	}

	fn has_permission(&self, permission: &str) -> bool {
		self.is_superuser || self.permissions.contains(permission)
	}
}
