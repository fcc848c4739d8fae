//! # Entity Tools Core
//!
//! Base building blocks for custom revisionable, owned and publishable content
//! entity types.
//!
//! ## Features
//!
//! - **Entity identity**: entity types with or without bundles, and the permission
//!   key every generated permission name is built from
//! - **Permission catalog**: the administer permission plus eleven CRUD and revision
//!   permissions per type or per bundle
//! - **Access evaluation**: pure view/update/delete/create decisions from ownership,
//!   publish state and granted permissions
//! - **Revision history**: ordered revision listings, the overview table model,
//!   revert-as-new-revision and delete-with-redirect
//! - **Content stores**: an in-memory store and a SQLite store (`sqlite` feature)
//!
//! ## Architecture
//!
//! ```text
//! entity-tools-core
//! ├── identity    - Entity type descriptors, bundles, permission keys
//! ├── permissions - Permission catalog builder
//! ├── account     - Actors and their granted permissions
//! ├── access      - Access evaluator
//! ├── entity      - Content entity and translations
//! ├── storage     - Content store trait, memory and SQLite stores
//! ├── revisions   - Revision history manager
//! └── routes      - Route names and parameters for revision links
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use entity_tools_core::prelude::*;
//!
//! # fn main() -> EntityResult<()> {
//! let mut node = EntityTypeDescriptor::new("node", "Content")?.with_bundle_type("node_type")?;
//! node.add_bundle("page", "Basic page")?;
//! node.add_bundle("article", "Article")?;
//!
//! let catalog = build_catalog(&node);
//! assert_eq!(catalog.len(), 1 + 11 * 2);
//! assert!(catalog.contains("view any node article entities"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod access;
pub mod account;
pub mod entity;
pub mod identity;
pub mod permissions;
pub mod revisions;
pub mod routes;
pub mod storage;

// Prelude for convenient imports
pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::access::{AccessDecision, AccessEvaluator, AccessOperation, RevisionOperation};
	pub use crate::account::{ANONYMOUS_ID, Account, ActorId, SimpleAccount};
	pub use crate::entity::{
		ContentEntity, EntityId, LANGCODE_NOT_SPECIFIED, RevisionId, Translation,
	};
	pub use crate::error::{EntityError, EntityResult};
	pub use crate::identity::{Bundle, EntityTypeDescriptor, PermissionKey, is_bundled, permission_key};
	pub use crate::permissions::{
		EntityPermission, PermissionCatalog, PermissionDefinition, build_catalog,
	};
	pub use crate::revisions::{
		DeleteOutcome, RevertOutcome, RevertTranslations, RevisionHistory, RevisionOptions,
		RevisionOverview, RevisionRow,
	};
	pub use crate::routes::{EntityRoute, RouteParameters};
	pub use crate::storage::{
		ContentStore, MemoryContentStore, RevisionFilter, SaveOutcome, SaveStatus, SortOrder,
	};

	#[cfg(feature = "sqlite")]
	pub use crate::storage::SqliteContentStore;
}

/// Entity error types
pub mod error {
	use thiserror::Error;

	/// Errors raised by entity, permission and revision operations
	#[non_exhaustive]
	#[derive(Error, Debug)]
	pub enum EntityError {
		/// Malformed input, such as a missing bundle id for a bundled type
		#[error("Invalid argument: {0}")]
		InvalidArgument(String),

		/// The operation conflicts with the current state, such as deleting the
		/// default revision
		#[error("Invalid state: {0}")]
		InvalidState(String),

		/// An entity or revision id does not resolve
		#[error("Not found: {0}")]
		NotFound(String),

		/// Storage backend failure
		#[error("Database error: {0}")]
		Database(String),

		/// Field payload could not be encoded or decoded
		#[error("Serialization error: {0}")]
		Serialization(#[from] serde_json::Error),
	}

	/// Result type for entity operations
	pub type EntityResult<T> = Result<T, EntityError>;
}
