//! # Entity Tools
//!
//! Building blocks for custom content entity types that are revisionable,
//! owned by a user and publishable.
//!
//! Defining a new entity type normally means writing the same permission
//! list, access rules, revision overview and revert/delete confirmation logic
//! again. This crate provides those pieces once, generic over the entity type
//! and its bundles.
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - SQLite content store via `sqlx` and `sea-query`
//! - `conf` (default) - Layered settings (defaults, TOML file, `ENTITY_TOOLS_*` variables)
//! - `full` - All of the above
//!
//! ## Quick Example
//!
//! ```rust
//! use entity_tools::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> EntityResult<()> {
//! let contact = EntityTypeDescriptor::new("contact", "Contact")?;
//! let store = MemoryContentStore::new("contact");
//! let history = RevisionHistory::new(Arc::new(store), contact, RevisionOptions::default());
//!
//! let mut entity = ContentEntity::new("contact", "en", "Jane");
//! history.store().save(&mut entity).await?;
//! entity.set_name("Jane Doe");
//! history.store().save(&mut entity).await?;
//!
//! let revisions = history.list_revisions(entity.id().unwrap()).await?;
//! assert_eq!(revisions.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! entity-tools
//! ├── entity-tools-core - identity, permissions, access, entities, storage,
//! │                       revision history, routes
//! └── entity-tools-conf - layered settings producing revision options
//! ```

#![warn(missing_docs)]

#[cfg(feature = "conf")]
pub mod conf;
pub mod core;

pub use entity_tools_core::error::{EntityError, EntityResult};

#[cfg(feature = "conf")]
pub use entity_tools_conf::{EntityToolsSettings, SettingsBuilder, SettingsError};

/// Prelude module for convenient imports
pub mod prelude {
	pub use entity_tools_core::prelude::*;

	#[cfg(feature = "conf")]
	pub use entity_tools_conf::prelude::{
		ConfigSource, DefaultSource, EntityToolsSettings, EnvSource, SettingsBuilder,
		SettingsError, TomlFileSource,
	};
}
