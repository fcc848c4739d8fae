//! Entity types, permissions, access, storage and revision history.
//!
//! # Examples
//!
//! ```rust
//! use entity_tools::core::identity::EntityTypeDescriptor;
//!
//! let contact = EntityTypeDescriptor::new("contact", "Contact").unwrap();
//! assert_eq!(contact.permission_key(None).unwrap().as_str(), "contact");
//! ```

pub use entity_tools_core::*;
