//! Layered settings module.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "conf")]
//! use entity_tools::conf::EntityToolsSettings;
//! ```

#[cfg(feature = "conf")]
pub use entity_tools_conf::*;
