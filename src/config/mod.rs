//! Configuration module - organizer tunables and storage keys
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values and storage keys
//! - `types` - `OrganizerConfig`
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::*;
pub use loader::{default_config_path, load_config};
pub use types::OrganizerConfig;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
