//! User settings for gitid.
//!
//! Settings provide defaults for values the CLI does not receive explicitly.

pub mod loader;
pub mod types;

pub use loader::{LoadedSettings, global_settings_path, load_settings, load_settings_from};
pub use types::Settings;
