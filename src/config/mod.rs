//! Configuration management for dicto.
//!
//! This module handles loading and saving application configuration from TOML
//! files, as well as storage of API credentials. Configuration lives in the
//! user's config directory; credentials are stored with restricted
//! permissions in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{get_config_path, DictoConfig, RelayConfig, RetryConfig, VendorConfig};
pub use secrets::{
    clear_api_key, get_api_key, get_default_backend, save_api_key, save_default_backend,
};
