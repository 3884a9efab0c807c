//! Library half of the `qcforms` binary: configuration, logging setup and
//! store selection.

pub mod config;
pub mod observability;
pub mod store;

pub use config::{AppConfig, ConfigSource, StorageBackend, loader::load_config};
pub use store::open_store;
