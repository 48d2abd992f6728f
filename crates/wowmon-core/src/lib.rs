//! wowmon-core: Shared building blocks for the AzerothCore exporter.
//!
//! - [`tables`]: static code → label lookup tables (race factions, classes,
//!   difficulties, LFG states, ...).
//! - [`config`]: exporter configuration loaded from defaults, an optional
//!   TOML file and environment variables.

pub mod config;
pub mod error;
pub mod tables;

pub use config::{CollectionConfig, Config, DatabaseConfig, ServerConfig};
pub use error::{ConfigError, ConfigResult};
pub use tables::{Faction, LookupTable};
