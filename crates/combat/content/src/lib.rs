//! Data-driven combat content and loaders.
//!
//! This crate reads the files the decision engine is tuned with:
//! - Behavior profiles (section-keyed text, one section per profile)
//! - Engine settings (TOML)
//! - The taunt message catalog
//! - Party-member profile overrides stored with a save (binary)
//!
//! Content is handed to `combat-ai` at startup and never changes afterwards,
//! except for the party overrides restored from a save.

pub mod overrides;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use overrides::{OverrideCodec, OverrideCodecError};

#[cfg(feature = "loaders")]
pub use loaders::{
    ContentFactory, LoadResult, MessageCatalog, ProfileLoader, SettingsLoader,
};
