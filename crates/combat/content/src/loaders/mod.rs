//! Content loaders for reading combat data from files.

pub mod factory;
pub mod messages;
pub mod profiles;
pub mod settings;

pub use factory::ContentFactory;
pub use messages::MessageCatalog;
pub use profiles::ProfileLoader;
pub use settings::SettingsLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
