pub mod config;
pub mod config_loader;
pub mod error;

pub use config::{
    AlignmentPolicy, AppConfig, LoggingConfig, RankOrder, ScannerConfig, SelectorConfig,
    StorageConfig,
};
pub use config_loader::ConfigLoader;
pub use error::CointError;

/// Result alias used by the library crates of the workspace.
pub type Result<T, E = CointError> = std::result::Result<T, E>;
