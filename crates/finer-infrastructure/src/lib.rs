pub mod config;
pub mod paths;
pub mod storage;

pub use config::{AiConfig, AppConfig, StorageConfig};
pub use paths::FinerPaths;
pub use storage::{FileStorage, MemoryStorage};
