mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, LogFormat, LoggingConfig, SecurityConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
