mod settings;

pub use settings::{DatabaseConfig, OtelConfig, RetryConfig, ServerConfig, Settings};
