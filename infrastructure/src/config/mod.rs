//! Configuration file loading for quill
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `QUILL_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./quill.toml` or `./.quill.toml`
//! 4. Global: `$XDG_CONFIG_HOME/quill/config.toml` (via `dirs::config_dir`)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, FileAgentConfig, FileAnthropicConfig, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileMcpConfig, FileOllamaConfig, FileProvidersConfig,
};
pub use loader::ConfigLoader;
