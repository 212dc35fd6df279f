/// TOML configuration with hot reloading.
pub mod toml_config;
