//! Shared configuration and environment handling for the newsint workspace.

pub mod app_config;

pub use app_config::{load_app_config, AppConfig, ConfigError, Environment};
