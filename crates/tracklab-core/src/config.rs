//! TrackLab configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration, loaded from `~/.tracklab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackLabConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub cascade: CascadeConfig,
}

impl TrackLabConfig {
    /// Load config from the default path, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::TrackLabError::Config(format!("Failed to read config: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::TrackLabError::Config(format!("Failed to parse config: {e}"))
        })?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::error::TrackLabError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the TrackLab home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tracklab")
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path; empty means `~/.tracklab/tracklab.db`.
    #[serde(default)]
    pub path: String,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_empty() {
            TrackLabConfig::home_dir().join("tracklab.db")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: String::new() }
    }
}

/// Gateway (HTTP/WebSocket server) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 5000 }
fn default_frontend_origin() -> String { "http://localhost:3000".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_origin: default_frontend_origin(),
        }
    }
}

/// Ollama endpoint configuration for the daily analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_ollama_port")]
    pub port: u16,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Request timeout in seconds. Reasoning models can take minutes.
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "bool_true")]
    pub analysis_enabled: bool,
}

fn default_ollama_host() -> String { "127.0.0.1".into() }
fn default_ollama_port() -> u16 { 11434 }
fn default_ollama_model() -> String { "deepseek-r1:7b".into() }
fn default_ollama_timeout() -> u64 { 300 }
fn bool_true() -> bool { true }

impl OllamaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            port: default_ollama_port(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
            analysis_enabled: true,
        }
    }
}

/// Wall-clock schedule configuration. All times are host-local.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// First hour (inclusive) of the hourly activity popup window.
    #[serde(default = "default_popup_start_hour")]
    pub popup_start_hour: u32,
    /// Last hour (inclusive) of the popup window.
    #[serde(default = "default_popup_end_hour")]
    pub popup_end_hour: u32,
    /// Minute past each hour the popup fires.
    #[serde(default = "default_popup_minute")]
    pub popup_minute: u32,
    #[serde(default = "default_daily_note_hour")]
    pub daily_note_hour: u32,
    #[serde(default = "default_daily_note_minute")]
    pub daily_note_minute: u32,
    #[serde(default = "default_analysis_hour")]
    pub analysis_hour: u32,
    #[serde(default = "default_analysis_minute")]
    pub analysis_minute: u32,
    /// How often the scheduler checks for due jobs, in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_popup_start_hour() -> u32 { 8 }
fn default_popup_end_hour() -> u32 { 17 }
fn default_popup_minute() -> u32 { 30 }
fn default_daily_note_hour() -> u32 { 16 }
fn default_daily_note_minute() -> u32 { 55 }
fn default_analysis_hour() -> u32 { 17 }
fn default_analysis_minute() -> u32 { 0 }
fn default_tick_secs() -> u64 { 20 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            popup_start_hour: default_popup_start_hour(),
            popup_end_hour: default_popup_end_hour(),
            popup_minute: default_popup_minute(),
            daily_note_hour: default_daily_note_hour(),
            daily_note_minute: default_daily_note_minute(),
            analysis_hour: default_analysis_hour(),
            analysis_minute: default_analysis_minute(),
            tick_secs: default_tick_secs(),
        }
    }
}

/// Status-cascade policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Whether a project whose activities are all Complete is auto-completed.
    /// Off by default: auto-completing can surprise an operator who still
    /// wants to review the project before closing it.
    #[serde(default)]
    pub auto_complete_projects: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self { auto_complete_projects: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackLabConfig::default();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.ollama.model, "deepseek-r1:7b");
        assert_eq!(config.ollama.base_url(), "http://127.0.0.1:11434");
        assert_eq!(config.scheduler.popup_minute, 30);
        assert!(!config.cascade.auto_complete_projects);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [ollama]
            host = "192.168.200.5"
            model = "llama3.2"
            analysis_enabled = false

            [scheduler]
            popup_start_hour = 9
            analysis_hour = 18

            [cascade]
            auto_complete_projects = true
        "#;

        let config: TrackLabConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ollama.host, "192.168.200.5");
        assert_eq!(config.ollama.model, "llama3.2");
        assert!(!config.ollama.analysis_enabled);
        assert_eq!(config.scheduler.popup_start_hour, 9);
        assert_eq!(config.scheduler.analysis_hour, 18);
        // untouched sections keep their defaults
        assert_eq!(config.scheduler.popup_minute, 30);
        assert!(config.cascade.auto_complete_projects);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: TrackLabConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.ollama.timeout_secs, 300);
    }
}
