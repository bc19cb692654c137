//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for rasmalai
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generative model provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Conversation behavior
    #[serde(default)]
    pub chat: ChatConfig,
    /// History storage location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.rasmalai/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Gemini provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, usually injected through `GEMINI_API_KEY`
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Request timeout in seconds; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_output_tokens() -> u32 {
    8192
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: None,
        }
    }
}

/// Conversation behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Message shown at the top of a new chat
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// AI-turn text used when a request fails
    #[serde(default = "default_error_notice")]
    pub error_notice: String,
    /// Session titles longer than this are cut and suffixed with "..."
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    /// strftime format for session creation dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Title used when the first message carries only an image
    #[serde(default = "default_image_title")]
    pub image_title: String,
}

fn default_greeting() -> String {
    "Namaste! Main Rasmalai AI hoon. Boliye aaj kya banayein?".to_string()
}

fn default_error_notice() -> String {
    "Thoda issue hai boss (API Error). Check internet connection.".to_string()
}

fn default_title_max_chars() -> usize {
    30
}

fn default_date_format() -> String {
    crate::utils::DEFAULT_DATE_FORMAT.to_string()
}

fn default_image_title() -> String {
    "Image".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            error_notice: default_error_notice(),
            title_max_chars: default_title_max_chars(),
            date_format: default_date_format(),
            image_title: default_image_title(),
        }
    }
}

/// History storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the history file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

fn default_data_dir() -> String {
    "~/.rasmalai".to_string()
}

fn default_history_file() -> String {
    "history.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
        }
    }
}
