//! Configuration validation rules.

use super::schema::Config;
use crate::utils::is_valid_date_format;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.provider.api_base.trim().is_empty() {
        errors.push("provider.api_base must not be empty".to_string());
    }
    if config.provider.model.trim().is_empty() {
        errors.push("provider.model must not be empty".to_string());
    }
    if !(0.0..=2.0).contains(&config.provider.temperature) {
        errors.push("provider.temperature must be in [0.0, 2.0]".to_string());
    }
    if config.provider.max_output_tokens == 0 {
        errors.push("provider.max_output_tokens must be > 0".to_string());
    }
    if config.provider.timeout_secs == Some(0) {
        errors.push("provider.timeout_secs must be > 0 when set".to_string());
    }

    if config.chat.title_max_chars == 0 {
        errors.push("chat.title_max_chars must be > 0".to_string());
    }
    if config.chat.error_notice.trim().is_empty() {
        errors.push("chat.error_notice must not be empty".to_string());
    }
    if config.chat.date_format.trim().is_empty() {
        errors.push("chat.date_format must not be empty".to_string());
    } else if !is_valid_date_format(&config.chat.date_format) {
        errors.push(format!(
            "chat.date_format \"{}\" is not a valid strftime format",
            config.chat.date_format
        ));
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push("storage.data_dir must not be empty".to_string());
    }
    if config.storage.history_file.trim().is_empty() {
        errors.push("storage.history_file must not be empty".to_string());
    }

    match config.logging.format.to_ascii_lowercase().as_str() {
        "text" | "json" => {}
        other => errors.push(format!(
            "logging.format must be \"text\" or \"json\", got \"{}\"",
            other
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
