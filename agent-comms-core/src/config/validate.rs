//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.store.path.trim().is_empty() {
        errors.push("store.path must not be empty".to_string());
    }
    if config.store.busy_timeout_ms == 0 {
        errors.push("store.busy_timeout_ms must be > 0".to_string());
    }
    if config.store.connect_timeout_ms == 0 {
        errors.push("store.connect_timeout_ms must be > 0".to_string());
    }

    if config.agents.names.iter().any(|n| n.trim().is_empty()) {
        errors.push("agents.names must not contain empty names".to_string());
    }
    let mut dir_keys: Vec<&String> = config.agents.dir_map.keys().collect();
    dir_keys.sort();
    for dir in dir_keys {
        if *dir != dir.to_lowercase() {
            errors.push(format!(
                "agents.dir_map.{} must be a lowercase directory name",
                dir
            ));
        }
        if config.agents.dir_map[dir].trim().is_empty() {
            errors.push(format!("agents.dir_map.{} must map to a non-empty name", dir));
        }
    }

    if config.poll.watch_interval_ms == 0 {
        errors.push("poll.watch_interval_ms must be > 0".to_string());
    }
    if config.poll.chat_interval_ms == 0 {
        errors.push("poll.chat_interval_ms must be > 0".to_string());
    }

    if config.chat.sender.trim().is_empty() {
        errors.push("chat.sender must not be empty".to_string());
    }
    if config.status.window_minutes == 0 {
        errors.push("status.window_minutes must be > 0".to_string());
    }

    let format = config.logging.format.to_ascii_lowercase();
    if format != "text" && format != "json" {
        errors.push("logging.format must be one of: text, json".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_aggregates_errors() {
        let mut config = Config::default();
        config.poll.watch_interval_ms = 0;
        config.agents.names.push("  ".to_string());
        config.chat.sender = String::new();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("poll.watch_interval_ms"));
        assert!(err.contains("agents.names"));
        assert!(err.contains("chat.sender"));
    }

    #[test]
    fn test_rejects_empty_dir_map_value() {
        let mut config = Config::default();
        config
            .agents
            .dir_map
            .insert("ops".to_string(), String::new());
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("agents.dir_map.ops"));
    }

    #[test]
    fn test_rejects_mixed_case_dir_map_key() {
        let mut config = Config::default();
        config
            .agents
            .dir_map
            .insert("Ops".to_string(), "Sysadmin".to_string());
        config
            .agents
            .dir_map
            .insert("ops".to_string(), "Infra".to_string());

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("agents.dir_map.Ops must be a lowercase directory name"));
        assert!(!err.contains("agents.dir_map.ops "));
    }
}
