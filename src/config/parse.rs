use super::types::*;
use crate::config::{env_var_pattern, expand_env_vars, expand_tilde};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate a config document. An empty document yields the defaults.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = if yaml_string.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml_string)?
    };

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error.
/// Comment lines are skipped.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let mut unexpanded_vars: Vec<String> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| env_var_pattern().captures_iter(line))
        .map(|cap| cap[1].to_string())
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        unexpanded_vars.join(", ")
    )))
}

fn expand_paths(config: &mut Config) {
    if let Some(bridge) = config.host.bridge.as_mut() {
        bridge.program = expand_tilde(&bridge.program);
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.units.is_empty() {
        errors.push("units: at least one unit must be configured".to_string());
    }

    let mut seen = HashSet::new();
    for unit in &config.units {
        if unit.trim().is_empty() {
            errors.push("units: unit names must not be empty".to_string());
        } else if !seen.insert(unit.as_str()) {
            errors.push(format!("units: duplicate unit '{}'", unit));
        }
    }

    if config.detect.units.iter().any(|u| u.trim().is_empty()) {
        errors.push("detect.units: unit names must not be empty".to_string());
    }

    if config.host.systemctl.trim().is_empty() {
        errors.push("host.systemctl: must not be empty".to_string());
    }
    if config.host.journalctl.trim().is_empty() {
        errors.push("host.journalctl: must not be empty".to_string());
    }
    if let Some(bridge) = &config.host.bridge {
        if bridge.program.as_os_str().is_empty() {
            errors.push("host.bridge.program: must not be empty".to_string());
        }
    }

    match config.collector.interval {
        None => errors.push("collector.interval: must be finite".to_string()),
        Some(d) if d.is_zero() => {
            errors.push("collector.interval: must be greater than zero".to_string())
        }
        Some(_) => {}
    }
    if config.collector.read_timeout.is_some_and(|d| d.is_zero()) {
        errors.push("collector.read_timeout: must be greater than zero".to_string());
    }
    if config.collector.cycle_timeout.is_some_and(|d| d.is_zero()) {
        errors.push("collector.cycle_timeout: must be greater than zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_errors(yaml: &str) -> Vec<String> {
        match parse_config(yaml) {
            Err(ConfigError::ValidationList(errors)) => errors,
            other => panic!("expected validation list, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config = parse_config("").unwrap();
        assert_eq!(config.units.len(), 3);
    }

    #[test]
    fn test_duplicate_and_empty_units_rejected() {
        let errors = validation_errors("units: [a, a, '']\n");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("duplicate unit 'a'")));
        assert!(errors.iter().any(|e| e.contains("must not be empty")));
    }

    #[test]
    fn test_no_units_rejected() {
        let errors = validation_errors("units: []\n");
        assert!(errors[0].contains("at least one unit"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let errors = validation_errors("collector:\n  interval: 0s\n");
        assert!(errors[0].contains("collector.interval"));
    }

    #[test]
    fn test_infinite_interval_rejected() {
        let errors = validation_errors("collector:\n  interval: infinite\n");
        assert!(errors[0].contains("must be finite"));
    }

    #[test]
    fn test_unexpanded_env_var_reported() {
        let err = parse_config("host:\n  journalctl: $env{JC_PARSE_UNSET_VAR}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("JC_PARSE_UNSET_VAR")));
    }

    #[test]
    fn test_unset_var_in_comment_is_ignored() {
        std::env::remove_var("JC_PARSE_COMMENT_VAR");
        let yaml = "# tools may live under $env{JC_PARSE_COMMENT_VAR}\n  # $env{JC_PARSE_COMMENT_VAR}/bin\nunits: [a]\n";
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.units, vec!["a"]);
    }

    #[test]
    fn test_env_var_expanded_into_tool_path() {
        std::env::set_var("JC_PARSE_JOURNALCTL", "/opt/bin/journalctl");
        let config = parse_config("host:\n  journalctl: $env{JC_PARSE_JOURNALCTL}\n").unwrap();
        assert_eq!(config.host.journalctl, "/opt/bin/journalctl");
        std::env::remove_var("JC_PARSE_JOURNALCTL");
    }

    #[test]
    fn test_bad_yaml_is_parse_error() {
        let err = parse_config("units: [unterminated\n").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse(_)));
    }
}
