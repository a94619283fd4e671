pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use parse::{load_config, ConfigError};
pub use types::{BridgeConfig, CollectorConfig, Config, DetectConfig, HostConfig};

const USER_CONFIG: &str = ".config/journald-collector/config.yml";
const SYSTEM_CONFIG: &str = "/etc/journald-collector/config.yml";

pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Expands environment variables in a string.
/// Supports $env{VAR_NAME} syntax.
/// If an environment variable is not set, it's left unchanged.
pub fn expand_env_vars(text: &str) -> String {
    env_var_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
}

/// Expands tilde (~) in paths to the user's home directory.
/// Returns the path unchanged if it doesn't start with tilde or home directory cannot be determined.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    } else if path_str == "~" {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir;
        }
    }

    path.to_path_buf()
}

/// Resolves the config file path based on explicit argument or default locations.
/// Returns the first existing path from:
/// 1. Explicit path (if provided, with tilde expansion)
/// 2. ~/.config/journald-collector/config.yml
/// 3. /etc/journald-collector/config.yml
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    if let Some(home_dir) = dirs::home_dir() {
        let user_config = home_dir.join(USER_CONFIG);
        if user_config.exists() {
            return Some(user_config);
        }
    }

    let system_config = PathBuf::from(SYSTEM_CONFIG);
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Location `config init` writes to when not printing to stdout.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_CONFIG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_single() {
        std::env::set_var("JC_TEST_VAR", "test_value");
        let result = expand_env_vars("path/$env{JC_TEST_VAR}/file");
        assert_eq!(result, "path/test_value/file");
        std::env::remove_var("JC_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_unset() {
        let result = expand_env_vars("path/$env{JC_NONEXISTENT_VAR}/file");
        assert_eq!(result, "path/$env{JC_NONEXISTENT_VAR}/file");
    }

    #[test]
    fn test_expand_env_vars_ignores_shell_syntax() {
        let result = expand_env_vars("${HOME}:$PATH");
        assert_eq!(result, "${HOME}:$PATH");
    }

    #[test]
    fn test_expand_tilde_with_path() {
        let expanded = expand_tilde(Path::new("~/bin/docker"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("bin/docker"));
        }
    }

    #[test]
    fn test_expand_tilde_no_expansion() {
        let expanded = expand_tilde(Path::new("/usr/bin/docker"));
        assert_eq!(expanded, Path::new("/usr/bin/docker"));
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        let resolved = resolve_config_path(Some(Path::new("/tmp/explicit.yml")));
        assert_eq!(resolved, Some(PathBuf::from("/tmp/explicit.yml")));
    }
}
