use crate::config::generate::generate_starter_config;
use std::fs;
use std::path::{Path, PathBuf};

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = crate::config::user_config_path()
        .unwrap_or_else(|| PathBuf::from("/etc/journald-collector/config.yml"));
    write_config(&config_content, &config_path)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Writes a config file, refusing to overwrite an existing one.
pub fn write_config(config_content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!(
            "config file already exists at {}; remove it first or use --stdout",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config_content)?;
    Ok(())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(config) => {
            println!("✓ Config is valid ({} units)", config.units.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Config validation failed:\n{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_config_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/config.yml");

        write_config("units: [a]\n", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "units: [a]\n");
    }

    #[test]
    fn test_write_config_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "original").unwrap();

        assert!(write_config("units: [a]\n", &path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }
}
