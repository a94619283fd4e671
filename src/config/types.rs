use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Units whose journals are harvested every cycle.
    #[serde(default = "default_units")]
    pub units: Vec<String>,
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: default_units(),
            detect: DetectConfig::default(),
            host: HostConfig::default(),
            collector: CollectorConfig::default(),
        }
    }
}

fn default_units() -> Vec<String> {
    vec![
        "flocker-container-agent".to_string(),
        "flocker-dataset-agent".to_string(),
        "flocker-control".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Control units checked in priority order; the first active one wins.
    #[serde(default = "default_detect_units")]
    pub units: Vec<String>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            units: default_detect_units(),
        }
    }
}

fn default_detect_units() -> Vec<String> {
    vec![
        "flocker-dataset-agent".to_string(),
        "flocker-control".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Prefix used to reach the host namespace. `null` runs tools directly.
    #[serde(default = "default_bridge")]
    pub bridge: Option<BridgeConfig>,
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
    #[serde(default = "default_journalctl")]
    pub journalctl: String,
    /// Extra environment layered over the collector's own environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bridge: default_bridge(),
            systemctl: default_systemctl(),
            journalctl: default_journalctl(),
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_bridge() -> Option<BridgeConfig> {
    let args = ["run", "-i", "--rm", "-v", "/:/host", "centos:7", "chroot", "/host"];
    Some(BridgeConfig {
        program: PathBuf::from("/usr/bin/docker"),
        args: args.iter().map(|s| s.to_string()).collect(),
    })
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_journalctl() -> String {
    "journalctl".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(with = "duration_format", default = "default_interval")]
    pub interval: Option<Duration>,
    #[serde(with = "duration_format", default = "default_read_timeout")]
    pub read_timeout: Option<Duration>,
    #[serde(with = "duration_format", default = "default_cycle_timeout")]
    pub cycle_timeout: Option<Duration>,
    #[serde(default = "default_require_detection")]
    pub require_detection: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            read_timeout: default_read_timeout(),
            cycle_timeout: default_cycle_timeout(),
            require_detection: default_require_detection(),
        }
    }
}

fn default_interval() -> Option<Duration> {
    Some(Duration::from_secs(10))
}

fn default_read_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_cycle_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_require_detection() -> bool {
    true
}

// Custom serde module for duration parsing
mod duration_format {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&format_duration(*d)),
            None => serializer.serialize_str("infinite"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "infinite" {
            Ok(None)
        } else {
            parse_duration(&s)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty duration string".to_string());
        }

        let (value_str, unit) = if let Some(v) = s.strip_suffix("ms") {
            (v, "ms")
        } else if let Some(v) = s.strip_suffix('s') {
            (v, "s")
        } else if let Some(v) = s.strip_suffix('m') {
            (v, "m")
        } else if let Some(v) = s.strip_suffix('h') {
            (v, "h")
        } else {
            return Err(format!("invalid duration format: {}", s));
        };

        let value: u64 = value_str
            .parse()
            .map_err(|_| format!("invalid numeric value: {}", value_str))?;

        Ok(match unit {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            _ => Duration::from_secs(value * 3600),
        })
    }

    pub(super) fn format_duration(d: Duration) -> String {
        let secs = d.as_secs();
        if d.subsec_millis() != 0 || secs == 0 {
            format!("{}ms", d.as_millis())
        } else if secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}
