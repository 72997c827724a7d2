use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::integrations::remote::RemoteEndpoints;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_500;
const DEFAULT_SETTLE_MS: u64 = 200;
const MIN_POLL_INTERVAL_MS: u64 = 250;
const DEFAULT_PLAYER: &str = "vlc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub settle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    pub player: String,
}

/// Which UI roles the terminal layout includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub catalog: bool,
    pub preview: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            catalog: true,
            preview: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub preferences_path: PathBuf,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub poll: PollConfig,
    pub endpoints: RemoteEndpoints,
    pub preview: PreviewConfig,
    pub layout: LayoutConfig,
    pub storage: StorageConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
            },
            poll: PollConfig {
                interval_ms: DEFAULT_POLL_INTERVAL_MS,
                settle_ms: DEFAULT_SETTLE_MS,
            },
            endpoints: RemoteEndpoints::default(),
            preview: PreviewConfig {
                player: DEFAULT_PLAYER.to_string(),
            },
            layout: LayoutConfig::default(),
            storage: StorageConfig {
                preferences_path: config_dir().join("preferences.json"),
                log_path: config_dir().join("avp-remote.log"),
            },
        }
    }
}

fn config_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config/avp-remote")
}

impl RuntimeConfig {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.server.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.poll.settle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(anyhow!(
                "poll interval {}ms is too short (minimum {MIN_POLL_INTERVAL_MS}ms)",
                self.poll.interval_ms
            ));
        }
        if self.server.timeout_ms == 0 {
            return Err(anyhow!("request timeout must be greater than zero"));
        }
        if self.endpoints.play_key.trim().is_empty() {
            return Err(anyhow!("catalog play_key cannot be empty"));
        }
        Ok(())
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        self.merge_toml_text(&content)
            .with_context(|| format!("failed parsing config TOML: {}", path.display()))
    }

    fn merge_toml_text(&mut self, content: &str) -> Result<()> {
        let mut section = String::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(anyhow!("line {}: invalid section syntax", idx + 1));
                }
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let (key, value_raw) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected key=value", idx + 1))?;
            let key = key.trim();
            let value = parse_value(value_raw.trim())
                .with_context(|| format!("line {}: invalid value", idx + 1))?;

            self.apply_file_value(&section, key, value)
                .with_context(|| format!("line {}: [{section}] {key}", idx + 1))?;
        }

        Ok(())
    }

    fn apply_file_value(&mut self, section: &str, key: &str, value: TomlValue) -> Result<()> {
        match (section, key) {
            ("server", "base_url") => self.server.base_url = value.into_string()?,
            ("server", "timeout_ms") => self.server.timeout_ms = value.as_u64()?,
            ("poll", "interval_ms") => self.poll.interval_ms = value.as_u64()?,
            ("poll", "settle_ms") => self.poll.settle_ms = value.as_u64()?,
            ("catalog", "path") => self.endpoints.catalog_path = value.into_string()?,
            ("catalog", "refresh_path") => self.endpoints.refresh_path = value.into_string()?,
            ("catalog", "play_path") => self.endpoints.play_path = value.into_string()?,
            ("catalog", "play_key") => self.endpoints.play_key = value.into_string()?,
            ("catalog", "thumbnail_prefix") => {
                self.endpoints.thumbnail_prefix = value.into_string()?
            }
            ("preview", "player") => self.preview.player = value.into_string()?,
            ("layout", "catalog") => self.layout.catalog = value.as_bool()?,
            ("layout", "preview") => self.layout.preview = value.as_bool()?,
            ("storage", "preferences_path") => {
                self.storage.preferences_path = PathBuf::from(value.into_string()?)
            }
            ("logging", "path") => self.storage.log_path = PathBuf::from(value.into_string()?),
            _ => {}
        }

        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        if let Ok(base_url) = env::var("AVP_REMOTE_BASE_URL") {
            self.server.base_url = base_url;
        }
        if let Ok(timeout_ms) = env::var("AVP_REMOTE_TIMEOUT_MS") {
            self.server.timeout_ms = timeout_ms
                .parse::<u64>()
                .with_context(|| "invalid AVP_REMOTE_TIMEOUT_MS".to_string())?;
        }
        if let Ok(interval_ms) = env::var("AVP_REMOTE_POLL_INTERVAL_MS") {
            self.poll.interval_ms = interval_ms
                .parse::<u64>()
                .with_context(|| "invalid AVP_REMOTE_POLL_INTERVAL_MS".to_string())?;
        }
        if let Ok(play_key) = env::var("AVP_REMOTE_PLAY_KEY") {
            self.endpoints.play_key = play_key;
        }
        if let Ok(play_path) = env::var("AVP_REMOTE_PLAY_PATH") {
            self.endpoints.play_path = play_path;
        }
        if let Ok(player) = env::var("AVP_REMOTE_PREVIEW_PLAYER") {
            self.preview.player = player;
        }
        if let Ok(path) = env::var("AVP_REMOTE_PREFERENCES_PATH") {
            self.storage.preferences_path = PathBuf::from(path);
        }

        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..idx],
            _ => {}
        }
    }
    line
}

#[derive(Debug, Clone)]
enum TomlValue {
    String(String),
    Integer(u64),
    Bool(bool),
}

impl TomlValue {
    fn into_string(self) -> Result<String> {
        match self {
            Self::String(value) => Ok(value),
            _ => Err(anyhow!("expected string value")),
        }
    }

    fn as_u64(&self) -> Result<u64> {
        match self {
            Self::Integer(value) => Ok(*value),
            _ => Err(anyhow!("expected integer value")),
        }
    }

    fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            _ => Err(anyhow!("expected boolean value")),
        }
    }
}

fn parse_value(value: &str) -> Result<TomlValue> {
    let trimmed = value.trim();
    if trimmed.starts_with('"') {
        if !trimmed.ends_with('"') || trimmed.len() < 2 {
            return Err(anyhow!("unterminated string"));
        }
        return Ok(TomlValue::String(trimmed[1..trimmed.len() - 1].to_string()));
    }

    match trimmed {
        "true" => return Ok(TomlValue::Bool(true)),
        "false" => return Ok(TomlValue::Bool(false)),
        _ => {}
    }

    if let Ok(number) = trimmed.parse::<u64>() {
        return Ok(TomlValue::Integer(number));
    }

    Ok(TomlValue::String(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_section() {
        let mut config = RuntimeConfig::default();
        config
            .merge_toml_text(
                r#"
                    [server]
                    base_url = "http://pi.local:8080"  # player box
                    timeout_ms = 5000

                    [poll]
                    interval_ms = 2500
                    settle_ms = 300

                    [catalog]
                    play_path = "/play-video"
                    play_key = "video"

                    [preview]
                    player = "/usr/bin/cvlc"

                    [layout]
                    preview = false
                "#,
            )
            .expect("merge config text");

        assert_eq!(config.server.base_url, "http://pi.local:8080");
        assert_eq!(config.server.timeout_ms, 5000);
        assert_eq!(config.poll.interval_ms, 2500);
        assert_eq!(config.poll.settle_ms, 300);
        assert_eq!(config.endpoints.play_path, "/play-video");
        assert_eq!(config.endpoints.play_key, "video");
        assert_eq!(config.endpoints.catalog_path, "/control/videos");
        assert_eq!(config.preview.player, "/usr/bin/cvlc");
        assert!(config.layout.catalog);
        assert!(!config.layout.preview);
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .merge_toml_text(
                r#"
                    [layout]
                    catalog = "yes"
                "#,
            )
            .expect_err("string for a boolean should fail");
        assert!(format!("{err:#}").contains("expected boolean value"));
    }

    #[test]
    fn too_short_poll_interval_is_rejected() {
        let mut config = RuntimeConfig::default();
        config.poll.interval_ms = 10;
        let err = config.validate().expect_err("10ms is too short");
        assert!(err.to_string().contains("too short"));
    }
}
