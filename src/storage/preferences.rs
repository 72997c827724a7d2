use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PREVIEW_VOLUME: u8 = 80;

/// Client-only settings; nothing here is ever sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPreferences {
    #[serde(
        rename = "preview.volume",
        default = "default_preview_volume",
        deserialize_with = "clamped_volume"
    )]
    pub preview_volume: u8,
}

fn default_preview_volume() -> u8 {
    DEFAULT_PREVIEW_VOLUME
}

fn clamped_volume<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64::deserialize(deserializer)?;
    Ok(value.min(100) as u8)
}

impl Default for LocalPreferences {
    fn default() -> Self {
        Self {
            preview_volume: DEFAULT_PREVIEW_VOLUME,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<LocalPreferences> {
        if !self.path.exists() {
            return Ok(LocalPreferences::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read preferences file: {}", self.path.display()))?;
        serde_json::from_str(&content).with_context(|| {
            format!("failed to parse preferences file: {}", self.path.display())
        })
    }

    pub fn save(&self, prefs: &LocalPreferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create preferences directory: {}", parent.display())
            })?;
        }

        let body =
            serde_json::to_string_pretty(prefs).context("failed to serialize preferences")?;
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write preferences file: {}", self.path.display()))?;

        Ok(())
    }
}
