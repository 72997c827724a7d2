use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    #[default]
    Idle,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

impl PlayerState {
    pub const ALL: [PlayerState; 8] = [
        Self::Idle,
        Self::Opening,
        Self::Buffering,
        Self::Playing,
        Self::Paused,
        Self::Stopped,
        Self::Ended,
        Self::Error,
    ];

    /// Unknown or empty values fall back to `Idle`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "opening" => Self::Opening,
            "buffering" => Self::Buffering,
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            "ended" => Self::Ended,
            "error" => Self::Error,
            _ => Self::Idle,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Buffering => "buffering",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Ended => "ended",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub current_name: Option<String>,
    pub volume: u8,
    pub muted: bool,
}

impl PlayerStatus {
    /// Reads a `/status` body without ever failing; absent or mistyped
    /// fields take their defaults.
    pub fn from_json(value: &Value) -> Self {
        let state = value
            .get("state")
            .and_then(Value::as_str)
            .map(PlayerState::parse)
            .unwrap_or_default();

        let current_name = ["current_name", "current", "loaded_name"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(ToString::to_string);

        let volume = value
            .get("volume")
            .and_then(Value::as_f64)
            .map(|v| v.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        let muted = value.get("muted").and_then(Value::as_bool).unwrap_or(false);

        Self {
            state,
            current_name,
            volume,
            muted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogResponse {
    pub ok: bool,
    pub items: Vec<CatalogItem>,
}

impl CatalogResponse {
    pub fn from_json(value: &Value) -> Self {
        let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(false);
        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("name").and_then(Value::as_str))
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| CatalogItem {
                        name: name.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { ok, items }
    }

    /// Items to render; a response flagged `ok: false` renders nothing.
    pub fn into_items(self) -> Vec<CatalogItem> {
        if self.ok {
            self.items
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewStatus {
    pub enabled: bool,
    pub index_url: Option<String>,
}

impl PreviewStatus {
    /// Accepts the bare object or the `{ ok, preview: {...} }` envelope.
    pub fn from_json(value: &Value) -> Self {
        let inner = value.get("preview").unwrap_or(value);
        let enabled = inner
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let index_url = inner
            .get("index_url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToString::to_string);

        Self { enabled, index_url }
    }

    pub fn stream_url(&self) -> Option<&str> {
        if self.enabled {
            self.index_url.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_prefers_current_name_then_falls_back() {
        let status = PlayerStatus::from_json(&json!({
            "state": "paused",
            "current": "old-key.mp4",
            "loaded_name": "loaded.mp4",
            "volume": 140,
        }));
        assert_eq!(status.state, PlayerState::Paused);
        assert_eq!(status.current_name.as_deref(), Some("old-key.mp4"));
        assert_eq!(status.volume, 100);
        assert!(!status.muted);
    }

    #[test]
    fn null_body_reads_as_idle_snapshot() {
        let status = PlayerStatus::from_json(&Value::Null);
        assert_eq!(status, PlayerStatus::default());
    }

    #[test]
    fn unknown_state_reads_as_idle() {
        let status = PlayerStatus::from_json(&json!({ "state": "unknown" }));
        assert_eq!(status.state, PlayerState::Idle);
    }

    #[test]
    fn catalog_not_ok_renders_nothing() {
        let response = CatalogResponse::from_json(&json!({
            "ok": false,
            "items": [{ "name": "a.mp4" }],
        }));
        assert!(response.into_items().is_empty());
    }

    #[test]
    fn preview_status_unwraps_envelope() {
        let status = PreviewStatus::from_json(&json!({
            "ok": true,
            "preview": { "enabled": true, "index_url": "/hls/index.m3u8" },
        }));
        assert!(status.enabled);
        assert_eq!(status.stream_url(), Some("/hls/index.m3u8"));

        let disabled = PreviewStatus::from_json(&json!({ "enabled": false, "index_url": "/x" }));
        assert_eq!(disabled.stream_url(), None);
    }
}
