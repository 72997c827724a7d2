use anyhow::{anyhow, Result};

/// Player control endpoints under `/control/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Play,
    Pause,
    Next,
    Prev,
    VolumeUp,
    VolumeDown,
    Stop,
    Mute,
}

impl ControlAction {
    pub const ALL: [ControlAction; 8] = [
        Self::Play,
        Self::Pause,
        Self::Next,
        Self::Prev,
        Self::VolumeUp,
        Self::VolumeDown,
        Self::Stop,
        Self::Mute,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::VolumeUp => "vol_up",
            Self::VolumeDown => "vol_down",
            Self::Stop => "stop",
            Self::Mute => "mute",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Prev),
            "vol_up" | "volup" | "volume-up" => Ok(Self::VolumeUp),
            "vol_down" | "voldown" | "volume-down" => Ok(Self::VolumeDown),
            "stop" => Ok(Self::Stop),
            "mute" => Ok(Self::Mute),
            _ => Err(anyhow!(
                "unknown control action '{value}' (expected play, pause, next, prev, vol_up, vol_down, stop, mute)"
            )),
        }
    }
}

/// Everything a UI gesture can ask the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Control(ControlAction),
    TogglePlayPause,
    PlaySelected,
    SelectNext,
    SelectPrevious,
    RefreshCatalog,
    OpenFilter,
    TogglePreview,
    PreviewVolumeUp,
    PreviewVolumeDown,
    DismissAlert,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_endpoint_names() {
        for action in ControlAction::ALL {
            assert_eq!(
                ControlAction::parse(action.endpoint()).expect("parse endpoint"),
                action
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_action() {
        let err = ControlAction::parse("rewind").expect_err("rewind is not supported");
        assert!(err.to_string().contains("unknown control action"));
    }
}
