use crate::domain::models::{PlayerState, PlayerStatus};

pub const TITLE_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Active,
    Waiting,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateBadge {
    pub icon: &'static str,
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl StateBadge {
    pub fn for_state(state: PlayerState) -> Self {
        let (icon, tone) = match state {
            PlayerState::Idle => ("●", BadgeTone::Neutral),
            PlayerState::Opening | PlayerState::Buffering => ("◌", BadgeTone::Waiting),
            PlayerState::Playing => ("▶", BadgeTone::Active),
            PlayerState::Paused => ("⏸", BadgeTone::Warning),
            PlayerState::Stopped => ("■", BadgeTone::Neutral),
            PlayerState::Ended => ("✔", BadgeTone::Neutral),
            PlayerState::Error => ("⚠", BadgeTone::Error),
        };

        Self {
            icon,
            label: state.label(),
            tone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTier {
    Muted,
    Off,
    Low,
    Medium,
    High,
}

impl VolumeTier {
    pub fn from_level(volume: u8, muted: bool) -> Self {
        if muted {
            return Self::Muted;
        }
        match volume {
            0 => Self::Off,
            1..=30 => Self::Low,
            31..=70 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Muted => "🔇",
            Self::Off => "○",
            Self::Low => "🔈",
            Self::Medium => "🔉",
            Self::High => "🔊",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeIndicator {
    pub tier: VolumeTier,
    pub text: String,
}

impl VolumeIndicator {
    pub fn new(volume: u8, muted: bool) -> Self {
        let text = if muted {
            "muted".to_string()
        } else {
            format!("{}%", volume.min(100))
        };
        Self {
            tier: VolumeTier::from_level(volume, muted),
            text,
        }
    }
}

/// What the play/pause button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseButton {
    Play,
    Pause,
}

impl PlayPauseButton {
    pub fn for_state(state: PlayerState) -> Self {
        if state == PlayerState::Playing {
            Self::Pause
        } else {
            Self::Play
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
        }
    }
}

pub fn title_text(status: Option<&PlayerStatus>) -> &str {
    status
        .and_then(|s| s.current_name.as_deref())
        .unwrap_or(TITLE_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_error_uses_error_tone() {
        for state in PlayerState::ALL {
            let badge = StateBadge::for_state(state);
            assert_eq!(badge.tone == BadgeTone::Error, state == PlayerState::Error);
            assert_eq!(badge.label, state.label());
        }
    }

    #[test]
    fn button_offers_pause_only_while_playing() {
        assert_eq!(
            PlayPauseButton::for_state(PlayerState::Playing),
            PlayPauseButton::Pause
        );
        assert_eq!(
            PlayPauseButton::for_state(PlayerState::Buffering),
            PlayPauseButton::Play
        );
    }

    #[test]
    fn volume_tiers_step_at_boundaries() {
        let cases = [
            (0, VolumeTier::Off),
            (1, VolumeTier::Low),
            (30, VolumeTier::Low),
            (31, VolumeTier::Medium),
            (70, VolumeTier::Medium),
            (71, VolumeTier::High),
            (100, VolumeTier::High),
        ];
        for (volume, tier) in cases {
            assert_eq!(VolumeTier::from_level(volume, false), tier, "volume {volume}");
        }
    }

    #[test]
    fn muted_wins_at_any_level() {
        for volume in [0, 1, 50, 100] {
            let indicator = VolumeIndicator::new(volume, true);
            assert_eq!(indicator.tier, VolumeTier::Muted);
            assert_eq!(indicator.text, "muted");
        }
    }

    #[test]
    fn every_tier_has_its_own_icon() {
        let icons: std::collections::HashSet<&str> = [
            VolumeTier::Muted,
            VolumeTier::Off,
            VolumeTier::Low,
            VolumeTier::Medium,
            VolumeTier::High,
        ]
        .into_iter()
        .map(VolumeTier::icon)
        .collect();
        assert_eq!(icons.len(), 5);
    }
}
