use crate::domain::models::PreviewStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewPhase {
    #[default]
    Disabled,
    Enabling,
    Enabled,
    Disabling,
}

impl PreviewPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "off",
            Self::Enabling => "enabling…",
            Self::Enabled => "live",
            Self::Disabling => "stopping…",
        }
    }
}

/// Visible state of the preview panel: checkbox, container and source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewPanel {
    phase: PreviewPhase,
    checked: bool,
    container_visible: bool,
    source: Option<String>,
}

impl PreviewPanel {
    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn container_visible(&self) -> bool {
        self.container_visible
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Mirrors the server's preview state at load time.
    pub fn sync(&mut self, status: &PreviewStatus) {
        if status.enabled {
            self.phase = PreviewPhase::Enabled;
            self.checked = true;
            self.container_visible = true;
            self.source = status.index_url.clone();
        } else {
            *self = Self::default();
        }
    }

    /// Returns false when the toggle is not allowed from the current phase.
    pub fn begin_enable(&mut self) -> bool {
        if self.phase != PreviewPhase::Disabled {
            return false;
        }
        self.phase = PreviewPhase::Enabling;
        self.checked = true;
        true
    }

    pub fn enable_succeeded(&mut self, source: Option<String>) {
        self.phase = PreviewPhase::Enabled;
        self.checked = true;
        self.container_visible = true;
        self.source = source;
    }

    pub fn enable_failed(&mut self) {
        *self = Self::default();
    }

    pub fn begin_disable(&mut self) -> bool {
        if self.phase != PreviewPhase::Enabled {
            return false;
        }
        self.phase = PreviewPhase::Disabling;
        self.checked = false;
        self.source = None;
        true
    }

    pub fn finish_disable(&mut self) {
        *self = Self::default();
    }

    /// Attach failure after the server already enabled the preview.
    pub fn clear_source(&mut self) {
        self.source = None;
    }
}
