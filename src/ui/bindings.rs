//! Key table mapping each UI role's keys to controller actions. Built once
//! at startup from the layout, so handlers are never attached twice.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::domain::actions::{Action, ControlAction};
use crate::storage::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Session,
    Toolbar,
    Catalog,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub role: Role,
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: Action,
    pub hint: &'static str,
}

const fn bind(role: Role, key: KeyCode, action: Action, hint: &'static str) -> Binding {
    Binding {
        role,
        key,
        modifiers: KeyModifiers::NONE,
        action,
        hint,
    }
}

const DEFAULT_BINDINGS: &[Binding] = &[
    bind(Role::Session, KeyCode::Char('q'), Action::Quit, "q quit"),
    bind(Role::Session, KeyCode::Esc, Action::DismissAlert, ""),
    bind(Role::Toolbar, KeyCode::Char(' '), Action::TogglePlayPause, "space play/pause"),
    bind(Role::Toolbar, KeyCode::Char('p'), Action::Control(ControlAction::Play), ""),
    bind(Role::Toolbar, KeyCode::Char('P'), Action::Control(ControlAction::Pause), ""),
    bind(Role::Toolbar, KeyCode::Char('s'), Action::Control(ControlAction::Stop), "s stop"),
    bind(Role::Toolbar, KeyCode::Char('n'), Action::Control(ControlAction::Next), "n/b next/prev"),
    bind(Role::Toolbar, KeyCode::Char('b'), Action::Control(ControlAction::Prev), ""),
    bind(Role::Toolbar, KeyCode::Char('+'), Action::Control(ControlAction::VolumeUp), "+/- volume"),
    bind(Role::Toolbar, KeyCode::Char('='), Action::Control(ControlAction::VolumeUp), ""),
    bind(Role::Toolbar, KeyCode::Char('-'), Action::Control(ControlAction::VolumeDown), ""),
    bind(Role::Toolbar, KeyCode::Char('m'), Action::Control(ControlAction::Mute), "m mute"),
    bind(Role::Catalog, KeyCode::Up, Action::SelectPrevious, ""),
    bind(Role::Catalog, KeyCode::Char('k'), Action::SelectPrevious, ""),
    bind(Role::Catalog, KeyCode::Down, Action::SelectNext, ""),
    bind(Role::Catalog, KeyCode::Char('j'), Action::SelectNext, ""),
    bind(Role::Catalog, KeyCode::Enter, Action::PlaySelected, "enter play video"),
    bind(Role::Catalog, KeyCode::Char('/'), Action::OpenFilter, "/ filter"),
    bind(Role::Catalog, KeyCode::Char('r'), Action::RefreshCatalog, "r rescan"),
    bind(Role::Preview, KeyCode::Char('v'), Action::TogglePreview, "v preview"),
    bind(Role::Preview, KeyCode::Char(']'), Action::PreviewVolumeUp, "[/] preview vol"),
    bind(Role::Preview, KeyCode::Char('['), Action::PreviewVolumeDown, ""),
];

#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    /// Keeps only the bindings whose role is part of the layout.
    pub fn new(layout: &LayoutConfig) -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter(|binding| match binding.role {
                Role::Session | Role::Toolbar => true,
                Role::Catalog => layout.catalog,
                Role::Preview => layout.preview,
            })
            .copied()
            .collect();
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.bindings.iter().any(|binding| binding.role == role)
    }

    pub fn resolve(&self, key: KeyEvent) -> Option<Action> {
        // Shifted characters arrive with SHIFT set; the char itself carries the case.
        let modifiers = key.modifiers.difference(KeyModifiers::SHIFT);
        self.bindings
            .iter()
            .find(|binding| binding.key == key.code && binding.modifiers == modifiers)
            .map(|binding| binding.action)
    }

    pub fn help_line(&self) -> String {
        self.bindings
            .iter()
            .filter(|binding| !binding.hint.is_empty())
            .map(|binding| binding.hint)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn no_key_is_bound_twice() {
        let table = BindingTable::default();
        let mut seen = HashSet::new();
        for binding in table.bindings() {
            assert!(
                seen.insert((binding.key, binding.modifiers)),
                "duplicate binding for {:?}",
                binding.key
            );
        }
    }

    #[test]
    fn shifted_letters_resolve_by_case() {
        let table = BindingTable::default();
        assert_eq!(
            table.resolve(KeyEvent::new(KeyCode::Char('P'), KeyModifiers::SHIFT)),
            Some(Action::Control(ControlAction::Pause))
        );
        assert_eq!(
            table.resolve(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE)),
            Some(Action::Control(ControlAction::Play))
        );
    }

    #[test]
    fn absent_roles_have_no_bindings() {
        let table = BindingTable::new(&LayoutConfig {
            catalog: true,
            preview: false,
        });
        assert!(!table.has_role(Role::Preview));
        assert_eq!(
            table.resolve(KeyEvent::new(KeyCode::Char('v'), KeyModifiers::NONE)),
            None
        );
        assert!(!table.help_line().contains("preview"));
    }
}
