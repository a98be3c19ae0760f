use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use msgscope_core::Severity;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Console,
    Overlay,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::CloseOverlay);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::ctrl(KeyCode::Char('q')), Action::TogglePanel);
        bindings.insert(KeyContext::Global, global);

        // Message list bindings
        let mut console = HashMap::new();
        // Severity toggles
        for (key, severity) in ['1', '2', '3', '4'].into_iter().zip(Severity::RETAINED) {
            console.insert(
                KeyBinding::new(KeyCode::Char(key)),
                Action::ToggleSeverity(severity),
            );
        }
        // Selection
        console.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectDown(1));
        console.insert(KeyBinding::new(KeyCode::Down), Action::SelectDown(1));
        console.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectUp(1));
        console.insert(KeyBinding::new(KeyCode::Up), Action::SelectUp(1));
        console.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        console.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        console.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        console.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        console.insert(KeyBinding::new(KeyCode::Char('g')), Action::SelectFirst);
        console.insert(KeyBinding::shift(KeyCode::Char('G')), Action::SelectLast);
        console.insert(KeyBinding::new(KeyCode::Home), Action::SelectFirst);
        console.insert(KeyBinding::new(KeyCode::End), Action::SelectLast);
        // Entry actions
        console.insert(KeyBinding::new(KeyCode::Enter), Action::Inspect);
        console.insert(KeyBinding::new(KeyCode::Char('d')), Action::RemoveSelected);
        console.insert(KeyBinding::new(KeyCode::Delete), Action::RemoveSelected);
        console.insert(KeyBinding::new(KeyCode::Char('y')), Action::CopySelected);
        // Display
        console.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFollow);
        console.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleStats);
        console.insert(KeyBinding::new(KeyCode::Char('h')), Action::TogglePanel);
        bindings.insert(KeyContext::Console, console);

        // Overlay bindings (help or detail open)
        let mut overlay = HashMap::new();
        overlay.insert(KeyBinding::new(KeyCode::Enter), Action::CloseOverlay);
        overlay.insert(KeyBinding::new(KeyCode::Char('q')), Action::CloseOverlay);
        overlay.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectDown(1));
        overlay.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectUp(1));
        overlay.insert(KeyBinding::new(KeyCode::Down), Action::SelectDown(1));
        overlay.insert(KeyBinding::new(KeyCode::Up), Action::SelectUp(1));
        overlay.insert(KeyBinding::new(KeyCode::Char('y')), Action::CopySelected);
        bindings.insert(KeyContext::Overlay, overlay);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_number_keys_toggle_severities() {
        let bindings = KeyBindings::new();
        let expected = [
            ('1', Severity::Debug),
            ('2', Severity::Info),
            ('3', Severity::Warning),
            ('4', Severity::Critical),
        ];
        for (c, severity) in expected {
            assert_eq!(
                bindings.get_action(KeyContext::Console, &key(KeyCode::Char(c), KeyModifiers::NONE)),
                Some(Action::ToggleSeverity(severity))
            );
        }
    }

    #[test]
    fn test_global_fallback() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::Console, &key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            bindings.get_action(KeyContext::Console, &key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::TogglePanel)
        );
    }

    #[test]
    fn test_overlay_shadows_console_keys() {
        let bindings = KeyBindings::new();
        let q = key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(KeyContext::Console, &q), Some(Action::Quit));
        assert_eq!(bindings.get_action(KeyContext::Overlay, &q), Some(Action::CloseOverlay));

        // Copy works from the list and from the detail overlay
        let y = key(KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(KeyContext::Console, &y), Some(Action::CopySelected));
        assert_eq!(bindings.get_action(KeyContext::Overlay, &y), Some(Action::CopySelected));

        // Removal is not reachable while an overlay is open
        let d = key(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(KeyContext::Overlay, &d), None);
    }
}
