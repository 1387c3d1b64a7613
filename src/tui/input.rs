use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// App-level intents decoded from key events. Keys without an app-level
/// meaning are forwarded to the interaction surface as key-press gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleMode,
    UndoDay,
    ResetDays,
    ZoomIn,
    ZoomOut,
    ToggleHelp,
    OpenSettings,
    Forward(KeyCode),
}

pub fn action_for_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab | KeyCode::Char('m') => Action::ToggleMode,
        KeyCode::Char('u') => Action::UndoDay,
        KeyCode::Char('r') => Action::ResetDays,
        KeyCode::Char('+') => Action::ZoomIn,
        KeyCode::Char('=') if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('s') => Action::OpenSettings,
        code => Action::Forward(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn mode_and_simulation_keys_decode() {
        assert_eq!(action_for_key(key(KeyCode::Tab)), Action::ToggleMode);
        assert_eq!(action_for_key(key(KeyCode::Char('m'))), Action::ToggleMode);
        assert_eq!(action_for_key(key(KeyCode::Char('u'))), Action::UndoDay);
        assert_eq!(action_for_key(key(KeyCode::Char('r'))), Action::ResetDays);
    }

    #[test]
    fn unmapped_keys_are_forwarded_to_the_surface() {
        assert_eq!(
            action_for_key(key(KeyCode::Delete)),
            Action::Forward(KeyCode::Delete)
        );
        assert_eq!(
            action_for_key(key(KeyCode::Char('x'))),
            Action::Forward(KeyCode::Char('x'))
        );
    }
}
