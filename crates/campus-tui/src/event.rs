//! Event handling for the campus TUI.
//!
//! Maps keys to application events. Edit mode, entered when a text control
//! is activated, sends printable keys to the control instead.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Focus the next focusable element
    FocusNext,
    /// Focus the previous focusable element
    FocusPrev,
    /// Activate the focused element (or start editing it)
    Activate,
    ShowHelp,
    CycleTheme,
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Leave edit mode or close an overlay
    Cancel,
    /// Character typed while editing
    TextInput(char),
    /// Backspace while editing
    Backspace,
    /// Commit the edited value
    Commit,
    /// No action needed
    None,
}

/// Input handler for converting key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler {
    edit_mode: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self { edit_mode: false }
    }

    /// Set whether text edit mode is active.
    pub fn set_edit_mode(&mut self, active: bool) {
        self.edit_mode = active;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        if key.code == KeyCode::Esc {
            self.edit_mode = false;
            return AppEvent::Cancel;
        }

        if self.edit_mode {
            return self.handle_edit_input(key);
        }
        self.handle_normal_mode(key)
    }

    fn handle_edit_input(&mut self, key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Enter => {
                self.edit_mode = false;
                AppEvent::Commit
            }
            KeyCode::Backspace => AppEvent::Backspace,
            KeyCode::Char(c) => AppEvent::TextInput(c),
            _ => AppEvent::None,
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> AppEvent {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,

            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => AppEvent::ShowHelp,

            KeyCode::Char('t') | KeyCode::Char('T') => AppEvent::CycleTheme,

            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    AppEvent::FocusPrev
                } else {
                    AppEvent::FocusNext
                }
            }
            KeyCode::BackTab => AppEvent::FocusPrev,
            KeyCode::Up | KeyCode::Char('k') => AppEvent::FocusPrev,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::FocusNext,

            KeyCode::Enter | KeyCode::Char(' ') => AppEvent::Activate,

            _ => AppEvent::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_focus_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), AppEvent::FocusNext);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), AppEvent::FocusNext);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), AppEvent::FocusNext);
        assert_eq!(handler.handle_key(key_event(KeyCode::BackTab)), AppEvent::FocusPrev);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Tab, KeyModifiers::SHIFT)),
            AppEvent::FocusPrev
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), AppEvent::FocusPrev);
    }

    #[test]
    fn test_normal_mode_hotkeys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), AppEvent::ShowHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('t'))), AppEvent::CycleTheme);
        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), AppEvent::Activate);
        assert_eq!(handler.handle_key(key_event(KeyCode::F(5))), AppEvent::None);
    }

    #[test]
    fn test_ctrl_c_always_force_quits() {
        let mut handler = InputHandler::new();
        handler.set_edit_mode(true);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
    }

    #[test]
    fn test_edit_mode_sends_text() {
        let mut handler = InputHandler::new();
        handler.set_edit_mode(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::TextInput('q'));
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('t'))), AppEvent::TextInput('t'));
        assert_eq!(handler.handle_key(key_event(KeyCode::Backspace)), AppEvent::Backspace);
        assert!(handler.is_edit_mode());

        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), AppEvent::Commit);
        assert!(!handler.is_edit_mode());
    }

    #[test]
    fn test_escape_leaves_edit_mode() {
        let mut handler = InputHandler::new();
        handler.set_edit_mode(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::Cancel);
        assert!(!handler.is_edit_mode());
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
    }
}
