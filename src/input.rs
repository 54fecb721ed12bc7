//! Key bindings: arrows and vim-style letters.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    SoftDrop,
    HardDrop,
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// Actions that auto-repeat while the key is held.
    pub fn repeats(self) -> bool {
        matches!(self, Self::MoveLeft | Self::MoveRight | Self::SoftDrop)
    }
}

/// Map a key event to an action. Shift is ignored; Ctrl only pauses or quits.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('p') => Action::Pause,
            _ => Action::None,
        };
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k' | 'i') => Action::RotateCw,
        KeyCode::Char('u') => Action::RotateCcw,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Action::HardDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn arrows_and_vim_keys_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(press(KeyCode::Left, none), press(KeyCode::Char('h'), none));
        assert_eq!(press(KeyCode::Right, none), press(KeyCode::Char('l'), none));
        assert_eq!(press(KeyCode::Up, none), press(KeyCode::Char('k'), none));
        assert_eq!(press(KeyCode::Down, none), press(KeyCode::Char('j'), none));
        assert_eq!(press(KeyCode::Char('u'), none), Action::RotateCcw);
        assert_eq!(press(KeyCode::Char(' '), none), Action::HardDrop);
        assert_eq!(press(KeyCode::Char('r'), none), Action::Restart);
    }

    #[test]
    fn modifiers_filter_keys() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(press(KeyCode::Char('h'), KeyModifiers::CONTROL), Action::None);
        assert_eq!(press(KeyCode::Char('h'), KeyModifiers::ALT), Action::None);
        assert_eq!(press(KeyCode::Char('P'), KeyModifiers::SHIFT), Action::None);
        assert_eq!(press(KeyCode::Char('p'), KeyModifiers::SHIFT), Action::Pause);
    }

    #[test]
    fn only_moves_and_soft_drop_repeat() {
        assert!(Action::MoveLeft.repeats());
        assert!(Action::SoftDrop.repeats());
        assert!(!Action::HardDrop.repeats());
        assert!(!Action::RotateCw.repeats());
    }
}
