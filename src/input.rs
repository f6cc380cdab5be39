//! Key bindings: arrows, vim (hjkl) and wasd.

use crate::direction::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    Pause,
    Quit,
    Confirm,
    Restart,
    /// Digit typed into the threshold field.
    Digit(char),
    Backspace,
    None,
}

/// Map key event to action. Ctrl+C always quits.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Up | KeyCode::Char('k' | 'w' | 'K' | 'W') => Action::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 's' | 'J' | 'S') => Action::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('h' | 'a' | 'H' | 'A') => Action::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'd' | 'L' | 'D') => Action::Turn(Direction::Right),
        KeyCode::Char(' ' | 'p' | 'P') => Action::Pause,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char(c) if c.is_ascii_digit() => Action::Digit(c),
        KeyCode::Backspace => Action::Backspace,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_all_three_layouts_turn() {
        for code in [KeyCode::Up, KeyCode::Char('k'), KeyCode::Char('w')] {
            assert_eq!(key_to_action(key(code)), Action::Turn(Direction::Up));
        }
        for code in [KeyCode::Left, KeyCode::Char('h'), KeyCode::Char('a')] {
            assert_eq!(key_to_action(key(code)), Action::Turn(Direction::Left));
        }
        assert_eq!(
            key_to_action(key(KeyCode::Char('s'))),
            Action::Turn(Direction::Down)
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('l'))),
            Action::Turn(Direction::Right)
        );
    }

    #[test]
    fn test_pause_and_quit_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_digits_and_editing() {
        assert_eq!(key_to_action(key(KeyCode::Char('7'))), Action::Digit('7'));
        assert_eq!(key_to_action(key(KeyCode::Backspace)), Action::Backspace);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Confirm);
    }

    #[test]
    fn test_alt_chords_ignored() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::ALT)),
            Action::None
        );
    }
}
