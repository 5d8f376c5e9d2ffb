//! Action enum — user intents decoded from key events.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,
    /// Expand/collapse, load children, or run a playback leaf.
    Activate,
    /// Collapse the selected node, or jump to its parent.
    Collapse,
    Quit,
    Noop,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Self {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Action::SelectUp(1),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::SelectDown(1),
            (KeyCode::PageUp, _) => Action::SelectUp(10),
            (KeyCode::PageDown, _) => Action::SelectDown(10),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Action::SelectFirst,
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Action::SelectLast,
            (KeyCode::Enter, _) | (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
                Action::Activate
            }
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Action::Collapse,
            _ => Action::Noop,
        }
    }
}
