use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Space: pause or resume every bullet
    TogglePauseAll,
    /// 'n': submit the next line immediately
    SubmitNext,
    /// Left click at a terminal cell
    Click { column: u16, row: u16 },
    /// Pointer moved to a terminal cell
    Hover { column: u16, row: u16 },
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char(' ') => Action::TogglePauseAll,
        KeyCode::Char('n') => Action::SubmitNext,
        _ => Action::None,
    }
}

/// Handle a mouse event and return the corresponding action
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Click { column, row },
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Action::Hover { column, row },
        _ => Action::None,
    }
}
