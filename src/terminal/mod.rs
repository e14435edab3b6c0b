pub mod backend;

pub use backend::{
    CursorPos, KeyCode, KeyEvent, KeyModifiers, MouseButtonState, MouseEvent, Terminal,
    TerminalEvent, TerminalSize,
};
