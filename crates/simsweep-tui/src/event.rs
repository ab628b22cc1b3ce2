//! Event handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key action that can be performed in the TUI.
///
/// Actions are interpreted by whichever screen or overlay has focus; `Open`
/// opens the picker on the settings screen and toggles a node inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    JumpToTop,
    JumpToBottom,
    PageUp,
    PageDown,
    NextGroup,
    PrevGroup,

    // Picker and selection
    Open,
    /// Add the highlighted directory, or grab a tile (Space).
    Select,
    Add,
    TypePath,
    Remove,

    // Scan settings
    NextAlgorithm,
    IncreaseSimilarity,
    DecreaseSimilarity,

    // Results
    Refresh,
    NewScan,

    // Confirmation
    Confirm,
    Cancel,

    // UI toggles
    ToggleHelp,
    ToggleTheme,

    // Application
    Quit,
    ForceQuit,

    None,
}

impl KeyAction {
    /// Convert a key event to an action.
    pub fn from_key_event(event: KeyEvent) -> Self {
        match (event.code, event.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::ForceQuit,

            (KeyCode::Esc, _) => KeyAction::Cancel,
            (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::Cancel,

            // Navigation - vim style
            (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::MoveDown,
            (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::MoveUp,
            (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::MoveLeft,
            (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::MoveRight,

            // Navigation - arrow keys
            (KeyCode::Down, _) => KeyAction::MoveDown,
            (KeyCode::Up, _) => KeyAction::MoveUp,
            (KeyCode::Left, _) => KeyAction::MoveLeft,
            (KeyCode::Right, _) => KeyAction::MoveRight,

            // Jump
            (KeyCode::Char('g'), KeyModifiers::NONE) => KeyAction::JumpToTop,
            (KeyCode::Char('G'), KeyModifiers::SHIFT) => KeyAction::JumpToBottom,
            (KeyCode::Home, _) => KeyAction::JumpToTop,
            (KeyCode::End, _) => KeyAction::JumpToBottom,

            // Page navigation
            (KeyCode::PageUp, _) => KeyAction::PageUp,
            (KeyCode::PageDown, _) => KeyAction::PageDown,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => KeyAction::PageUp,
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => KeyAction::PageDown,

            // Group jumps
            (KeyCode::Char(']'), KeyModifiers::NONE) => KeyAction::NextGroup,
            (KeyCode::Char('['), KeyModifiers::NONE) => KeyAction::PrevGroup,

            // Picker and selection
            (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
            (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::Select,
            (KeyCode::Char('a'), KeyModifiers::NONE) => KeyAction::Add,
            (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::TypePath,
            (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Remove,
            (KeyCode::Delete, _) => KeyAction::Remove,

            // Scan settings
            (KeyCode::Tab, KeyModifiers::NONE) => KeyAction::NextAlgorithm,
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), KeyModifiers::NONE) => {
                KeyAction::IncreaseSimilarity
            }
            (KeyCode::Char('-'), KeyModifiers::NONE) => KeyAction::DecreaseSimilarity,

            // Results
            (KeyCode::Char('R'), KeyModifiers::SHIFT) => KeyAction::Refresh,
            (KeyCode::Char('N'), KeyModifiers::SHIFT) => KeyAction::NewScan,

            (KeyCode::Enter, _) => KeyAction::Confirm,

            // UI toggles
            (KeyCode::Char('?'), _) => KeyAction::ToggleHelp,
            (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::ToggleTheme,

            _ => KeyAction::None,
        }
    }
}

/// A section of key bindings for the help display.
pub struct HelpSection {
    pub title: &'static str,
    pub bindings: Vec<KeyBinding>,
}

/// Key binding for display in help.
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Get all key bindings organized by section for help display.
pub fn get_help_sections() -> Vec<HelpSection> {
    vec![
        HelpSection {
            title: "Settings",
            bindings: vec![
                KeyBinding { keys: "o", description: "Open directory picker" },
                KeyBinding { keys: "i", description: "Type a directory path" },
                KeyBinding { keys: "j/k ↑/↓", description: "Move through selection" },
                KeyBinding { keys: "d/Del", description: "Remove directory" },
                KeyBinding { keys: "Tab", description: "Next hash algorithm" },
                KeyBinding { keys: "+/-", description: "Adjust similarity" },
                KeyBinding { keys: "Enter", description: "Start scan" },
            ],
        },
        HelpSection {
            title: "Directory Picker",
            bindings: vec![
                KeyBinding { keys: "j/k ↑/↓", description: "Move up/down" },
                KeyBinding { keys: "l/→", description: "Expand directory" },
                KeyBinding { keys: "h/←", description: "Collapse / go to parent" },
                KeyBinding { keys: "o", description: "Toggle expand" },
                KeyBinding { keys: "Space/a", description: "Add to selection" },
                KeyBinding { keys: "Esc/q", description: "Close picker" },
            ],
        },
        HelpSection {
            title: "Results",
            bindings: vec![
                KeyBinding { keys: "j/k ↑/↓", description: "Move between files" },
                KeyBinding { keys: "[/]", description: "Previous/next group" },
                KeyBinding { keys: "Space", description: "Grab file" },
                KeyBinding { keys: "Enter", description: "Drop on file / confirm" },
                KeyBinding { keys: "Esc/n", description: "Cancel menu or grab" },
                KeyBinding { keys: "R", description: "Refresh groups" },
                KeyBinding { keys: "N", description: "New scan" },
            ],
        },
        HelpSection {
            title: "General",
            bindings: vec![
                KeyBinding { keys: "t", description: "Toggle dark/light theme" },
                KeyBinding { keys: "?", description: "Show this help" },
                KeyBinding { keys: "q", description: "Quit" },
                KeyBinding { keys: "Ctrl-c", description: "Force quit" },
            ],
        },
    ]
}
