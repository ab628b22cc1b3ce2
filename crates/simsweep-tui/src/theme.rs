//! Color theme for the TUI.
//!
//! Dark and light variants share one semantic palette based on Tailwind CSS
//! colors, so widgets never pick raw colors themselves.

use ratatui::style::{Color, Modifier, Style};

/// Theme variant (dark or light).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Name stored in the settings file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub variant: ThemeVariant,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Interactive elements
    pub selected: Style,

    // Status colors
    pub success: Color,
    pub error: Color,
    pub info: Color,

    // UI elements
    pub border: Style,
    pub title: Style,
    pub help_key: Style,
    pub help_desc: Style,

    // Picker tree
    pub tree_lines: Style,
    pub directory: Style,

    /// Selected directories already covered by an ancestor.
    pub redundant: Style,

    // Progress
    pub progress_bar: Style,
    pub progress_bg: Style,

    // Header/Footer
    pub header: Style,
    pub footer: Style,

    /// The tile currently picked up.
    pub grabbed: Style,
    /// Menu entries that cannot be confirmed.
    pub disabled: Style,
}

impl Theme {
    /// Dark theme using a slate-based palette.
    pub fn dark() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        let blue_400 = Color::Rgb(96, 165, 250);
        let blue_500 = Color::Rgb(59, 130, 246);
        let green_500 = Color::Rgb(34, 197, 94);
        let red_500 = Color::Rgb(239, 68, 68);
        let amber_500 = Color::Rgb(245, 158, 11);

        Self {
            variant: ThemeVariant::Dark,
            background: slate_900,
            foreground: slate_100,
            muted: slate_500,

            selected: Style::new().bg(slate_700).fg(slate_50).add_modifier(Modifier::BOLD),

            success: green_500,
            error: red_500,
            info: blue_400,

            border: Style::new().fg(slate_600),
            title: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_400),

            tree_lines: Style::new().fg(slate_600),
            directory: Style::new().fg(blue_500).add_modifier(Modifier::BOLD),

            redundant: Style::new().fg(slate_500).add_modifier(Modifier::DIM),

            progress_bar: Style::new().fg(blue_500),
            progress_bg: Style::new().fg(slate_700),

            header: Style::new().bg(slate_800).fg(slate_100),
            footer: Style::new().bg(slate_800).fg(slate_400),

            grabbed: Style::new().fg(amber_500).add_modifier(Modifier::BOLD),
            disabled: Style::new().fg(slate_600).add_modifier(Modifier::CROSSED_OUT),
        }
    }

    /// Light theme using a slate-based palette.
    pub fn light() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_200 = Color::Rgb(226, 232, 240);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        // Darker accents for contrast on a light background
        let blue_600 = Color::Rgb(37, 99, 235);
        let blue_700 = Color::Rgb(29, 78, 216);
        let green_600 = Color::Rgb(22, 163, 74);
        let red_600 = Color::Rgb(220, 38, 38);
        let amber_600 = Color::Rgb(217, 119, 6);

        Self {
            variant: ThemeVariant::Light,
            background: slate_50,
            foreground: slate_900,
            muted: slate_500,

            selected: Style::new().bg(slate_200).fg(slate_900).add_modifier(Modifier::BOLD),

            success: green_600,
            error: red_600,
            info: blue_600,

            border: Style::new().fg(slate_400),
            title: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_600),

            tree_lines: Style::new().fg(slate_400),
            directory: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),

            redundant: Style::new().fg(slate_400).add_modifier(Modifier::DIM),

            progress_bar: Style::new().fg(blue_600),
            progress_bg: Style::new().fg(slate_200),

            header: Style::new().bg(slate_100).fg(slate_800),
            footer: Style::new().bg(slate_100).fg(slate_600),

            grabbed: Style::new().fg(amber_600).add_modifier(Modifier::BOLD),
            disabled: Style::new().fg(slate_400).add_modifier(Modifier::CROSSED_OUT),
        }
    }

    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Toggle between dark and light themes.
    pub fn toggle(&self) -> Self {
        match self.variant {
            ThemeVariant::Dark => Self::light(),
            ThemeVariant::Light => Self::dark(),
        }
    }

    /// Style for a status line.
    pub fn status_style(&self, ok: bool) -> Style {
        Style::new().fg(if ok { self.success } else { self.error })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
