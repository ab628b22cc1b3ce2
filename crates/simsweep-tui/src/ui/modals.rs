//! Modal dialog widgets.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use simsweep_core::SelectionStore;

use crate::app::input::InputState;
use crate::groups::ActionMenu;
use crate::picker::DirectoryTreePresenter;
use crate::theme::Theme;
use crate::ui::{PickerTree, popup_area, truncate_left};

/// The directory picker overlay.
pub struct PickerModal<'a> {
    theme: &'a Theme,
    presenter: &'a DirectoryTreePresenter,
    selection: &'a SelectionStore,
}

impl<'a> PickerModal<'a> {
    pub fn new(
        theme: &'a Theme,
        presenter: &'a DirectoryTreePresenter,
        selection: &'a SelectionStore,
    ) -> Self {
        Self {
            theme,
            presenter,
            selection,
        }
    }
}

impl Widget for PickerModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = popup_area(area, 70, area.height.saturating_mul(4) / 5);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Choose directories ")
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let [tree, hints] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        PickerTree::new(self.theme, self.presenter, self.selection).render(tree, buf);

        Line::from(vec![
            Span::styled(" l/h ", self.theme.help_key),
            Span::styled("Expand/Collapse ", self.theme.help_desc),
            Span::styled(" Space ", self.theme.help_key),
            Span::styled("Add ", self.theme.help_desc),
            Span::styled(" Esc ", self.theme.help_key),
            Span::styled("Close", self.theme.help_desc),
        ])
        .render(hints, buf);
    }
}

/// The dropdown offered after dropping one tile on another.
pub struct ActionMenuModal<'a> {
    theme: &'a Theme,
    menu: &'a ActionMenu,
    pending: bool,
}

impl<'a> ActionMenuModal<'a> {
    pub fn new(theme: &'a Theme, menu: &'a ActionMenu, pending: bool) -> Self {
        Self {
            theme,
            menu,
            pending,
        }
    }
}

impl Widget for ActionMenuModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let extra = if self.menu.error.is_some() { 2 } else { 0 };
        let height = self.menu.choices.len() as u16 + 8 + extra;
        let popup = popup_area(area, 64, height);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Resolve duplicate ")
            .title_style(
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let path_width = (inner.width as usize).saturating_sub(8);
        let gesture = &self.menu.gesture;
        let mut lines = vec![
            Line::from(vec![
                Span::styled("  from ", self.theme.help_desc),
                Span::styled(truncate_left(&gesture.source_path, path_width), self.theme.grabbed),
            ]),
            Line::from(vec![
                Span::styled("  onto ", self.theme.help_desc),
                Span::raw(truncate_left(&gesture.target_path, path_width)),
            ]),
            Line::raw(""),
        ];

        for (i, choice) in self.menu.choices.iter().enumerate() {
            let is_selected = i == self.menu.selected;
            let pointer = if is_selected { "› " } else { "  " };
            let style = if !choice.enabled {
                self.theme.disabled
            } else if is_selected {
                self.theme.selected
            } else {
                Style::default().fg(self.theme.foreground)
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(pointer, self.theme.help_key),
                Span::styled(choice.action.label(), style),
            ]));
        }

        if let Some(error) = &self.menu.error {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                format!("  {error}"),
                Style::default().fg(self.theme.error),
            ));
        }

        lines.push(Line::raw(""));
        if self.pending {
            lines.push(Line::styled(
                "  Applying…",
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            ));
        } else {
            lines.push(Line::from(vec![
                Span::styled(" j/k ", self.theme.help_key),
                Span::raw("Choose  "),
                Span::styled(" Enter ", self.theme.help_key),
                Span::raw("Apply  "),
                Span::styled(" n/Esc ", self.theme.help_key),
                Span::raw("Cancel"),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Text input dialog.
pub struct InputModal<'a> {
    theme: &'a Theme,
    input: &'a InputState,
    title: &'a str,
    prompt: &'a str,
}

impl<'a> InputModal<'a> {
    pub fn new(theme: &'a Theme, input: &'a InputState, title: &'a str, prompt: &'a str) -> Self {
        Self {
            theme,
            input,
            title,
            prompt,
        }
    }
}

impl Widget for InputModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = if self.input.error().is_some() { 9 } else { 7 };
        let popup = popup_area(area, 60, height);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![
            Line::styled(self.prompt, self.theme.help_desc),
            Line::raw(""),
        ];

        // Characters before the cursor that scroll out of view on the left.
        let chars: Vec<char> = self.input.buffer().chars().collect();
        let cursor = self.input.cursor_chars();
        let max_visible = (inner.width as usize).saturating_sub(4).max(1);
        let start = cursor.saturating_sub(max_visible - 1);
        let end = (start + max_visible).min(chars.len());

        let before: String = chars[start..cursor].iter().collect();
        let at: String = chars.get(cursor).map_or_else(|| " ".to_string(), |c| c.to_string());
        let after: String = if cursor < end {
            chars[cursor + 1..end].iter().collect()
        } else {
            String::new()
        };

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::raw(before),
            Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ]));

        if let Some(error) = self.input.error() {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                format!("  {error}"),
                Style::default().fg(self.theme.error),
            ));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled(" Enter ", self.theme.help_key),
            Span::raw("Add  "),
            Span::styled(" Esc ", self.theme.help_key),
            Span::raw("Cancel"),
        ]));

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_support::file;
    use simsweep_core::DragGesture;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_action_menu_shows_choices_and_error() {
        let theme = Theme::dark();
        let source = file("/p/a.jpg");
        let mut target = file("/p/b.jpg");
        target.device_id = 2;
        let gesture = DragGesture::new("/p/a.jpg", 0, "/p/b.jpg", 0);
        let mut menu = ActionMenu::new(gesture, &source, &target);
        menu.error = Some("Target is read-only".to_string());

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        ActionMenuModal::new(&theme, &menu, false).render(area, &mut buf);

        let rendered = text(&buf);
        for choice in &menu.choices {
            assert!(rendered.contains(choice.action.label()));
        }
        assert!(rendered.contains("Target is read-only"));
        assert!(rendered.contains("n/Esc"));
    }

    #[test]
    fn test_input_modal_shows_cursor_and_error() {
        let theme = Theme::dark();
        let mut input = InputState::with_initial("photos");
        input.set_error("Not an absolute path: photos");

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        InputModal::new(&theme, &input, "Add directory", "Absolute path:").render(area, &mut buf);

        let rendered = text(&buf);
        assert!(rendered.contains("photos"));
        assert!(rendered.contains("Not an absolute path"));
    }
}
