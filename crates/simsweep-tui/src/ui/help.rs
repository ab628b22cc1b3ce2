//! Help overlay widget.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::event::{HelpSection, get_help_sections};
use crate::theme::Theme;
use crate::ui::popup_area;

/// Help overlay showing key bindings organized by section.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn render_column(&self, sections: &[&HelpSection], area: Rect, buf: &mut Buffer) {
        let bottom = area.y + area.height;
        let mut y = area.y;

        for section in sections {
            if y >= bottom {
                break;
            }
            let title = Line::from(Span::styled(
                section.title,
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::BOLD),
            ));
            buf.set_line(area.x, y, &title, area.width);
            y += 1;

            for binding in &section.bindings {
                if y >= bottom {
                    break;
                }
                let line = Line::from(vec![
                    Span::styled(format!("{:>10}", binding.keys), self.theme.help_key),
                    Span::styled(format!(" {}", binding.description), self.theme.help_desc),
                ]);
                buf.set_line(area.x, y, &line, area.width);
                y += 1;
            }

            y += 1;
        }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = popup_area(area, 80, 24);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Help - Press ? or Esc to close ")
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);

        let sections = get_help_sections();
        // Settings and the picker on the left, results and general on the right.
        let (first, second) = sections.split_at(sections.len().min(2));
        let first: Vec<&HelpSection> = first.iter().collect();
        let second: Vec<&HelpSection> = second.iter().collect();

        self.render_column(&first, left, buf);
        self.render_column(&second, right, buf);
    }
}
