//! Directory tree widget for the picker overlay.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use simsweep_core::SelectionStore;

use crate::app::navigation::ListNavigator;
use crate::picker::{DirectoryTreePresenter, NodeState, PickerRow, RootState, RowKind};
use crate::theme::Theme;
use crate::ui::{scroll_start, truncate};

/// Renders the presenter's visible rows with tree lines.
pub struct PickerTree<'a> {
    theme: &'a Theme,
    presenter: &'a DirectoryTreePresenter,
    selection: &'a SelectionStore,
}

impl<'a> PickerTree<'a> {
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

    fn placeholder(&self) -> Option<Line<'static>> {
        match self.presenter.root_state() {
            RootState::Idle | RootState::Loading { .. } => Some(Line::styled(
                "  Loading directories…",
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            )),
            RootState::Failed(message) => Some(Line::styled(
                format!("  {message} (R to retry)"),
                Style::default().fg(self.theme.error),
            )),
            RootState::Loaded if self.presenter.roots().is_empty() => Some(Line::styled(
                "  No directories available",
                Style::default().fg(self.theme.muted),
            )),
            RootState::Loaded => None,
        }
    }

    fn row_line(&self, row: &PickerRow, is_selected: bool, width: usize) -> Line<'static> {
        let mut prefix = String::new();
        for &parent_is_last in row.parent_last_siblings.iter().skip(1) {
            prefix.push_str(if parent_is_last { "  " } else { "│ " });
        }
        if row.depth > 0 {
            prefix.push_str(if row.is_last_sibling { "└─" } else { "├─" });
        }

        let (marker, marker_style) = match row.kind {
            RowKind::Node(_) if self.selection.contains(&row.path) => {
                ("● ", Style::default().fg(self.theme.info))
            }
            _ => ("  ", Style::default()),
        };

        let (indicator, name_style) = match row.kind {
            RowKind::Node(NodeState::Expanded) => ("▼ ", self.theme.directory),
            RowKind::Node(NodeState::Expanding) => ("◌ ", self.theme.directory),
            RowKind::Node(NodeState::Collapsed) => ("▶ ", self.theme.directory),
            RowKind::Loading => (
                "",
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
        };

        let used = prefix.width() + marker.width() + indicator.width();
        let name = truncate(&row.name, width.saturating_sub(used));

        let line = Line::from(vec![
            Span::styled(prefix, self.theme.tree_lines),
            Span::styled(marker, marker_style),
            Span::styled(indicator, Style::default().fg(self.theme.muted)),
            Span::styled(name, name_style),
        ]);
        if is_selected {
            line.style(self.theme.selected)
        } else {
            line
        }
    }
}

impl Widget for PickerTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        if let Some(line) = self.placeholder() {
            Paragraph::new(line).render(area, buf);
            return;
        }

        let rows = self.presenter.visible_rows();
        let selected = self.presenter.selected();
        let height = area.height as usize;
        let start = scroll_start(selected, height);

        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, row)| self.row_line(row, i == selected, area.width as usize))
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}
