//! Duplicate groups drawn as rows of file tiles.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use simsweep_core::CandidateFile;

use crate::app::navigation::ListNavigator;
use crate::groups::{ActionMenu, DuplicateGroupView, TileRef};
use crate::theme::Theme;
use crate::ui::{format_size, scroll_start, truncate_left};

enum Row {
    Header(usize),
    Tile(usize),
}

/// Every group with a header line followed by one line per file.
pub struct GroupTiles<'a> {
    theme: &'a Theme,
    view: &'a DuplicateGroupView,
    menu: Option<&'a ActionMenu>,
}

impl<'a> GroupTiles<'a> {
    pub fn new(theme: &'a Theme, view: &'a DuplicateGroupView) -> Self {
        Self {
            theme,
            view,
            menu: None,
        }
    }

    /// Highlight the source and target of an open action menu.
    pub fn menu(mut self, menu: Option<&'a ActionMenu>) -> Self {
        self.menu = menu;
        self
    }

    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut last_group = None;
        for (i, tile) in self.view.tiles().iter().enumerate() {
            if last_group != Some(tile.group) {
                rows.push(Row::Header(tile.group));
                last_group = Some(tile.group);
            }
            rows.push(Row::Tile(i));
        }
        rows
    }

    fn header_line(&self, group: usize) -> Line<'static> {
        let Some(files) = self.view.groups().get(group) else {
            return Line::raw("");
        };
        Line::from(vec![
            Span::styled(format!(" Group {} ", group + 1), self.theme.title),
            Span::styled(
                format!(
                    "{} files · {} reclaimable",
                    files.len(),
                    format_size(files.wasted_bytes())
                ),
                Style::default().fg(self.theme.muted),
            ),
        ])
    }

    fn role(&self, tile: TileRef, file: &CandidateFile) -> Option<&'static str> {
        let menu = self.menu?;
        let path = file.canonical_path();
        if tile.group != menu.gesture.source_group {
            None
        } else if path == menu.gesture.source_path {
            Some("from ")
        } else if path == menu.gesture.target_path {
            Some("onto ")
        } else {
            None
        }
    }

    fn tile_line(&self, tile: TileRef, is_selected: bool, width: usize) -> Line<'static> {
        let Some(file) = self.view.file(tile) else {
            return Line::raw("");
        };

        let grabbed = self.view.is_grabbed(tile);
        let (marker, marker_style) = match self.role(tile, file) {
            Some(role) => (role, self.theme.grabbed),
            None if grabbed => ("held ", self.theme.grabbed),
            None => ("     ", Style::default()),
        };

        let mut meta = format!(
            "  {:>10}  {}  {:<17}  dev {}",
            format_size(file.size),
            file.date.format("%Y-%m-%d %H:%M:%S"),
            file.date_source,
            file.device_id,
        );
        if file.extra_links() > 0 {
            meta.push_str(&format!("  +{} links", file.extra_links()));
        }
        if !file.hardlink_eligible {
            meta.push_str("  no-link");
        }
        if !file.thumbnail.is_empty() {
            meta.push_str(&format!("  thumb {}", format_size(file.thumbnail.len() as u64)));
        }

        let path_width = width
            .saturating_sub(2 + marker.width())
            .saturating_sub(meta.width());
        let path = truncate_left(file.canonical_path(), path_width.max(8));
        let padding = " ".repeat(path_width.saturating_sub(path.width()));

        let path_style = if grabbed {
            self.theme.grabbed
        } else {
            Style::default().fg(self.theme.foreground)
        };

        let line = Line::from(vec![
            Span::raw("  "),
            Span::styled(marker, marker_style),
            Span::styled(path, path_style),
            Span::raw(padding),
            Span::styled(meta, Style::default().fg(self.theme.muted)),
        ]);
        if is_selected {
            line.style(self.theme.selected)
        } else {
            line
        }
    }
}

impl Widget for GroupTiles<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        if self.view.is_empty() {
            Paragraph::new(Line::styled(
                "  No duplicates found",
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            ))
            .render(area, buf);
            return;
        }

        let rows = self.rows();
        let selected_tile = self.view.selected();
        let selected_row = rows
            .iter()
            .position(|row| matches!(row, Row::Tile(i) if *i == selected_tile))
            .unwrap_or(0);
        let height = area.height as usize;
        let start = scroll_start(selected_row, height);
        let tiles = self.view.tiles();

        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, row)| match row {
                Row::Header(group) => self.header_line(*group),
                Row::Tile(t) => self.tile_line(tiles[*t], i == selected_row, area.width as usize),
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_support::{file, group};

    fn render(view: &DuplicateGroupView) -> Vec<String> {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 120, 8);
        let mut buf = Buffer::empty(area);
        GroupTiles::new(&theme, view).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_headers_and_tiles() {
        let mut linked = file("/p/b.jpg");
        linked.paths.push("/p/b-copy.jpg".to_string());
        let mut view = DuplicateGroupView::new();
        view.replace(vec![group(&[file("/p/a.jpg"), linked]), group(&[file("/q/c.jpg")])]);
        view.toggle_grab();

        let lines = render(&view);
        assert!(lines[0].starts_with(" Group 1 2 files"));
        assert!(lines[1].starts_with("  held /p/a.jpg"));
        assert!(lines[1].contains("2022-08-14 09:30:00"));
        assert!(lines[1].contains("filesystem"));
        assert!(lines[2].contains("+1 links"));
        assert!(lines[3].starts_with(" Group 2"));
    }

    #[test]
    fn test_empty_view() {
        let lines = render(&DuplicateGroupView::new());
        assert!(lines[0].contains("No duplicates found"));
    }
}
