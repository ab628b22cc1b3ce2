//! Rendering logic for the application.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Widget};

use simsweep_core::{ProgressSnapshot, Screen, SettingsSubmission};

use crate::groups::{ActionResolver, DuplicateGroupView, ResolverState};
use crate::theme::Theme;
use crate::ui::modals::{ActionMenuModal, InputModal, PickerModal};
use crate::ui::{GroupTiles, HelpOverlay, ProgressBar, scroll_start, truncate_left};

use super::input::InputState;
use super::state::{AppMode, SettingsScreen, StatusMessage};

/// Everything one frame needs, borrowed from the app.
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub mode: AppMode,
    pub screen: Screen,
    pub server: &'a str,
    pub settings: &'a SettingsScreen,
    pub input_state: Option<&'a InputState>,
    pub snapshot: Option<&'a ProgressSnapshot>,
    pub groups: &'a DuplicateGroupView,
    pub groups_loading: bool,
    pub resolver: &'a ActionResolver,
    pub status: Option<&'a StatusMessage>,
}

/// Main render function.
pub fn render_app(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let base_style = Style::default()
        .bg(ctx.theme.background)
        .fg(ctx.theme.foreground);
    buf.set_style(area, base_style);

    let [header, tabs_area, content, status, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(ctx, header, buf);
    render_tabs(ctx, tabs_area, buf);

    match ctx.screen {
        Screen::Settings => render_settings(ctx, content, buf),
        Screen::Progress => render_progress(ctx, content, buf),
        Screen::Results => render_results(ctx, content, buf),
    }

    render_status(ctx, status, buf);
    render_footer(ctx, footer, buf);

    // Overlays
    if ctx.screen == Screen::Settings && ctx.settings.picker.is_visible() {
        PickerModal::new(ctx.theme, &ctx.settings.picker, &ctx.settings.selection)
            .render(content, buf);
    }
    if let Some(menu) = ctx.resolver.menu().filter(|_| ctx.screen == Screen::Results) {
        let pending = matches!(ctx.resolver.state(), ResolverState::Pending(_));
        ActionMenuModal::new(ctx.theme, menu, pending).render(area, buf);
    }
    match ctx.mode {
        AppMode::Help => HelpOverlay::new(ctx.theme).render(area, buf),
        AppMode::EnteringPath => {
            if let Some(input) = ctx.input_state {
                InputModal::new(ctx.theme, input, "Add directory", "Absolute path on the server:")
                    .render(area, buf);
            }
        }
        _ => {}
    }
}

fn render_header(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let title = Span::styled(" simsweep ", ctx.theme.title.add_modifier(Modifier::BOLD));
    let server = Span::styled(format!(" {} ", ctx.server), ctx.theme.header);

    let summary = match ctx.screen {
        Screen::Settings => format!(" {} selected ", ctx.settings.selection.len()),
        Screen::Progress => ctx
            .snapshot
            .map(|s| format!(" {:.0}% ", s.progress.clamp(0.0, 100.0)))
            .unwrap_or_default(),
        Screen::Results => format!(
            " {} groups, {} files ",
            ctx.groups.groups().len(),
            ctx.groups.tile_count()
        ),
    };

    let line = Line::from(vec![
        title,
        server,
        Span::styled(summary, Style::default().fg(ctx.theme.muted)),
    ]);
    Paragraph::new(line).style(ctx.theme.header).render(area, buf);
}

fn render_tabs(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let screens = [Screen::Settings, Screen::Progress, Screen::Results];
    let titles: Vec<String> = screens.iter().map(|s| format!(" {s} ")).collect();
    let selected = screens.iter().position(|s| *s == ctx.screen).unwrap_or(0);

    Tabs::new(titles)
        .select(selected)
        .style(ctx.theme.footer)
        .highlight_style(ctx.theme.selected)
        .render(area, buf);
}

fn render_settings(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let settings = ctx.settings;
    let [list_area, options_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(6)]).areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.theme.border)
        .title(" Directories to scan ")
        .title_style(ctx.theme.title);
    let inner = block.inner(list_area);
    block.render(list_area, buf);

    let rows = settings.selection.display_rows();
    if rows.is_empty() {
        let hint = Line::from(vec![
            Span::styled("  Nothing selected. Press ", ctx.theme.help_desc),
            Span::styled("o", ctx.theme.help_key),
            Span::styled(" to browse or ", ctx.theme.help_desc),
            Span::styled("i", ctx.theme.help_key),
            Span::styled(" to type a path.", ctx.theme.help_desc),
        ]);
        Paragraph::new(hint).render(inner, buf);
    } else {
        let height = inner.height as usize;
        let start = scroll_start(settings.cursor, height);
        let width = inner.width as usize;
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, row)| {
                let indent = "  ".repeat(row.depth + 1);
                let style = if row.redundant {
                    ctx.theme.redundant
                } else {
                    ctx.theme.directory
                };
                let mut spans = vec![
                    Span::raw(indent.clone()),
                    Span::styled(
                        truncate_left(&row.path, width.saturating_sub(indent.len() + 12)),
                        style,
                    ),
                ];
                if row.redundant {
                    spans.push(Span::styled("  (covered)", ctx.theme.redundant));
                }
                let line = Line::from(spans);
                if i == settings.cursor {
                    line.style(ctx.theme.selected)
                } else {
                    line
                }
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }

    let submit = if settings.submitting {
        Span::styled("Starting scan…", Style::default().fg(ctx.theme.info))
    } else if settings.selection.can_submit() {
        Span::styled("Enter to start the scan", Style::default().fg(ctx.theme.success))
    } else {
        Span::styled("Select at least one directory", Style::default().fg(ctx.theme.muted))
    };

    let options = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Algorithm   ", ctx.theme.help_desc),
            Span::styled(settings.algorithm.to_string(), ctx.theme.help_key),
            Span::styled("   Tab to change", Style::default().fg(ctx.theme.muted)),
        ]),
        Line::from(vec![
            Span::styled("  Similarity  ", ctx.theme.help_desc),
            Span::styled(
                format!("{}/{}", settings.similarity, SettingsSubmission::MAX_SIMILARITY),
                ctx.theme.help_key,
            ),
            Span::styled("   +/- to adjust", Style::default().fg(ctx.theme.muted)),
        ]),
        Line::raw(""),
        Line::from(vec![Span::raw("  "), submit]),
    ];
    Paragraph::new(options).render(options_area, buf);
}

fn render_progress(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.theme.border)
        .title(" Scanning ")
        .title_style(ctx.theme.title);
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(snapshot) = ctx.snapshot else {
        Paragraph::new(Line::styled(
            "  Waiting for the backend…",
            Style::default()
                .fg(ctx.theme.muted)
                .add_modifier(Modifier::ITALIC),
        ))
        .render(inner, buf);
        return;
    };

    let bar_width = inner.width.saturating_sub(24);
    let mut y = inner.y;
    let bottom = inner.y + inner.height;

    let overall = Line::from(vec![
        Span::styled("  Overall ", ctx.theme.help_desc),
        Span::styled(
            format!("{:>5.1}%", snapshot.ratio() * 100.0),
            ctx.theme.help_key,
        ),
    ]);
    if y < bottom {
        buf.set_line(inner.x, y, &overall, 18);
        ProgressBar::new(snapshot.ratio())
            .filled_style(ctx.theme.progress_bar)
            .empty_style(ctx.theme.progress_bg)
            .render(Rect::new(inner.x + 20, y, bar_width, 1), buf);
        y += 2;
    }

    for line in [
        (!snapshot.status.is_empty()).then(|| {
            Line::from(vec![
                Span::styled("  Status  ", ctx.theme.help_desc),
                Span::raw(snapshot.status.clone()),
            ])
        }),
        (!snapshot.message.is_empty()).then(|| {
            Line::styled(
                format!("  {}", snapshot.message),
                Style::default().fg(ctx.theme.info),
            )
        }),
        (!snapshot.time.is_empty()).then(|| {
            Line::styled(
                format!("  Elapsed {}", snapshot.time),
                Style::default().fg(ctx.theme.muted),
            )
        }),
    ]
    .into_iter()
    .flatten()
    {
        if y >= bottom {
            return;
        }
        buf.set_line(inner.x, y, &line, inner.width);
        y += 1;
    }
    y += 1;

    for step in &snapshot.steps {
        if y >= bottom {
            break;
        }
        let (label, bar) = match step.progress.percent() {
            Some(percent) => (format!("{percent:>5.1}%"), ProgressBar::new(percent / 100.0)),
            None => ("    ?".to_string(), ProgressBar::indeterminate()),
        };
        let line = Line::from(vec![
            Span::styled(format!("  {:<10.10}", step.name), ctx.theme.help_desc),
            Span::styled(label, ctx.theme.help_key),
        ]);
        buf.set_line(inner.x, y, &line, 18);
        bar.filled_style(ctx.theme.progress_bar)
            .empty_style(ctx.theme.progress_bg)
            .render(Rect::new(inner.x + 20, y, bar_width.saturating_sub(14), 1), buf);
        let status_x = inner.x + 21 + bar_width.saturating_sub(14);
        if status_x < inner.x + inner.width {
            buf.set_line(
                status_x,
                y,
                &Line::styled(step.status.clone(), Style::default().fg(ctx.theme.muted)),
                inner.x + inner.width - status_x,
            );
        }
        y += 1;
    }
}

fn render_results(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let title = if ctx.groups_loading {
        " Duplicate groups (refreshing…) ".to_string()
    } else {
        " Duplicate groups ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.theme.border)
        .title(title)
        .title_style(ctx.theme.title);
    let inner = block.inner(area);
    block.render(area, buf);

    GroupTiles::new(ctx.theme, ctx.groups)
        .menu(ctx.resolver.menu())
        .render(inner, buf);
}

fn render_status(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let Some(status) = ctx.status else {
        return;
    };
    Paragraph::new(Line::styled(
        format!(" {}", status.text),
        ctx.theme.status_style(status.ok),
    ))
    .render(area, buf);
}

fn render_footer(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let mut keys: Vec<(&str, &str)> = match ctx.screen {
        Screen::Settings if ctx.settings.picker.is_visible() => {
            vec![("j/k", "Nav"), ("l/h", "Open"), ("Spc", "Add"), ("R", "Reload"), ("Esc", "Close")]
        }
        Screen::Settings => vec![
            ("o", "Browse"),
            ("i", "Type"),
            ("d", "Remove"),
            ("Tab", "Algo"),
            ("+/-", "Sim"),
            ("Enter", "Scan"),
        ],
        Screen::Progress => vec![("R", "Poll")],
        Screen::Results if ctx.resolver.menu().is_some() => {
            vec![("j/k", "Choose"), ("Enter", "Apply"), ("Esc", "Cancel")]
        }
        Screen::Results => {
            let mut v = vec![("j/k", "Nav"), ("[/]", "Group")];
            if ctx.groups.grabbed().is_some() {
                v.push(("Enter", "Drop"));
                v.push(("Esc", "Release"));
            } else {
                v.push(("Spc", "Grab"));
            }
            v.push(("R", "Refresh"));
            v.push(("N", "New"));
            v
        }
    };

    keys.extend([("?", "Help"), ("q", "Quit")]);

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!(" {key} "), ctx.theme.help_key),
                Span::styled(format!("{desc} "), ctx.theme.help_desc),
            ]
        })
        .collect();

    Paragraph::new(Line::from(spans))
        .style(ctx.theme.footer)
        .render(area, buf);
}
