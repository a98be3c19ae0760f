use ratatui::{
    Frame,
    layout::{Alignment, Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use msgscope_core::{ConsoleStats, ConsoleView, Visibility};

use crate::app::AppState;
use crate::sink::{ConsoleRow, RowSink, truncate_to_width};
use crate::ui::components::{SeverityBar, StatsBar, StatusBar, console_hints};
use crate::ui::{Layout, Theme};

/// Width of the `  id HH:MM:SS.mmm TAG │ ` prefix
const PREFIX_WIDTH: usize = 6 + 1 + 12 + 1 + 3 + 3;

/// The message console screen
pub struct ConsoleScreen;

impl ConsoleScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, view: &ConsoleView<RowSink>) {
        let console = view.console();
        let stats = console.stats();
        let visibility = console.visibility();

        let (header_area, stats_area, list_area, status_area) =
            Layout::console(frame.area(), state.ui_state.stats_visible);

        Self::render_header(frame, header_area, view, &stats, visibility);

        if let Some(area) = stats_area {
            StatsBar::render(frame, area, &stats);
        }

        if state.ui_state.panel_hidden {
            state.ui_state.list_area = None;
            Self::render_hidden_panel(frame, list_area, &stats);
        } else {
            Self::render_messages(frame, list_area, state, view.sink().rows(), view.max_displayed());
        }

        Self::render_status_bar(frame, status_area, state, &stats);
    }

    fn render_header(
        frame: &mut Frame,
        area: Rect,
        view: &ConsoleView<RowSink>,
        stats: &ConsoleStats,
        visibility: Visibility,
    ) {
        let log_file = view.console().config().log_file.display().to_string();

        let mut spans = vec![
            Span::styled("msgscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
        ];
        spans.extend(SeverityBar::new(visibility, stats).line().spans);
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(Span::styled(log_file, Theme::text_dim()));

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_messages(
        frame: &mut Frame,
        area: Rect,
        state: &mut AppState,
        rows: &[ConsoleRow],
        max_displayed: usize,
    ) {
        // Calculate visible area (accounting for border)
        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(4) as usize; // 2 for borders, 2 for scrollbar

        state.ui_state.list_area = Some(area.inner(Margin {
            vertical: 1,
            horizontal: 1,
        }));
        state.sync_selection(rows);
        state.scroll_to_selection(rows, inner_height);
        let selected = state.selected_position(rows);

        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(state.ui_state.scroll)
            .take(inner_height)
            .map(|(pos, row)| Self::format_row(row, inner_width, selected == Some(pos)))
            .collect();

        let follow = if state.ui_state.follow { " follow" } else { "" };
        let title = format!(" Messages ({}/{}){} ", rows.len(), max_displayed, follow);

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(widget, area);

        // Render scrollbar
        if rows.len() > inner_height {
            let max_scroll = rows.len().saturating_sub(inner_height);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(state.ui_state.scroll.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// One list line: id, time, severity tag, first body line and a `+N`
    /// marker for the lines not shown
    fn format_row(row: &ConsoleRow, width: usize, selected: bool) -> Line<'static> {
        let more = if row.extra_lines > 0 {
            format!(" +{}", row.extra_lines)
        } else {
            String::new()
        };
        let body_width = width.saturating_sub(PREFIX_WIDTH + more.len());

        let line = Line::from(vec![
            Span::styled(format!("{:>6}", row.id), Theme::text_dim()),
            Span::styled(format!(" {}", row.time), Theme::text_dim()),
            Span::styled(format!(" {}", row.severity.short()), Theme::severity_tag(row.severity)),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(truncate_to_width(&row.headline, body_width), Theme::text()),
            Span::styled(more, Theme::text_highlight()),
        ]);

        if selected {
            line.style(Theme::list_item_selected())
        } else {
            line.style(Style::default())
        }
    }

    fn render_hidden_panel(frame: &mut Frame, area: Rect, stats: &ConsoleStats) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Message panel hidden", Theme::text_highlight())),
            Line::from(Span::styled(
                format!("{} messages received so far", stats.dispatched),
                Theme::text_dim(),
            )),
            Line::from(Span::styled("Press h or Ctrl+q to show it", Theme::text_dim())),
        ];

        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            );
        frame.render_widget(widget, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, stats: &ConsoleStats) {
        let right = if stats.halted {
            "session halted".to_string()
        } else {
            format!("{} received", stats.dispatched)
        };

        let status_bar = StatusBar::new()
            .hints(console_hints())
            .notice(state.ui_state.status_message.as_deref())
            .right(right);

        frame.render_widget(status_bar, area);
    }
}
