use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use msgscope_core::{ConsoleStats, Severity};

use crate::ui::Theme;

/// Session counters: dispatched, evicted per severity, transcript faults
pub struct StatsBar;

impl StatsBar {
    pub fn render(frame: &mut Frame, area: Rect, stats: &ConsoleStats) {
        let mut spans = vec![
            Span::styled(" Dispatched:", Theme::text_dim()),
            Span::styled(format!("{} ", stats.dispatched), Theme::text()),
            Span::styled("Retained:", Theme::text_dim()),
            Span::styled(format!("{} ", stats.total_retained()), Theme::text()),
            Span::styled("│ Evicted ", Theme::text_dim()),
        ];

        for severity in Severity::RETAINED {
            spans.push(Span::styled(
                format!("{}:", severity.short()),
                Theme::severity_tag(severity),
            ));
            spans.push(Span::styled(
                format!("{} ", stats.evicted_for(severity)),
                Theme::text(),
            ));
        }

        spans.push(Span::styled("│ Live:", Theme::text_dim()));
        spans.push(Span::styled(format!("{} ", stats.live_records), Theme::text()));

        if stats.transcript_faults > 0 {
            spans.push(Span::styled(
                format!("│ {} transcript write(s) failed", stats.transcript_faults),
                Theme::error(),
            ));
        }

        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Stats ", Theme::title())),
        );

        frame.render_widget(widget, area);
    }
}
