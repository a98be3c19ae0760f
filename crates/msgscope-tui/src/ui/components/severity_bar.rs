use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use msgscope_core::{ConsoleStats, Severity, Visibility};

use crate::ui::Theme;

/// Severity toggles with their retained counts, e.g. `[1] DBG 12`
pub struct SeverityBar<'a> {
    visibility: Visibility,
    stats: &'a ConsoleStats,
}

impl<'a> SeverityBar<'a> {
    pub fn new(visibility: Visibility, stats: &'a ConsoleStats) -> Self {
        Self { visibility, stats }
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, severity) in Severity::RETAINED.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::text()));
            }
            let style = if self.visibility.get(severity) {
                Theme::severity_tag(severity)
            } else {
                Theme::severity_off()
            };
            spans.push(Span::styled(format!("[{}] ", i + 1), Theme::text_dim()));
            spans.push(Span::styled(severity.short(), style));
            spans.push(Span::styled(
                format!(" {}", self.stats.retained_for(severity)),
                Theme::text(),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for SeverityBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}
