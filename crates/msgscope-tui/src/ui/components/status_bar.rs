use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
    notice: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
            notice: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }

    /// Show a notice in place of the hints
    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        buf.set_style(area, Theme::status_bar());

        let line = match self.notice {
            Some(notice) => Line::from(Span::styled(notice, Theme::status_bar_notice())),
            None => {
                let mut spans = Vec::new();
                for (i, (key, desc)) in self.hints.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::styled("  ", Theme::status_bar()));
                    }
                    spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
                    spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
                }
                Line::from(spans)
            }
        };
        let line_width = line.width() as u16;

        // Render hints on the left
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Render right text if present
        if let Some(right) = self.right_text {
            let right_width = right.width() as u16;
            let right_span = Span::styled(&right, Theme::status_bar());
            let right_x = area.x + area.width.saturating_sub(right_width + 2);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &right_span, right_width);
            }
        }
    }
}

/// Default hints for the message list
pub fn console_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("1-4", "Filter"),
        ("↑/k ↓/j", "Move"),
        ("Enter", "Inspect"),
        ("d", "Remove"),
        ("y", "Copy"),
        ("f", "Follow"),
        ("h", "Hide"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}
