use ratatui::{
    Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use msgscope_core::MessageRecord;

use crate::ui::{Layout, Theme};

/// Popup with every field of one message
pub struct DetailOverlay;

impl DetailOverlay {
    pub fn render(frame: &mut Frame, record: &MessageRecord) {
        let area = frame.area();
        let popup_area = Layout::popup(area, area.width * 4 / 5, area.height * 4 / 5);
        frame.render_widget(Clear, popup_area);

        let severity = record.severity();
        let mut lines = vec![
            Self::field("Id", record.id().to_string()),
            Line::from(vec![
                Span::styled(format!("{:>10}  ", "Severity"), Theme::text_dim()),
                Span::styled(severity.label(), Theme::severity_tag(severity)),
            ]),
            Self::field("Time", record.iso_time()),
            Self::field(
                "Origin",
                format!("{}:{}", record.source_file(), record.source_line()),
            ),
            Self::field("Function", record.function_name().to_string()),
            Self::field("Category", record.category().to_string()),
            Line::from(""),
        ];
        lines.extend(
            record
                .body()
                .lines()
                .map(|line| Line::from(Span::styled(line.to_string(), Theme::text()))),
        );

        let title = format!(" Message {} ", record.id());
        let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(title, Theme::title()))
                .title_bottom(Span::styled(" [Esc] Close  [j/k] Next/Prev ", Theme::text_dim())),
        );

        frame.render_widget(widget, popup_area);
    }

    fn field(name: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>10}  ", name), Theme::text_dim()),
            Span::styled(value, Theme::text()),
        ])
    }
}
