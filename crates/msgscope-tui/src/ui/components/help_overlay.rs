use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::popup(frame.area(), 50, 31);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![Span::styled("Filters", Style::default().fg(Color::Yellow))]),
            Self::key_line("1", "Show/hide debug"),
            Self::key_line("2", "Show/hide info"),
            Self::key_line("3", "Show/hide warning"),
            Self::key_line("4", "Show/hide critical"),
            Line::from(""),
            Line::from(vec![Span::styled("Navigation", Style::default().fg(Color::Yellow))]),
            Self::key_line("j/↓", "Next message"),
            Self::key_line("k/↑", "Previous message"),
            Self::key_line("Ctrl+d", "Page down"),
            Self::key_line("Ctrl+u", "Page up"),
            Self::key_line("g", "First message"),
            Self::key_line("G", "Last message"),
            Self::key_line("f", "Toggle follow mode"),
            Line::from(""),
            Line::from(vec![Span::styled("Actions", Style::default().fg(Color::Yellow))]),
            Self::key_line("Enter", "Inspect message"),
            Self::key_line("d/Del", "Remove message"),
            Self::key_line("y", "Copy message text"),
            Self::key_line("Click", "Inspect message"),
            Self::key_line("R-click", "Remove message"),
            Self::key_line("s", "Toggle stats bar"),
            Self::key_line("h", "Hide/show message panel"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Close overlay"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
