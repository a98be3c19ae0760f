use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the console screen into header, optional stats bar, message list
    /// and status bar
    pub fn console(area: Rect, show_stats: bool) -> (Rect, Option<Rect>, Rect, Rect) {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_stats {
            constraints.push(Constraint::Length(3)); // Stats bar
        }
        constraints.push(Constraint::Min(1)); // Messages
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        if show_stats {
            (chunks[0], Some(chunks[1]), chunks[2], chunks[3])
        } else {
            (chunks[0], None, chunks[1], chunks[2])
        }
    }

    /// A popup of at most `width` x `height` centered in `area`
    pub fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_layout_with_stats() {
        let (header, stats, list, status) = Layout::console(Rect::new(0, 0, 80, 24), true);
        assert_eq!(header.height, 3);
        assert_eq!(stats.map(|r| r.height), Some(3));
        assert_eq!(list.height, 17);
        assert_eq!(status.y, 23);
    }

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let popup = Layout::popup(Rect::new(0, 0, 40, 20), 100, 10);
        assert_eq!(popup.width, 36);
        assert_eq!(popup.height, 10);
        assert_eq!(popup.x, 2);
        assert_eq!(popup.y, 5);
    }
}
