use msgscope_core::{MessageRecord, SeqId};
use ratatui::layout::Rect;

use crate::app::Action;
use crate::sink::ConsoleRow;
use crate::tui::Pointer;

/// Rows moved by page up/down
pub const PAGE_SIZE: usize = 20;

/// Rows moved per mouse wheel notch
pub const WHEEL_STEP: usize = 3;

/// Ticks a status notice stays up
pub const STATUS_TICKS: u16 = 30;

/// UI-specific transient state
pub struct UiState {
    /// Selected entry, by id so it survives inserts above it
    pub selected: Option<SeqId>,

    /// First visible row
    pub scroll: usize,

    /// Keep the newest entry selected (follow mode)?
    pub follow: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show statistics bar?
    pub stats_visible: bool,

    /// Message panel hidden (ingestion continues)?
    pub panel_hidden: bool,

    /// Record shown in the detail overlay
    pub inspected: Option<MessageRecord>,

    /// One-line notice in the status bar
    pub status_message: Option<String>,

    /// Ticks left before the notice is cleared
    pub status_ticks: u16,

    /// Cells holding message rows at the last render, if the list was drawn
    pub list_area: Option<Rect>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected: None,
            scroll: 0,
            follow: true,
            help_visible: false,
            stats_visible: false,
            panel_hidden: false,
            inspected: None,
            status_message: None,
            status_ticks: 0,
            list_area: None,
        }
    }
}

/// Global application state
pub struct AppState {
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            ui_state: UiState::default(),
            should_quit: false,
            render_dirty: true, // Start dirty to ensure initial render
        }
    }

    /// Row index of the selection. A selected entry that is gone resolves to
    /// the row that took its place.
    pub fn selected_position(&self, rows: &[ConsoleRow]) -> Option<usize> {
        let last = rows.len().checked_sub(1)?;
        let id = self.ui_state.selected?;
        match rows.binary_search_by_key(&id, |row| row.id) {
            Ok(pos) => Some(pos),
            Err(pos) => Some(pos.min(last)),
        }
    }

    /// Id of the selected entry, if it is still displayed
    pub fn selected_id(&self, rows: &[ConsoleRow]) -> Option<SeqId> {
        let pos = self.selected_position(rows)?;
        rows.get(pos).map(|row| row.id)
    }

    /// Move the selection by `delta` rows. Leaves follow mode.
    pub fn move_selection(&mut self, rows: &[ConsoleRow], delta: isize) {
        self.ui_state.follow = false;
        if rows.is_empty() {
            return;
        }

        let last = rows.len() - 1;
        let current = self
            .selected_position(rows)
            .unwrap_or(if delta >= 0 { 0 } else { last });
        let target = current.saturating_add_signed(delta).min(last);
        self.ui_state.selected = Some(rows[target].id);
    }

    pub fn select_first(&mut self, rows: &[ConsoleRow]) {
        self.ui_state.follow = false;
        self.ui_state.selected = rows.first().map(|row| row.id);
    }

    pub fn select_last(&mut self, rows: &[ConsoleRow]) {
        self.ui_state.follow = false;
        self.ui_state.selected = rows.last().map(|row| row.id);
    }

    /// Re-anchor the selection after the list changed
    pub fn sync_selection(&mut self, rows: &[ConsoleRow]) {
        if self.ui_state.follow || self.ui_state.selected.is_none() {
            self.ui_state.selected = rows.last().map(|row| row.id);
        } else {
            self.ui_state.selected = self.selected_id(rows);
        }
    }

    /// Adjust the scroll offset so the selected row is inside a viewport of
    /// `height` rows
    pub fn scroll_to_selection(&mut self, rows: &[ConsoleRow], height: usize) {
        let max_scroll = rows.len().saturating_sub(height);
        let Some(pos) = self.selected_position(rows) else {
            self.ui_state.scroll = 0;
            return;
        };

        if pos < self.ui_state.scroll {
            self.ui_state.scroll = pos;
        } else if height > 0 && pos >= self.ui_state.scroll + height {
            self.ui_state.scroll = pos + 1 - height;
        }
        self.ui_state.scroll = self.ui_state.scroll.min(max_scroll);
    }

    /// Is an overlay capturing keys?
    pub fn overlay_open(&self) -> bool {
        self.ui_state.help_visible || self.ui_state.inspected.is_some()
    }

    /// Close the topmost overlay. Returns false if none was open.
    pub fn close_overlay(&mut self) -> bool {
        if self.ui_state.inspected.take().is_some() {
            return true;
        }
        if self.ui_state.help_visible {
            self.ui_state.help_visible = false;
            return true;
        }
        false
    }

    /// Show a notice in the status bar for `STATUS_TICKS` ticks
    pub fn show_status(&mut self, msg: String) {
        self.ui_state.status_message = Some(msg);
        self.ui_state.status_ticks = STATUS_TICKS;
    }

    pub fn dismiss_status(&mut self) {
        self.ui_state.status_message = None;
        self.ui_state.status_ticks = 0;
    }

    /// Advance the notice clock. Returns true when a notice was cleared.
    pub fn tick(&mut self) -> bool {
        if self.ui_state.status_message.is_none() {
            return false;
        }
        self.ui_state.status_ticks = self.ui_state.status_ticks.saturating_sub(1);
        if self.ui_state.status_ticks == 0 {
            self.dismiss_status();
            return true;
        }
        false
    }

    /// Row under a terminal cell, from the last rendered list area
    pub fn row_at(&self, rows: &[ConsoleRow], column: u16, row: u16) -> Option<SeqId> {
        let area = self.ui_state.list_area?;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let pos = self.ui_state.scroll + usize::from(row - area.y);
        rows.get(pos).map(|r| r.id)
    }

    /// Action for mouse input. Nothing while an overlay is open.
    pub fn pointer_action(&self, rows: &[ConsoleRow], pointer: Pointer) -> Option<Action> {
        if self.overlay_open() {
            return None;
        }
        match pointer {
            Pointer::Open { column, row } => self.row_at(rows, column, row).map(Action::Open),
            Pointer::Remove { column, row } => self.row_at(rows, column, row).map(Action::Remove),
            Pointer::ScrollUp => Some(Action::SelectUp(WHEEL_STEP)),
            Pointer::ScrollDown => Some(Action::SelectDown(WHEEL_STEP)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgscope_core::Severity;

    fn rows(ids: &[u64]) -> Vec<ConsoleRow> {
        ids.iter()
            .map(|id| ConsoleRow {
                id: SeqId(*id),
                severity: Severity::Info,
                time: String::new(),
                headline: format!("row {id}"),
                extra_lines: 0,
            })
            .collect()
    }

    #[test]
    fn test_follow_selects_newest() {
        let mut state = AppState::new();
        state.sync_selection(&rows(&[1, 2, 3]));
        assert_eq!(state.ui_state.selected, Some(SeqId(3)));

        state.sync_selection(&rows(&[1, 2, 3, 9]));
        assert_eq!(state.ui_state.selected, Some(SeqId(9)));
    }

    #[test]
    fn test_moving_leaves_follow_mode() {
        let list = rows(&[1, 2, 3, 4]);
        let mut state = AppState::new();
        state.sync_selection(&list);
        state.move_selection(&list, -2);

        assert!(!state.ui_state.follow);
        assert_eq!(state.ui_state.selected, Some(SeqId(2)));

        state.move_selection(&list, -10);
        assert_eq!(state.ui_state.selected, Some(SeqId(1)));
        state.move_selection(&list, 10);
        assert_eq!(state.ui_state.selected, Some(SeqId(4)));
    }

    #[test]
    fn test_selection_survives_insert_above() {
        let mut state = AppState::new();
        state.select_first(&rows(&[4, 6]));
        assert_eq!(state.ui_state.selected, Some(SeqId(4)));

        let list = rows(&[2, 3, 4, 6]);
        state.sync_selection(&list);
        assert_eq!(state.selected_position(&list), Some(2));
    }

    #[test]
    fn test_removed_selection_moves_to_next_row() {
        let mut state = AppState::new();
        state.ui_state.follow = false;
        state.ui_state.selected = Some(SeqId(5));

        state.sync_selection(&rows(&[3, 7, 9]));
        assert_eq!(state.ui_state.selected, Some(SeqId(7)));

        state.ui_state.selected = Some(SeqId(20));
        state.sync_selection(&rows(&[3, 7, 9]));
        assert_eq!(state.ui_state.selected, Some(SeqId(9)));

        state.sync_selection(&[]);
        assert_eq!(state.ui_state.selected, None);
    }

    #[test]
    fn test_scroll_keeps_selection_visible() {
        let list = rows(&(0..50).collect::<Vec<_>>());
        let mut state = AppState::new();
        state.select_last(&list);
        state.scroll_to_selection(&list, 10);
        assert_eq!(state.ui_state.scroll, 40);

        state.move_selection(&list, -15);
        state.scroll_to_selection(&list, 10);
        assert_eq!(state.ui_state.scroll, 34);

        state.select_first(&list);
        state.scroll_to_selection(&list, 10);
        assert_eq!(state.ui_state.scroll, 0);
    }

    #[test]
    fn test_pointer_hits_rows_in_list_area() {
        let list = rows(&(10..40).collect::<Vec<_>>());
        let mut state = AppState::new();
        state.ui_state.list_area = Some(Rect::new(1, 4, 60, 10));
        state.ui_state.scroll = 5;

        // First drawn row is list[5]
        assert_eq!(
            state.pointer_action(&list, Pointer::Open { column: 2, row: 4 }),
            Some(Action::Open(SeqId(15)))
        );
        assert_eq!(
            state.pointer_action(&list, Pointer::Remove { column: 60, row: 6 }),
            Some(Action::Remove(SeqId(17)))
        );

        // Border and header cells are not rows
        assert_eq!(state.pointer_action(&list, Pointer::Open { column: 0, row: 4 }), None);
        assert_eq!(state.pointer_action(&list, Pointer::Open { column: 2, row: 14 }), None);
        assert_eq!(
            state.pointer_action(&list, Pointer::ScrollDown),
            Some(Action::SelectDown(WHEEL_STEP))
        );
    }

    #[test]
    fn test_pointer_ignored_below_last_row_and_under_overlays() {
        let list = rows(&[1, 2]);
        let mut state = AppState::new();
        state.ui_state.list_area = Some(Rect::new(1, 1, 40, 10));
        assert_eq!(state.pointer_action(&list, Pointer::Open { column: 3, row: 5 }), None);

        state.ui_state.help_visible = true;
        assert_eq!(state.pointer_action(&list, Pointer::Open { column: 3, row: 1 }), None);
        assert_eq!(state.pointer_action(&list, Pointer::ScrollUp), None);

        state.ui_state.help_visible = false;
        state.ui_state.list_area = None;
        assert_eq!(state.pointer_action(&list, Pointer::Open { column: 3, row: 1 }), None);
    }

    #[test]
    fn test_status_notice_expires() {
        let mut state = AppState::new();
        assert!(!state.tick());

        state.show_status("Copied message 4".to_string());
        for _ in 1..STATUS_TICKS {
            assert!(!state.tick());
        }
        assert!(state.ui_state.status_message.is_some());
        assert!(state.tick());
        assert_eq!(state.ui_state.status_message, None);
    }

    #[test]
    fn test_close_overlay_order() {
        let mut state = AppState::new();
        state.ui_state.help_visible = true;
        assert!(state.overlay_open());
        assert!(state.close_overlay());
        assert!(!state.overlay_open());
        assert!(!state.close_overlay());
    }
}
