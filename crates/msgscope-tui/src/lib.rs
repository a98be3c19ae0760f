//! TUI components for msgscope
//!
//! This crate provides the terminal message console: the row list the
//! console engine drives, state management, clipboard access, keybindings, event handling and
//! UI components.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod sink;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, PAGE_SIZE, UiState};
pub use clipboard::MessageClipboard;
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use sink::{ConsoleRow, RowSink};
pub use tui::{Event, EventHandler, Pointer, Tui, restore_terminal};
pub use ui::components::{DetailOverlay, HelpOverlay, SeverityBar, StatsBar, StatusBar};
pub use ui::screens::ConsoleScreen;
pub use ui::{Layout, Theme};
