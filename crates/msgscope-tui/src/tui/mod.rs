//! Terminal UI handling

mod event;
mod terminal;

pub use event::{Event, EventHandler, Pointer, translate};
pub use terminal::{Tui, restore_terminal};
