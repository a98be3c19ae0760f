//! Application state and actions

mod action;
mod state;

pub use action::Action;
pub use state::{AppState, PAGE_SIZE, STATUS_TICKS, UiState, WHEEL_STEP};
