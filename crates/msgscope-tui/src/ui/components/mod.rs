mod detail_overlay;
mod help_overlay;
mod severity_bar;
mod stats_bar;
mod status_bar;

pub use detail_overlay::DetailOverlay;
pub use help_overlay::HelpOverlay;
pub use severity_bar::SeverityBar;
pub use stats_bar::StatsBar;
pub use status_bar::{StatusBar, console_hints};
