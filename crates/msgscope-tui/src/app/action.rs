use msgscope_core::{SeqId, Severity};

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Filters
    ToggleSeverity(Severity),

    // Selection
    SelectUp(usize),
    SelectDown(usize),
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,

    // Entry actions
    Inspect,
    RemoveSelected,
    Open(SeqId),
    Remove(SeqId),
    CopySelected,

    // UI toggles
    ToggleFollow,
    ToggleStats,
    TogglePanel,
    ToggleHelp,
    CloseOverlay,

    Render,
}
