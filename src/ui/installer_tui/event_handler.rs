/// Events that can occur in the installer TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Open the add-path prompt
    BeginAdd,
    /// Start draining the queue
    Start,
    /// Stop after the current installer
    Stop,
    /// Clear the queue
    Clear,
    /// Move the queue selection up
    SelectUp,
    /// Move the queue selection down
    SelectDown,
    /// Close the modal notice
    Dismiss,
    /// Typed character in the add prompt
    Input(char),
    Backspace,
    SubmitInput,
    CancelInput,
    /// Bracketed paste (terminal drag-and-drop)
    Paste(String),
    /// No action
    None,
}
