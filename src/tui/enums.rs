//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    EditTask,
    BatchAdd,
    Settings,
    Help,
    Confirm,
}

/// Destructive action waiting for a yes/no answer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    DeleteTask { id: i64, title: String },
    DeleteCompleted(Vec<i64>),
}

impl ConfirmAction {
    /// Sentence shown in the confirmation dialog.
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteTask { id, title } => format!("Delete task #{id} \"{title}\""),
            ConfirmAction::DeleteCompleted(ids) => format!("Delete {} completed task(s)", ids.len()),
        }
    }
}

/// Why the event loop stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppExit {
    /// The main view was closed; the tray rule decides what happens next.
    Close,
    /// Exit the process unconditionally.
    Quit,
}
