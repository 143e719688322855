use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Status, TicketId};

/// Persisted board UI state (written to kantui.state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiState {
    /// Per-column state, keyed by status
    #[serde(default)]
    pub columns: HashMap<Status, ColumnUiState>,
}

/// Per-column UI state
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ColumnUiState {
    /// Selected ticket, restored by identity
    #[serde(default)]
    pub selected: Option<TicketId>,
}

impl UiState {
    pub fn selected(&self, status: Status) -> Option<TicketId> {
        self.columns.get(&status).and_then(|c| c.selected)
    }
}

/// Error type for UI state persistence
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write state: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read the saved UI state. Missing or unreadable state yields `None`.
pub fn read_ui_state(path: &Path) -> Option<UiState> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable ui state");
            None
        }
    }
}

/// Write the UI state
pub fn write_ui_state(path: &Path, state: &UiState) -> Result<(), StateError> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}
