use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("range {range} cannot be used here: {reason}")]
    Range { range: String, reason: String },

    /// The remote service rejected or failed the call.
    #[error("store service error: {0}")]
    Service(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid range {input:?}: {reason}")]
pub struct RangeParseError {
    pub input: String,
    pub reason: &'static str,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid layout {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid last_column {0:?}")]
    LastColumn(String),
}

/// Where in a reconciliation a store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadTable,
    WriteHeaders,
    AppendRow,
    ReloadTable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadTable => "loading the table",
            Self::WriteHeaders => "writing headers",
            Self::AppendRow => "appending the player row",
            Self::ReloadTable => "reloading the table",
        };
        f.write_str(name)
    }
}

/// A failure that ends one account's reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store failed while {stage}: {source}")]
    Store {
        stage: Stage,
        #[source]
        source: StoreError,
    },

    #[error("table needs {needed} columns but the sheet window ends at {last_column} ({limit})")]
    ColumnLimit {
        needed: usize,
        limit: usize,
        last_column: String,
    },

    #[error("row for {identity} not found after appending it")]
    RowNotFound { identity: String },
}

impl SyncError {
    pub(crate) fn store(stage: Stage) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { stage, source }
    }
}
