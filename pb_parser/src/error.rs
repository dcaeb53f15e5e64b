use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Pattern,
    IO,
}

impl ParseErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            "E1001" => Self::Pattern,
            "E2001" => Self::IO,
            _ => Self::IO,
        }
    }
}

/// A failure that stops the whole parse. Problems with individual lines are
/// reported as [`Diagnostic`]s instead.
#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ParseError {
    pub code: &'static str,
    pub kind: ParseErrorKind,
    pub message: String,
    pub file: Option<String>,
}

impl ParseError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: ParseErrorKind::from_code(code),
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The personal-best value is not a number.
    InvalidTime { boss: String, value: String },
    /// The personal-best value parsed but is below zero.
    NegativeTime { boss: String, value: String },
    /// The personal-best value is above [`MAX_SECONDS`](crate::MAX_SECONDS).
    TimeOutOfRange { boss: String, value: String },
    /// The account has personal bests but no `displayName` line.
    MissingDisplayName { account_id: String },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTime { .. } => "W1001",
            Self::NegativeTime { .. } => "W1002",
            Self::TimeOutOfRange { .. } => "W1003",
            Self::MissingDisplayName { .. } => "W2001",
        }
    }
}

/// A non-fatal finding. The entry it describes was skipped and parsing went
/// on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.kind.code();
        match &self.kind {
            DiagnosticKind::InvalidTime { boss, value } => write!(
                f,
                "{code}: invalid time {value:?} for {boss:?} (line {})",
                self.line
            ),
            DiagnosticKind::NegativeTime { boss, value } => write!(
                f,
                "{code}: negative time {value:?} for {boss:?} (line {})",
                self.line
            ),
            DiagnosticKind::TimeOutOfRange { boss, value } => write!(
                f,
                "{code}: time {value:?} for {boss:?} is out of range (line {})",
                self.line
            ),
            DiagnosticKind::MissingDisplayName { account_id } => write!(
                f,
                "{code}: account {account_id} has personal bests but no display name (line {})",
                self.line
            ),
        }
    }
}
