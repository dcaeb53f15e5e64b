use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{column_index, LayoutError};

/// Leading columns of every row, before the boss columns.
pub const IDENTITY_COLUMNS: usize = 2;

/// Which identity cells have to match for a row to belong to a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMatch {
    /// Sender and RSN both match exactly.
    #[default]
    SenderAndRsn,
    /// Only the sender matches. The RSN cell is refreshed when it changes.
    SenderOnly,
}

/// How the sheet is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    pub sheet: String,
    /// Header labels of the sender and RSN columns.
    pub identity_labels: [String; IDENTITY_COLUMNS],
    /// Right edge of the read window, in column letters.
    pub last_column: String,
    pub identity_match: IdentityMatch,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: "BestTimes".to_string(),
            identity_labels: ["Discord Name".to_string(), "RSN".to_string()],
            last_column: "ZZ".to_string(),
            identity_match: IdentityMatch::default(),
        }
    }
}

impl SheetLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LayoutError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let layout: Self = serde_json::from_slice(&bytes).map_err(|source| LayoutError::Json {
            path: path.display().to_string(),
            source,
        })?;
        layout.last_col()?;
        Ok(layout)
    }

    /// Zero-based index of `last_column`.
    pub fn last_col(&self) -> Result<usize, LayoutError> {
        column_index(&self.last_column).ok_or_else(|| LayoutError::LastColumn(self.last_column.clone()))
    }

}

/// Who a row belongs to: the uploader as the transport names them, plus the
/// in-game name from the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub sender: String,
    pub rsn: String,
}

impl PlayerIdentity {
    pub fn new(sender: impl Into<String>, rsn: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            rsn: rsn.into(),
        }
    }

    pub fn fields(&self) -> [&str; IDENTITY_COLUMNS] {
        [self.sender.as_str(), self.rsn.as_str()]
    }

    pub(crate) fn matches(&self, row: &[String], policy: IdentityMatch) -> bool {
        let cell = |i: usize| row.get(i).map_or("", String::as_str);
        match policy {
            IdentityMatch::SenderAndRsn => cell(0) == self.sender && cell(1) == self.rsn,
            IdentityMatch::SenderOnly => cell(0) == self.sender,
        }
    }
}

impl std::fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.sender, self.rsn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn default_layout_reads_a1_to_zz() {
        let layout = SheetLayout::default();
        assert_eq!(layout.last_col().unwrap(), 701);
        assert_eq!(layout.identity_labels, ["Discord Name".to_string(), "RSN".to_string()]);
    }

    #[test]
    fn partial_layout_file_uses_defaults() {
        let path = env::temp_dir().join(format!("pb_sheet_layout_partial_{}.json", std::process::id()));
        fs::write(&path, r#"{"sheet":"Clan PBs","identity_match":"sender_only"}"#).unwrap();

        let layout = SheetLayout::load(&path).unwrap();
        assert_eq!(layout.sheet, "Clan PBs");
        assert_eq!(layout.identity_match, IdentityMatch::SenderOnly);
        assert_eq!(layout.identity_labels[1], "RSN");
        assert_eq!(layout.last_column, "ZZ");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn identity_labels_come_from_the_file() {
        let path = env::temp_dir().join(format!("pb_sheet_layout_labels_{}.json", std::process::id()));
        fs::write(&path, r#"{"identity_labels":["Discord ID","Username"]}"#).unwrap();

        let layout = SheetLayout::load(&path).unwrap();
        assert_eq!(layout.identity_labels, ["Discord ID".to_string(), "Username".to_string()]);
        assert_eq!(layout.sheet, "BestTimes");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unknown_layout_key_is_rejected() {
        let path = env::temp_dir().join(format!("pb_sheet_layout_unknown_{}.json", std::process::id()));
        fs::write(&path, r#"{"rsn_label":"Username"}"#).unwrap();

        let err = SheetLayout::load(&path).unwrap_err();
        assert!(matches!(err, LayoutError::Json { .. }));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn bad_last_column_is_rejected() {
        let path = env::temp_dir().join(format!("pb_sheet_layout_bad_{}.json", std::process::id()));
        fs::write(&path, r#"{"last_column":"Z9"}"#).unwrap();

        let err = SheetLayout::load(&path).unwrap_err();
        assert!(matches!(err, LayoutError::LastColumn(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn identity_match_policies() {
        let id = PlayerIdentity::new("alice", "Alice Main");
        let row = vec!["alice".to_string(), "Old Name".to_string()];

        assert!(!id.matches(&row, IdentityMatch::SenderAndRsn));
        assert!(id.matches(&row, IdentityMatch::SenderOnly));
        assert!(!id.matches(&[], IdentityMatch::SenderOnly));
    }
}
