use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use pb_schema::{BossTime, BossTimes, ExportedAccount, Seconds};

use crate::{error::DiagnosticKind, parser::ProfileLine, unescape, Diagnostic};

/// Everything one export says about a single account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub declared_type: Option<String>,
    pub display_name: Option<String>,
    /// Unescaped boss label to rounded seconds.
    pub personal_bests: HashMap<String, Seconds>,
    first_pb_line: Option<usize>,
}

impl AccountRecord {
    pub fn boss_times(&self) -> BossTimes {
        self.personal_bests
            .iter()
            .map(|(boss, secs)| BossTime::new(boss.clone(), *secs))
            .collect()
    }
}

/// The caller falls back to its own name for the player when `rsn` is
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredAccount {
    pub account_id: String,
    pub rsn: Option<String>,
    pub boss_data: BossTimes,
}

/// Per-account index built from one profile export.
///
/// Repeated keys are folded last-write-wins: the profile writer rewrites a
/// value when the player records a new time, and the later line is the
/// current one.
#[derive(Debug, Clone, Default)]
pub struct ProfileIndex {
    order: Vec<String>,
    accounts: HashMap<String, AccountRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl ProfileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, line_no: usize, line: ProfileLine<'_>) {
        match line {
            ProfileLine::AccountType { id, value } => {
                self.record_mut(id).declared_type = Some(value.to_string());
            }
            ProfileLine::DisplayName { id, value } => {
                self.record_mut(id).display_name = Some(value.to_string());
            }
            ProfileLine::PersonalBest { id, boss, value } => {
                let boss = unescape(boss);
                match coerce_seconds(value) {
                    Ok(secs) => {
                        debug!("account {id}: {boss} = {secs}s (line {line_no})");
                        let record = self.record_mut(id);
                        record.first_pb_line.get_or_insert(line_no);
                        record.personal_bests.insert(boss, secs);
                    }
                    Err(TimeError::Invalid) => self.push_diagnostic(
                        line_no,
                        DiagnosticKind::InvalidTime {
                            boss,
                            value: value.to_string(),
                        },
                    ),
                    Err(TimeError::Negative) => self.push_diagnostic(
                        line_no,
                        DiagnosticKind::NegativeTime {
                            boss,
                            value: value.to_string(),
                        },
                    ),
                    Err(TimeError::OutOfRange) => self.push_diagnostic(
                        line_no,
                        DiagnosticKind::TimeOutOfRange {
                            boss,
                            value: value.to_string(),
                        },
                    ),
                }
            }
        }
    }

    /// Records a diagnostic for every account that has times but no display
    /// name. Called once after the last line.
    pub fn finish(&mut self) {
        let mut missing = Vec::new();
        for id in &self.order {
            let Some(record) = self.accounts.get(id) else {
                continue;
            };
            if record.display_name.is_none() && !record.personal_bests.is_empty() {
                missing.push((record.first_pb_line.unwrap_or(0), id.clone()));
            }
        }
        for (line, account_id) in missing {
            self.push_diagnostic(line, DiagnosticKind::MissingDisplayName { account_id });
        }
    }

    pub fn account(&self, id: &str) -> Option<&AccountRecord> {
        self.accounts.get(id)
    }

    /// Accounts in the order they first appear in the file.
    pub fn accounts(&self) -> impl Iterator<Item = (&str, &AccountRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.accounts.get(id).map(|r| (id.as_str(), r)))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_personal_bests(&self) -> bool {
        self.accounts.values().any(|r| !r.personal_bests.is_empty())
    }

    /// Accounts whose declared type equals `mode`, keyed by display name.
    ///
    /// An account without a display name is keyed by its id so its times are
    /// still reachable. Two accounts with the same display name collapse to
    /// the later one.
    pub fn select_by_mode(&self, mode: &str) -> BTreeMap<String, BossTimes> {
        let mut out = BTreeMap::new();
        for (id, record) in self.accounts_with_times() {
            if record.declared_type.as_deref() != Some(mode) {
                continue;
            }
            let key = match &record.display_name {
                Some(name) => name.clone(),
                None => {
                    debug!("account {id} has no display name, keyed by id");
                    id.to_string()
                }
            };
            out.insert(key, record.boss_times());
        }
        out
    }

    /// Every account with times and a display name, whatever its type.
    pub fn select_all_named(&self) -> Vec<ExportedAccount> {
        let mut out = Vec::new();
        for (id, record) in self.accounts_with_times() {
            let Some(name) = &record.display_name else {
                warn!("skipping account {id}: no display name");
                continue;
            };
            if let Some(account) = ExportedAccount::new(name.clone(), record.boss_times()) {
                out.push(account);
            }
        }
        out
    }

    /// The first account of type `mode` with times, or else the first
    /// account with times at all.
    pub fn select_preferred(&self, mode: &str) -> Option<PreferredAccount> {
        let (id, record) = self
            .accounts_with_times()
            .find(|(_, r)| r.declared_type.as_deref() == Some(mode))
            .or_else(|| self.accounts_with_times().next())?;
        Some(PreferredAccount {
            account_id: id.to_string(),
            rsn: record.display_name.clone(),
            boss_data: record.boss_times(),
        })
    }

    fn accounts_with_times(&self) -> impl Iterator<Item = (&str, &AccountRecord)> {
        self.accounts().filter(|(_, r)| !r.personal_bests.is_empty())
    }

    fn record_mut(&mut self, id: &str) -> &mut AccountRecord {
        if !self.accounts.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.accounts.entry(id.to_string()).or_default()
    }

    fn push_diagnostic(&mut self, line: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { line, kind };
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeError {
    Invalid,
    Negative,
    OutOfRange,
}

/// Largest personal best kept, in seconds.
pub const MAX_SECONDS: Seconds = i32::MAX as Seconds;

/// Parses a time in seconds and rounds half away from zero, which for
/// non-negative values is half-up: `179.5` becomes `180`.
pub(crate) fn coerce_seconds(value: &str) -> Result<Seconds, TimeError> {
    let secs: f64 = value.trim().parse().map_err(|_| TimeError::Invalid)?;
    if !secs.is_finite() {
        return Err(TimeError::Invalid);
    }
    if secs < 0.0 {
        return Err(TimeError::Negative);
    }
    let rounded = secs.round();
    if rounded > MAX_SECONDS as f64 {
        return Err(TimeError::OutOfRange);
    }
    Ok(rounded as Seconds)
}
