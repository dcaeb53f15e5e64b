use log::{info, warn};
use pb_schema::ExportedAccount;

use crate::{PlayerIdentity, Reconciler, Reconciliation, SyncError, TableStore};

#[derive(Debug)]
pub struct AccountOutcome {
    pub rsn: String,
    pub result: Result<Reconciliation, SyncError>,
}

impl AccountOutcome {
    pub fn improved(&self) -> u32 {
        self.result.as_ref().map_or(0, |r| r.improved)
    }

    /// Ok and with no failed cell writes.
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(r) if r.failures.is_empty())
    }

    pub fn summary(&self) -> String {
        match &self.result {
            Ok(r) if r.failures.is_empty() => {
                format!("{}: improved {} boss time(s)", self.rsn, r.improved)
            }
            Ok(r) => {
                let columns: Vec<&str> = r.failures.iter().map(|f| f.column.as_str()).collect();
                format!(
                    "{}: improved {} boss time(s), failed to write {}",
                    self.rsn,
                    r.improved,
                    columns.join(", ")
                )
            }
            Err(e) => format!("{}: failed: {e}", self.rsn),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<AccountOutcome>,
}

impl BatchReport {
    pub fn total_improved(&self) -> u32 {
        self.outcomes.iter().map(AccountOutcome::improved).sum()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &AccountOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &AccountOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = self.outcomes.iter().map(AccountOutcome::summary).collect();
        lines.push(format!(
            "{} account(s) updated, {} failed, {} boss time(s) improved",
            self.succeeded().count(),
            self.failed().count(),
            self.total_improved()
        ));
        lines.join("\n")
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    /// The file had no exportable personal bests.
    NothingToDo,
    Processed(BatchReport),
}

/// Reconciles each account in turn under the sender's identity.
///
/// A failure ends only the account it happened in. Accounts already written
/// stay written.
pub fn sync_accounts<S: TableStore>(
    reconciler: &mut Reconciler<S>,
    sender: &str,
    accounts: &[ExportedAccount],
) -> SyncOutcome {
    if accounts.is_empty() {
        info!("no accounts with personal bests; nothing to do");
        return SyncOutcome::NothingToDo;
    }

    let mut report = BatchReport::default();
    for account in accounts {
        let identity = PlayerIdentity::new(sender, account.rsn.clone());
        let result = reconciler.reconcile(&identity, account.boss_data.as_slice());
        if let Err(e) = &result {
            warn!("{identity}: {e}");
        }
        report.outcomes.push(AccountOutcome {
            rsn: account.rsn.clone(),
            result,
        });
    }
    SyncOutcome::Processed(report)
}
