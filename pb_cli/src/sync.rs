use std::path::PathBuf;

use anyhow::Context;
use pb_parser::ProfileIndex;
use pb_schema::ExportedAccount;
use pb_sheet::{sync_accounts, JsonFileStore, Reconciler, SheetLayout, SyncOutcome};

#[derive(Debug)]
pub struct SyncArgs {
    pub input: PathBuf,
    pub sender: String,
    pub store: PathBuf,
    pub layout: Option<PathBuf>,
    pub single: bool,
    pub mode: String,
}

pub fn run_sync(args: &SyncArgs) -> anyhow::Result<()> {
    let index = pb_parser::parse_file(&args.input)
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .with_context(|| format!("parse failed: {}", args.input.display()))?;
    for diagnostic in index.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }

    let layout = match &args.layout {
        Some(path) => SheetLayout::load(path)
            .with_context(|| format!("failed to load layout: {}", path.display()))?,
        None => SheetLayout::default(),
    };
    let store = JsonFileStore::open(&args.store)
        .with_context(|| format!("failed to open store: {}", args.store.display()))?;
    let mut reconciler = Reconciler::new(store, layout).context("invalid layout")?;

    let accounts = select_accounts(&index, args);
    match sync_accounts(&mut reconciler, &args.sender, &accounts) {
        SyncOutcome::NothingToDo => {
            println!(
                "No boss personal bests found in {}. Upload your $rsprofile--1.properties \
                 with at least one boss personal best.",
                args.input.display()
            );
        }
        SyncOutcome::Processed(report) => {
            println!("{}", report.summary());
            log::info!(
                "sheet {:?} saved to {}",
                reconciler.layout().sheet,
                reconciler.store().path().display()
            );
            let failed = report.failed().count();
            if failed > 0 {
                anyhow::bail!("{failed} account(s) were not fully synced");
            }
        }
    }
    Ok(())
}

/// With `--single`, one account: the preferred one, named after the sender
/// when the profile has no display name for it.
fn select_accounts(index: &ProfileIndex, args: &SyncArgs) -> Vec<ExportedAccount> {
    if !args.single {
        return index.select_all_named();
    }
    index
        .select_preferred(&args.mode)
        .and_then(|p| {
            let rsn = p.rsn.unwrap_or_else(|| args.sender.clone());
            ExportedAccount::new(rsn, p.boss_data)
        })
        .into_iter()
        .collect()
}
