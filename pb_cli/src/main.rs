use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pb_parser::STANDARD_MODE;

mod sync;

#[derive(Debug, Parser)]
#[command(name = "pbsync")]
#[command(about = "Sync RuneLite personal bests into a best-times sheet", long_about = None)]
struct Cli {
    /// Log every decision (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the exportable accounts of a profile as JSON
    Parse {
        input: PathBuf,
        /// Only accounts of this type, keyed by display name
        #[arg(long)]
        mode: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a profile's personal bests into a sheet file
    Sync {
        input: PathBuf,
        /// Name of the uploader, written to the first identity column
        #[arg(long)]
        sender: String,
        /// JSON grid file standing in for the remote sheet
        #[arg(long)]
        store: PathBuf,
        /// JSON sheet layout; defaults apply to missing keys
        #[arg(long)]
        layout: Option<PathBuf>,
        /// Sync one account only, preferring --mode
        #[arg(long)]
        single: bool,
        #[arg(long, default_value = STANDARD_MODE)]
        mode: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse {
            input,
            mode,
            output,
        } => {
            let index = pb_parser::parse_file(&input)
                .map_err(|e| anyhow::anyhow!(e.to_string()))
                .with_context(|| format!("parse failed: {}", input.display()))?;
            if !index.has_personal_bests() {
                log::warn!("no boss personal bests found in {}", input.display());
            }

            let json = match mode {
                Some(mode) => serde_json::to_string_pretty(&index.select_by_mode(&mode)),
                None => serde_json::to_string_pretty(&index.select_all_named()),
            }
            .context("failed to serialize accounts")?;

            match output {
                Some(out_path) => fs::write(&out_path, json)
                    .with_context(|| format!("failed to write: {}", out_path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Sync {
            input,
            sender,
            store,
            layout,
            single,
            mode,
        } => {
            warn_if_not_profile(&input);
            let args = sync::SyncArgs {
                input,
                sender,
                store,
                layout,
                single,
                mode,
            };
            sync::run_sync(&args)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn warn_if_not_profile(input: &Path) {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !pb_parser::is_profile_upload(&name) {
        log::warn!("{name:?} does not look like an rsprofile .properties export");
    }
}
