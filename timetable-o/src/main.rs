/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use timetable_o::generator::TimetableGenerator;
use timetable_o::snapshot::Snapshot;
use timetable_o::store::{MemoryStore, ScheduleStore, SqliteStore};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Timetable-O teaching-session scheduler.
///
/// Example:
///   timetable-o generate --snapshot term.yaml --db timetable.db
///   timetable-o show --db timetable.db
#[derive(Debug, Parser)]
#[command(
    name = "timetable-o",
    about = "Timetable-O – greedy teaching-session scheduler",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Allocate every preference and replace the active timetable.
    Generate(GenerateArgs),

    /// Print the active timetable.
    Show {
        /// Path to the SQLite timetable database.
        #[arg(short = 'd', long = "db", default_value = "timetable.db")]
        db: PathBuf,
    },

    /// Print the snapshot's preferences grouped by teacher.
    Preferences {
        /// Path to the YAML snapshot.
        #[arg(short = 's', long = "snapshot")]
        snapshot: PathBuf,
    },
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Path to the YAML snapshot (teachers, subjects, rooms, slots, preferences).
    #[arg(short = 's', long = "snapshot")]
    snapshot: PathBuf,

    /// Path to the SQLite timetable database.
    #[arg(short = 'd', long = "db", default_value = "timetable.db")]
    db: PathBuf,

    /// Allocate and report without touching the database.
    #[arg(short = 'n', long = "dry-run", default_value_t = false)]
    dry_run: bool,

    /// Abandon the run if it takes longer than this many seconds.
    #[arg(short = 't', long = "timeout-secs")]
    timeout_secs: Option<u64>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Show { db } => show(db),
        Command::Preferences { snapshot } => preferences(snapshot),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns `Ok(false)` when the run completed but placed nothing.
async fn generate(args: GenerateArgs) -> Result<bool> {
    info!(
        snapshot     = %args.snapshot.display(),
        db           = %args.db.display(),
        dry_run      = args.dry_run,
        timeout_secs = ?args.timeout_secs,
        "Configuration"
    );

    let snapshot = Snapshot::load_from_file(&args.snapshot)?;

    let store: Arc<dyn ScheduleStore> = if args.dry_run {
        warn!("Dry run: the active timetable will not be modified");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            SqliteStore::open(&args.db)
                .with_context(|| format!("Cannot open database: {}", args.db.display()))?,
        )
    };
    let generator = Arc::new(TimetableGenerator::new(store));
    let worker = Arc::clone(&generator);

    // Allocation is CPU-bound and synchronous; keep it off the async workers.
    let run = tokio::task::spawn_blocking(move || worker.generate_from_snapshot(&snapshot));
    let joined = match args.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
            Ok(joined) => joined,
            Err(_) => {
                // The blocking task cannot be cancelled; it may already be
                // inside its commit.
                generator.abandon();
                anyhow::bail!(
                    "Timetable generation exceeded {secs}s; \
                     the active timetable may or may not have been replaced"
                );
            }
        },
        None => run.await,
    };
    let report = joined
        .context("Timetable generation task panicked")?
        .context("Timetable generation failed")?;

    if report.success {
        info!(
            sessions = report.timetable.len(),
            deadlocks = report.deadlocks.len(),
            "Timetable generated"
        );
    } else {
        warn!(
            deadlocks = report.deadlocks.len(),
            "No session could be placed; active timetable unchanged"
        );
    }
    print_json(&report)?;
    Ok(report.success)
}

fn show(db: PathBuf) -> Result<bool> {
    let store = SqliteStore::open(&db)
        .with_context(|| format!("Cannot open database: {}", db.display()))?;
    let generator = TimetableGenerator::new(Arc::new(store));
    let published = generator
        .published()
        .context("Cannot read the active timetable")?;
    print_json(&published)?;
    Ok(true)
}

fn preferences(path: PathBuf) -> Result<bool> {
    let snapshot = Snapshot::load_from_file(&path)?;
    print_json(&snapshot.preferences_by_teacher())?;
    Ok(true)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Cannot serialise output")?;
    println!("{out}");
    Ok(())
}
