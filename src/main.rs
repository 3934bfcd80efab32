use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use std::env;
use std::fs;
use std::path::PathBuf;

use harvest_ledger::{
    build_backup_payload, commit_trip, price_per_pound, trips_sorted, AppState, BackupReconciler,
    CommitOutcome, DuplicateDetector, Extractor, ImportMode, Store, TripInput,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("parse") => run_parse(&args[2..]),
        Some("add") => run_add(&args[2..]),
        Some("import") => run_import(&args[2..]),
        Some("export") => run_export(&args[2..]),
        Some("list") => run_list(),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Harvest Ledger {}", harvest_ledger::VERSION);
    println!();
    println!("Usage:");
    println!("  harvest-ledger parse <text-file>");
    println!("      Extract a draft trip from pasted receipt text");
    println!("  harvest-ledger add <date> <dealer> <pounds> <amount> [area] [--force]");
    println!("      Commit a trip; duplicates ask for --force");
    println!("  harvest-ledger import <backup.json> (--merge | --replace) [--no-safety]");
    println!("      Reconcile a backup file with the live ledger");
    println!("  harvest-ledger export [path]");
    println!("      Write a backup snapshot of the live ledger");
    println!("  harvest-ledger list");
    println!("      Show stored trips, newest first");
    println!();
    println!("The store location comes from HARVEST_LEDGER_DB (default ./harvest-ledger.db)");
}

fn db_path() -> PathBuf {
    env::var("HARVEST_LEDGER_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("harvest-ledger.db"))
}

fn run_parse(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!("Usage: harvest-ledger parse <text-file>");
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read text file: {}", path))?;

    let store = Store::open(db_path())?;
    let state = store.load_state()?;

    let extractor = Extractor::new();
    let draft = extractor.extract(&text, &state.dealers, &state.areas);

    println!("Draft from {} ({} chars):", path, text.len());
    println!(
        "  Date:   {:<16} [{}]",
        draft.date_mdy().unwrap_or_default(),
        draft.date.confidence_label()
    );
    println!(
        "  Dealer: {:<16} [{}]",
        draft.dealer.value().cloned().unwrap_or_default(),
        draft.dealer.confidence_label()
    );
    println!(
        "  Pounds: {:<16} [{}]",
        draft
            .pounds
            .value()
            .map(|v| v.to_string())
            .unwrap_or_default(),
        draft.pounds.confidence_label()
    );
    println!(
        "  Amount: {:<16} [{}]",
        draft
            .amount
            .value()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default(),
        draft.amount.confidence_label()
    );
    println!(
        "  Area:   {:<16} [{}]",
        draft.area.value().cloned().unwrap_or_default(),
        draft.area.confidence_label()
    );
    println!();
    println!("Review and commit with: harvest-ledger add <date> <dealer> <pounds> <amount> [area]");

    Ok(())
}

fn run_add(args: &[String]) -> Result<()> {
    let force = args.iter().any(|a| a == "--force");
    let fields: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [date, dealer, pounds, amount, rest @ ..] = fields.as_slice() else {
        bail!("Usage: harvest-ledger add <date> <dealer> <pounds> <amount> [area] [--force]");
    };

    let store = Store::open(db_path())?;
    let mut state = store.load_state()?;

    let input = TripInput {
        date: date.to_string(),
        dealer: dealer.to_string(),
        pounds: pounds.to_string(),
        amount: amount.to_string(),
        area: rest.first().map(|s| s.to_string()).unwrap_or_default(),
        ..TripInput::default()
    };

    let outcome = commit_trip(&mut state, &DuplicateDetector::new(), &input, None, force)
        .map_err(anyhow::Error::from)?;

    match outcome {
        CommitOutcome::Saved(trip) => {
            store.save_state(&state)?;
            println!(
                "Saved: {} | {} | {} lbs | ${:.2}",
                trip.harvest_date, trip.dealer, trip.pounds, trip.amount
            );
        }
        CommitOutcome::DuplicateConflict { existing, .. } => {
            println!("This looks like a duplicate trip:");
            println!(
                "  {} | {} | {} lbs | ${:.2}",
                existing.harvest_date, existing.dealer, existing.pounds, existing.amount
            );
            println!("Nothing saved. Re-run with --force to save anyway.");
        }
    }

    Ok(())
}

fn run_import(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!("Usage: harvest-ledger import <backup.json> (--merge | --replace) [--no-safety]");
    };
    let mode = if args.iter().any(|a| a == "--replace") {
        ImportMode::Replace
    } else if args.iter().any(|a| a == "--merge") {
        ImportMode::Merge
    } else {
        bail!("Choose a policy: --merge (skip likely duplicates) or --replace (swap everything)");
    };
    let no_safety = args.iter().any(|a| a == "--no-safety");

    // The file read either yields the whole text or fails as a whole;
    // nothing has been touched yet either way.
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file: {}", path))?;
    let raw: serde_json::Value =
        serde_json::from_str(&text).context("Backup file is not valid JSON")?;

    let store = Store::open(db_path())?;
    let mut state = store.load_state()?;

    let reconciler = BackupReconciler::new();
    let backup = match reconciler.normalize(&raw) {
        Ok(backup) => backup,
        Err(report) => {
            for e in &report.errors {
                eprintln!("Error: {}", e);
            }
            bail!("Import refused; nothing was changed");
        }
    };
    for w in &backup.warnings {
        println!("Warning: {}", w);
    }

    // Offer a way back before a destructive replace
    if mode == ImportMode::Replace && state.has_data() && !no_safety {
        let safety = write_backup_file(&state, "harvest_safety_before_restore", None)?;
        println!("Safety backup written to {}", safety.display());
    }

    let summary = reconciler.import(&mut state, &backup, mode);
    store.save_state(&state)?;

    println!("{}", summary.summary());
    Ok(())
}

fn run_export(args: &[String]) -> Result<()> {
    let store = Store::open(db_path())?;
    let state = store.load_state()?;

    let explicit = args.first().map(PathBuf::from);
    let path = write_backup_file(&state, "harvest_backup", explicit)?;
    println!(
        "Exported {} trips, {} areas, {} dealers to {}",
        state.trips.len(),
        state.areas.len(),
        state.dealers.len(),
        path.display()
    );
    Ok(())
}

fn run_list() -> Result<()> {
    let store = Store::open(db_path())?;
    let state = store.load_state()?;

    if state.trips.is_empty() {
        println!("No trips recorded yet.");
        return Ok(());
    }

    println!("{} trips:", state.trips.len());
    for trip in trips_sorted(&state) {
        println!(
            "  {} | {:<24} | {:>7.1} lbs | ${:>9.2} | ${:>5.2}/lb | {}",
            trip.harvest_date,
            trip.dealer,
            trip.pounds,
            trip.amount,
            price_per_pound(trip.pounds, trip.amount),
            trip.area.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn write_backup_file(
    state: &AppState,
    prefix: &str,
    explicit: Option<PathBuf>,
) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p,
        None => {
            let stamp = Local::now().format("%Y-%m-%d_%H%M");
            PathBuf::from(format!("{}_{}.json", prefix, stamp))
        }
    };
    let payload = build_backup_payload(state, Utc::now());
    let json = serde_json::to_string_pretty(&payload).context("Failed to serialize backup")?;
    fs::write(&path, json).with_context(|| format!("Failed to write backup: {:?}", path))?;
    Ok(path)
}
