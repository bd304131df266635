// src/main.rs

use anyhow::Context;
use leetbuddy::constants::{DB_PATH_DEFAULT, DB_PATH_ENV, SNAPSHOT_PATH};
use leetbuddy::{database, importer};
use log::{error, info};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("LeetBuddy database migration");

    let snapshot = Path::new(SNAPSHOT_PATH);
    let db_path = std::env::var(DB_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DB_PATH_DEFAULT));
    info!("Source: {}", snapshot.display());
    info!("Target: {}", db_path.display());

    if !snapshot.exists() {
        error!("{} not found", snapshot.display());
        error!("Place the snapshot in the processed-data/ directory and re-run");
        return ExitCode::FAILURE;
    }

    match migrate(snapshot, &db_path) {
        Ok(()) => {
            info!("All done. The database is ready to use.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Migration failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn migrate(snapshot: &Path, db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    database::init_db(&conn).context("failed to initialize schema")?;

    let data = importer::load_snapshot(snapshot).context("failed to load snapshot")?;
    let report = importer::run(&mut conn, data).context("migration aborted, rolled back")?;

    info!("Migration completed successfully");
    info!(
        "Problems: {} imported, {} skipped",
        report.problems_imported, report.problems_skipped
    );
    info!("Solutions: {}", report.solutions);
    info!("Topics: {}", report.topics);
    info!("Companies: {}", report.companies);
    info!("Roadmaps: {}", report.roadmaps);

    Ok(())
}
