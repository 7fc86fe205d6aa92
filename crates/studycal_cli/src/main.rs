//! Terminal viewer for the month calendar.
//!
//! # Responsibility
//! - Render one month grid from the local study store.
//! - Exercise the same lookup path the mobile UI uses.

mod render;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use studycal_core::config::resolve_db_path;
use studycal_core::{
    clamp_to_today, default_log_level, init_logging, CalendarController, DateKey, LookupConfig,
    SqliteStudyStore, StudiedDateLookup, UserIdentity, WEEKDAY_LABELS_EN,
};

const DB_FILE_NAME: &str = "studycal.sqlite3";

#[derive(Parser)]
#[command(name = "studycal")]
#[command(about = "Print a month calendar with studied days marked by `*`")]
struct Cli {
    /// Month to show (YYYYMM). Defaults to the current month.
    #[arg(long)]
    month: Option<String>,

    /// Username whose study records are looked up
    #[arg(short, long)]
    user: Option<String>,

    /// Study store file. Defaults to STUDYCAL_DB_PATH or a temp-dir file.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rotating log files
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(anyhow::Error::msg)?;
    }

    let today = DateKey::today();
    let anchor = match cli.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => today,
    };
    let user = cli
        .user
        .map(UserIdentity::new)
        .transpose()
        .context("invalid --user")?;

    let db_path = cli.db.unwrap_or_else(|| resolve_db_path(DB_FILE_NAME));
    let store = SqliteStudyStore::open(&db_path)
        .with_context(|| format!("failed to open study store at {}", db_path.display()))?;
    let lookup = StudiedDateLookup::with_config(Arc::new(store), LookupConfig::from_env());

    let mut controller =
        CalendarController::new(today, today).with_weekday_labels(WEEKDAY_LABELS_EN);
    let query = controller.refresh(clamp_to_today(anchor, today));
    let result = lookup.fetch_studied_days(user.as_ref(), query.anchor()).await;
    if let Err(err) = &result {
        eprintln!("warning: {err}; showing the month without markers");
    }
    controller.apply_studied(query, result);

    info!(
        "event=cli_render module=cli status=ok month={} studied={}",
        query.anchor().year_month_prefix() / 100,
        controller.studied().len()
    );
    print!("{}", render::render_month(&controller.view()));
    Ok(())
}

/// Parses `YYYYMM` into the first day of that month.
fn parse_month(raw: &str) -> Result<DateKey> {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(&format!("{trimmed}01"), "%Y%m%d")
        .with_context(|| format!("--month must be YYYYMM, got `{trimmed}`"))?;
    Ok(DateKey::from_naive_date(date)?)
}
