pub mod agenda;
pub mod filter;
pub mod report;
pub mod stats;

use crate::analyzer::report::{DailyReport, SavedReport};
use crate::config::Config;
use crate::db::Database;
use crate::model::Routine;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::info;

pub fn generate_and_store_report(
    config: &Config,
    database: &Database,
    routines: &[Routine],
    date: NaiveDate,
) -> Result<(DailyReport, SavedReport)> {
    let report = report::build_daily_report(date, routines);
    let saved = report::save_report_files(&report, &config.report_dir)?;

    database.upsert_report_meta(
        date,
        Utc::now().timestamp(),
        &saved.markdown_path.display().to_string(),
        &saved.json_path.display().to_string(),
    )?;

    info!(
        date = %report.date,
        agenda_items = report.agenda.items.len(),
        path = %saved.markdown_path.display(),
        "report generated"
    );

    Ok((report, saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples::sample_routines;
    use tempfile::tempdir;

    #[test]
    fn report_files_are_recorded_in_the_database() {
        let dir = tempdir().expect("tempdir");
        let config = Config {
            report_dir: dir.path().join("reports"),
            db_path: dir.path().join("routines.db"),
            ..Config::default()
        };
        let database = Database::open(&config.db_path).expect("db");
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");

        let (report, saved) =
            generate_and_store_report(&config, &database, &sample_routines(), date)
                .expect("report");

        assert!(saved.markdown_path.exists());
        assert_eq!(report.agenda.items.len(), 5);

        let latest = database
            .latest_report_meta()
            .expect("query")
            .expect("row");
        assert_eq!(latest.date, "2026-10-18");
        assert_eq!(latest.json_path, saved.json_path.display().to_string());
    }
}
