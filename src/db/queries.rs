pub const CREATE_KV_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS kv_entries (
  key        TEXT PRIMARY KEY,
  value      TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#;

pub const CREATE_REPORTS: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
  id           INTEGER PRIMARY KEY AUTOINCREMENT,
  date         TEXT NOT NULL UNIQUE,
  generated_at INTEGER NOT NULL,
  md_path      TEXT NOT NULL,
  json_path    TEXT NOT NULL
);
"#;

pub const INDEX_REPORTS_DATE: &str =
    "CREATE INDEX IF NOT EXISTS idx_reports_date ON reports(date);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![CREATE_KV_ENTRIES, CREATE_REPORTS, INDEX_REPORTS_DATE]
}
