pub mod queries;

use crate::persist::KeyValueBackend;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct EntryMetaRow {
    pub key: String,
    pub bytes: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetaRow {
    pub date: String,
    pub generated_at: i64,
    pub md_path: String,
    pub json_path: String,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite DB")?;
        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read stored value: {key}"))
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key)
                 DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
                params![key, value, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to write stored value: {key}"))?;

        Ok(())
    }

    pub fn entry_meta(&self, key: &str) -> Result<Option<EntryMetaRow>> {
        self.conn
            .query_row(
                "SELECT key, length(value), updated_at FROM kv_entries WHERE key = ?1",
                params![key],
                |row| {
                    Ok(EntryMetaRow {
                        key: row.get(0)?,
                        bytes: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("Failed to query stored entry metadata")
    }

    pub fn latest_report_meta(&self) -> Result<Option<ReportMetaRow>> {
        self.conn
            .query_row(
                "SELECT date, generated_at, md_path, json_path FROM reports ORDER BY date DESC LIMIT 1",
                [],
                |row| {
                    Ok(ReportMetaRow {
                        date: row.get(0)?,
                        generated_at: row.get(1)?,
                        md_path: row.get(2)?,
                        json_path: row.get(3)?,
                    })
                },
            )
            .optional()
            .context("Failed to query latest report")
    }

    pub fn upsert_report_meta(
        &self,
        date: NaiveDate,
        generated_at: i64,
        md_path: &str,
        json_path: &str,
    ) -> Result<()> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn
            .execute(
                "INSERT INTO reports (date, generated_at, md_path, json_path)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(date)
                 DO UPDATE SET generated_at=excluded.generated_at, md_path=excluded.md_path, json_path=excluded.json_path",
                params![date_str, generated_at, md_path, json_path],
            )
            .context("Failed to upsert report metadata")?;

        Ok(())
    }
}

impl KeyValueBackend for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)
    }
}
