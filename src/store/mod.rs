// src/store/mod.rs
//! Single-table persistence for analysis results.
//!
//! Rows are immutable once inserted; there are no update or delete
//! operations, and repeated analyses for one employee accumulate as
//! separate rows.

use anyhow::Result;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// One stored analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub name_of_employee: String,
    pub satisfaction: String,
}

pub struct AnalysisStore {
    pool: SqlitePool,
}

impl AnalysisStore {
    /// Connect to the database (creating the file if missing) and make sure
    /// the table exists. Safe to call repeatedly.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name_of_employee TEXT,
                satisfaction TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("Analysis store ready at {}", database_url);
        Ok(Self { pool })
    }

    /// Append one immutable row, returning its id.
    pub async fn insert(&self, name: &str, satisfaction: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO chat_analysis (name_of_employee, satisfaction) VALUES (?, ?)",
        )
        .bind(name)
        .bind(satisfaction)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All rows in insertion order.
    pub async fn list_all(&self) -> Result<Vec<AnalysisRow>> {
        let rows = sqlx::query_as::<_, AnalysisRow>(
            "SELECT id, name_of_employee, satisfaction FROM chat_analysis ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Whether any prior analysis exists for this name. Used only to pick
    /// the welcome vs. welcome-back greeting.
    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_analysis WHERE name_of_employee = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
