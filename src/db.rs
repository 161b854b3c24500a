// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Devfin", "devfin"));

pub const DB_ENV: &str = "DEVFIN_DB";

/// Resolves the database file: explicit path, then `DEVFIN_DB`, then the
/// platform data dir.
pub fn db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("devfin.sqlite"))
}

pub fn open_or_init(explicit: Option<&Path>) -> Result<Connection> {
    let path = db_path(explicit)?;
    debug!(path = %path.display(), "opening database");
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS projects(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        status TEXT DEFAULT 'Active',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS account_types(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        class TEXT NOT NULL CHECK(class IN ('income','expense','neutral'))
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        account_type_id INTEGER,
        is_system_account INTEGER NOT NULL DEFAULT 0,
        remarks TEXT,
        FOREIGN KEY(account_type_id) REFERENCES account_types(id) ON DELETE SET NULL
    );

    -- parent_id NULL = phase; otherwise an item under a phase (two levels only)
    CREATE TABLE IF NOT EXISTS budget_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL,
        category_name TEXT NOT NULL,
        planned_amount TEXT NOT NULL DEFAULT '0',
        parent_id INTEGER,
        FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
        FOREIGN KEY(parent_id) REFERENCES budget_categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_budget_categories_project ON budget_categories(project_id);

    CREATE TABLE IF NOT EXISTS budget_plans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        budget_category_id INTEGER NOT NULL,
        planned_date TEXT,
        amount TEXT NOT NULL,
        description TEXT,
        FOREIGN KEY(budget_category_id) REFERENCES budget_categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS apartments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL,
        customer_account_id INTEGER,
        floor TEXT,
        apartment TEXT,
        price TEXT,
        remarks TEXT,
        FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
        FOREIGN KEY(customer_account_id) REFERENCES accounts(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS customer_payment_plans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER,
        phase_id INTEGER,
        apartment_id INTEGER,
        manual_date TEXT,
        value TEXT,
        remarks TEXT,
        FOREIGN KEY(apartment_id) REFERENCES apartments(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_payment_plans_project ON customer_payment_plans(project_id);

    -- type: free-text 'income'/'expense'; transaction_type: 1 = executed
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT,
        amount TEXT NOT NULL DEFAULT '0',
        project_id INTEGER,
        from_account_id INTEGER,
        to_account_id INTEGER,
        type TEXT,
        transaction_type INTEGER,
        phase_id INTEGER,
        budget_item_id INTEGER,
        category TEXT,
        vat_rate TEXT NOT NULL DEFAULT '0',
        remarks TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE SET NULL,
        FOREIGN KEY(from_account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(to_account_id) REFERENCES accounts(id) ON DELETE SET NULL,
        FOREIGN KEY(budget_item_id) REFERENCES budget_categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_project ON transactions(project_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    "#,
    )?;
    Ok(())
}
