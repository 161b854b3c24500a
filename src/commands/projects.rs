// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

/// Phases every new project starts with, each with its items.
pub const DEFAULT_BUDGET: &[(&str, &[&str])] = &[
    ("Buying", &["License", "Realtor", "Law", "Buy Tax", "Notary"]),
    ("Construction", &["Construction", "Materials", "Architect"]),
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let status = sub.get_one::<String>("status").unwrap().trim();
            let with_defaults = !sub.get_flag("no_defaults");
            let (id, created) = add_project(conn, name, status, with_defaults)?;
            println!(
                "Added project '{}' (id {}, {} budget categories)",
                name, id, created
            );
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT id, name, IFNULL(status,''), created_at FROM projects ORDER BY id",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, n, s, c) = row?;
                data.push(vec![id.to_string(), n, s, c]);
            }
            println!("{}", pretty_table(&["Id", "Name", "Status", "Created"], data));
        }
        _ => {}
    }
    Ok(())
}

/// Inserts a project and, unless told otherwise, its default budget
/// categories. Returns the new id and how many categories were created.
pub fn add_project(
    conn: &Connection,
    name: &str,
    status: &str,
    with_defaults: bool,
) -> Result<(i64, usize)> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO projects(name, status) VALUES (?1, ?2)",
        params![name, status],
    )
    .with_context(|| format!("Create project '{}'", name))?;
    let id = tx.last_insert_rowid();
    let created = if with_defaults {
        create_default_budget_categories(&tx, id)?
    } else {
        0
    };
    tx.commit()?;
    info!(project = id, categories = created, "project created");
    Ok((id, created))
}

pub fn create_default_budget_categories(conn: &Connection, project_id: i64) -> Result<usize> {
    let mut created = 0;
    for (phase, items) in DEFAULT_BUDGET {
        conn.execute(
            "INSERT INTO budget_categories(project_id, category_name, planned_amount, parent_id)
             VALUES (?1, ?2, '0', NULL)",
            params![project_id, phase],
        )?;
        let phase_id = conn.last_insert_rowid();
        created += 1;
        for item in *items {
            conn.execute(
                "INSERT INTO budget_categories(project_id, category_name, planned_amount, parent_id)
                 VALUES (?1, ?2, '0', ?3)",
                params![project_id, item, phase_id],
            )?;
            created += 1;
        }
    }
    Ok(created)
}
