// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::BudgetTree;
use crate::store::ReportSource;
use crate::utils::{fmt_money, id_for_project, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let project = sub.get_one::<String>("project").unwrap();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let planned = parse_decimal(sub.get_one::<String>("planned").unwrap())?;
            let parent = sub.get_one::<i64>("parent").copied();
            let project_id = id_for_project(conn, project)?;
            let id = add_category(conn, project_id, name, planned, parent)?;
            println!("Added budget category '{}' (id {})", name, id);
        }
        Some(("set", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let planned = parse_decimal(sub.get_one::<String>("planned").unwrap())?;
            set_planned(conn, id, planned)?;
            println!("Budget category {} planned = {}", id, planned);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("plan-add", sub)) => {
            let category = *sub.get_one::<i64>("category").unwrap();
            let date = match sub.get_one::<String>("date") {
                Some(d) => Some(parse_date(d)?),
                None => None,
            };
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let description = sub.get_one::<String>("description").map(|s| s.trim());
            let id = add_plan(conn, category, date, amount, description)?;
            println!("Added budget plan {} for category {}", id, category);
        }
        Some(("plans", sub)) => plans(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Inserts a budget category, refusing anything deeper than phase -> item.
pub fn add_category(
    conn: &Connection,
    project_id: i64,
    name: &str,
    planned: Decimal,
    parent_id: Option<i64>,
) -> Result<i64> {
    if planned < Decimal::ZERO {
        bail!("Planned amount cannot be negative");
    }
    if parent_id.is_some() {
        let existing = conn.budget_categories(project_id)?;
        BudgetTree::check_parent(&existing, project_id, parent_id)?;
    }
    conn.execute(
        "INSERT INTO budget_categories(project_id, category_name, planned_amount, parent_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![project_id, name, planned.to_string(), parent_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_planned(conn: &Connection, id: i64, planned: Decimal) -> Result<()> {
    if planned < Decimal::ZERO {
        bail!("Planned amount cannot be negative");
    }
    let n = conn.execute(
        "UPDATE budget_categories SET planned_amount=?1 WHERE id=?2",
        params![planned.to_string(), id],
    )?;
    if n == 0 {
        bail!("Budget category {} not found", id);
    }
    Ok(())
}

pub fn add_plan(
    conn: &Connection,
    category_id: i64,
    date: Option<NaiveDate>,
    amount: Decimal,
    description: Option<&str>,
) -> Result<i64> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM budget_categories WHERE id=?1",
            params![category_id],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        bail!("Budget category {} not found", category_id);
    }
    conn.execute(
        "INSERT INTO budget_plans(budget_category_id, planned_date, amount, description)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            category_id,
            date.map(|d| d.to_string()),
            amount.to_string(),
            description
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
    let tree = BudgetTree::from_categories(conn.budget_categories(project_id)?);
    let mut data = Vec::new();
    for phase in &tree.phases {
        data.push(vec![
            phase.category.id.to_string(),
            phase.category.category_name.clone(),
            String::new(),
            fmt_money(&phase.category.planned_amount),
        ]);
        for item in &phase.items {
            data.push(vec![
                item.id.to_string(),
                format!("  {}", item.category_name),
                phase.category.id.to_string(),
                fmt_money(&item.planned_amount),
            ]);
        }
    }
    println!(
        "{}",
        pretty_table(&["Id", "Category", "Phase", "Planned"], data)
    );
    Ok(())
}

fn plans(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
    let mut stmt = conn.prepare(
        "SELECT bp.id, bc.category_name, IFNULL(bp.planned_date,''), bp.amount, IFNULL(bp.description,'')
         FROM budget_plans bp JOIN budget_categories bc ON bp.budget_category_id=bc.id
         WHERE bc.project_id=?1
         ORDER BY bp.planned_date, bp.id",
    )?;
    let rows = stmt.query_map(params![project_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, c, d, a, desc) = row?;
        data.push(vec![id.to_string(), c, d, a, desc]);
    }
    println!(
        "{}",
        pretty_table(&["Id", "Category", "Date", "Amount", "Description"], data)
    );
    Ok(())
}
