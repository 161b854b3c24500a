// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    get_default_vat_rate, id_for_account, id_for_project, maybe_print_json, parse_date,
    parse_decimal, parse_month, pretty_table,
};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub project_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub r#type: Option<String>,
    pub transaction_type: Option<i64>,
    pub phase_id: Option<i64>,
    pub budget_item_id: Option<i64>,
    pub category: Option<String>,
    pub vat_rate: Option<Decimal>,
    pub remarks: Option<String>,
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let project = sub.get_one::<String>("project").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Amount must be positive; direction comes from --type or the accounts");
    }
    let date = match sub.get_one::<String>("date") {
        Some(d) => Some(parse_date(d)?),
        None => None,
    };
    let account = |key: &str| -> Result<Option<i64>> {
        match sub.get_one::<String>(key) {
            Some(name) => Ok(Some(id_for_account(conn, name)?)),
            None => Ok(None),
        }
    };
    let vat_rate = match sub.get_one::<String>("vat") {
        Some(v) => Some(parse_decimal(v)?),
        None => None,
    };
    let text = |key: &str| {
        sub.get_one::<String>(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let new_tx = NewTransaction {
        project_id: Some(id_for_project(conn, project)?),
        date,
        amount,
        from_account_id: account("from")?,
        to_account_id: account("to")?,
        r#type: text("type"),
        transaction_type: sub.get_one::<i64>("status").copied(),
        phase_id: sub.get_one::<i64>("phase").copied(),
        budget_item_id: sub.get_one::<i64>("budget_item").copied(),
        category: text("category"),
        vat_rate,
        remarks: text("remarks"),
    };
    let id = record_transaction(conn, &new_tx)?;
    println!(
        "Recorded transaction {} of {} on {} ({})",
        id,
        amount,
        date.map(|d| d.to_string()).unwrap_or_else(|| "no date".into()),
        project
    );
    Ok(())
}

fn is_system_account(conn: &Connection, id: Option<i64>) -> Result<bool> {
    let Some(id) = id else {
        return Ok(false);
    };
    let flag: Option<i64> = conn
        .query_row(
            "SELECT is_system_account FROM accounts WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(flag.unwrap_or(0) != 0)
}

/// VAT to store: zero whenever a system account is on either side, else the
/// given rate, else the configured default.
pub fn effective_vat_rate(
    conn: &Connection,
    from_account_id: Option<i64>,
    to_account_id: Option<i64>,
    given: Option<Decimal>,
) -> Result<Decimal> {
    if is_system_account(conn, from_account_id)? || is_system_account(conn, to_account_id)? {
        return Ok(Decimal::ZERO);
    }
    match given {
        Some(rate) => Ok(rate),
        None => get_default_vat_rate(conn),
    }
}

pub fn record_transaction(conn: &Connection, t: &NewTransaction) -> Result<i64> {
    let vat = effective_vat_rate(conn, t.from_account_id, t.to_account_id, t.vat_rate)?;
    debug!(given = ?t.vat_rate, applied = %vat, "vat rate resolved");
    conn.execute(
        "INSERT INTO transactions(date, amount, project_id, from_account_id, to_account_id, type,
                                  transaction_type, phase_id, budget_item_id, category, vat_rate, remarks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            t.date.map(|d| d.to_string()),
            t.amount.to_string(),
            t.project_id,
            t.from_account_id,
            t.to_account_id,
            t.r#type,
            t.transaction_type,
            t.phase_id,
            t.budget_item_id,
            t.category,
            vat.to_string(),
            t.remarks
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.project.clone(),
                    r.from.clone(),
                    r.to.clone(),
                    r.r#type.clone(),
                    r.status.map(|s| s.to_string()).unwrap_or_default(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.remarks.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "Date", "Project", "From", "To", "Type", "Status", "Amount", "Category",
                    "Remarks"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub project: String,
    pub from: String,
    pub to: String,
    pub r#type: String,
    pub status: Option<i64>,
    pub amount: String,
    pub category: String,
    pub remarks: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.date, p.name, fa.name, ta.name, t.type, t.transaction_type, t.amount, t.category, t.remarks
         FROM transactions t
         LEFT JOIN projects p ON t.project_id=p.id
         LEFT JOIN accounts fa ON t.from_account_id=fa.id
         LEFT JOIN accounts ta ON t.to_account_id=ta.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(project) = sub.get_one::<String>("project") {
        sql.push_str(" AND p.name=?");
        params_vec.push(project.trim().into());
    }
    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(parse_month(month)?);
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let opt = |v: Option<String>| v.unwrap_or_default();
        data.push(TransactionRow {
            id: r.get(0)?,
            date: opt(r.get(1)?),
            project: opt(r.get(2)?),
            from: opt(r.get(3)?),
            to: opt(r.get(4)?),
            r#type: opt(r.get(5)?),
            status: r.get(6)?,
            amount: r.get(7)?,
            category: opt(r.get(8)?),
            remarks: opt(r.get(9)?),
        });
    }
    Ok(data)
}
