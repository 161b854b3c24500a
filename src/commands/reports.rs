// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{BudgetReportRow, generate_budget_report};
use crate::forecast::{ForecastRow, generate_cash_flow_forecast};
use crate::portfolio::generate_portfolio_summary;
use crate::utils::{as_of, fmt_money, id_for_project, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("forecast", sub)) => forecast(conn, sub)?,
        Some(("budget", sub)) => budget(conn, sub)?,
        Some(("portfolio", sub)) => portfolio(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Forecast rows for the `--project` (or every project) as of `--as-of`,
/// rounded to cents.
pub fn forecast_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ForecastRow>> {
    let project_id = match sub.get_one::<String>("project") {
        Some(name) => Some(id_for_project(conn, name)?),
        None => None,
    };
    let as_of = as_of(sub)?;
    let rows = generate_cash_flow_forecast(conn, project_id, as_of)
        .context("Cash-flow forecast failed")?;
    Ok(rows.iter().map(ForecastRow::rounded).collect())
}

pub fn budget_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<BudgetReportRow>> {
    let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
    let rows = generate_budget_report(conn, project_id).context("Budget report failed")?;
    Ok(rows.iter().map(BudgetReportRow::rounded).collect())
}

fn forecast(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = forecast_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    fmt_money(&r.actual_income),
                    fmt_money(&r.actual_expense),
                    fmt_money(&r.planned_income),
                    fmt_money(&r.planned_expense),
                    fmt_money(&r.net_flow),
                    fmt_money(&r.cumulative_balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Month",
                    "Actual In",
                    "Actual Out",
                    "Planned In",
                    "Planned Out",
                    "Net",
                    "Balance"
                ],
                data
            )
        );
    }
    Ok(())
}

fn budget(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = budget_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                let name = if r.is_parent {
                    r.name.clone()
                } else {
                    format!("  {}", r.name)
                };
                vec![
                    r.id.to_string(),
                    name,
                    fmt_money(&r.planned),
                    fmt_money(&r.actual),
                    fmt_money(&r.variance),
                    format!("{:.1}%", r.progress),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Category", "Planned", "Actual", "Variance", "Progress"],
                data
            )
        );
    }
    Ok(())
}

fn portfolio(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let summary = generate_portfolio_summary(conn, as_of(sub)?)
        .context("Portfolio summary failed")?
        .rounded();
    if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
        let mut data: Vec<Vec<String>> = summary
            .projects
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    fmt_money(&p.total_budget),
                    fmt_money(&p.actual_spent),
                    fmt_money(&p.total_collected),
                    format!("{:.1}%", p.collection_rate),
                    fmt_money(&p.net_cash_flow),
                    p.categories_warning.to_string(),
                    p.worst_category
                        .as_ref()
                        .map(|w| format!("{} ({:.1}%)", w.name, w.progress))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        let t = &summary.totals;
        data.push(vec![
            format!("TOTAL ({} projects)", t.project_count),
            fmt_money(&t.total_budget),
            fmt_money(&t.total_spent),
            fmt_money(&t.total_collected),
            format!("{:.1}%", t.collection_rate),
            fmt_money(&t.net_cash_flow),
            String::new(),
            String::new(),
        ]);
        println!(
            "{}",
            pretty_table(
                &[
                    "Project",
                    "Budget",
                    "Spent",
                    "Collected",
                    "Collection",
                    "Net Cash",
                    ">=90%",
                    "Worst Over Budget"
                ],
                data
            )
        );
    }
    Ok(())
}
