// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use devfin::commands::transactions::NewTransaction;
use devfin::commands::{budgets, payments, projects, transactions};
use devfin::db;
use devfin::models::EXECUTED;
use devfin::portfolio::{generate_portfolio_summary, is_reported};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    projects::add_project(&conn, "Limassol", "Completed", false).unwrap();

    let phase = budgets::add_category(&conn, pid, "Construction", dec!(1000), None).unwrap();
    let materials =
        budgets::add_category(&conn, pid, "Materials", dec!(600), Some(phase)).unwrap();
    let architect =
        budgets::add_category(&conn, pid, "Architect", dec!(400), Some(phase)).unwrap();

    let record = |amount: Decimal, kind: &str, item: Option<i64>, phase: Option<i64>| {
        transactions::record_transaction(
            &conn,
            &NewTransaction {
                project_id: Some(pid),
                date: NaiveDate::from_ymd_opt(2025, 3, 10),
                amount,
                r#type: Some(kind.to_string()),
                transaction_type: Some(EXECUTED),
                budget_item_id: item,
                phase_id: phase,
                ..Default::default()
            },
        )
        .unwrap();
    };
    record(dec!(580), "expense", Some(materials), None);
    record(dec!(500), "expense", Some(architect), None);
    record(dec!(500), "income", None, Some(1));

    payments::add_payment_plan(
        &conn,
        pid,
        Some(1),
        None,
        NaiveDate::from_ymd_opt(2025, 9, 1),
        dec!(2000),
        None,
    )
    .unwrap();
    conn
}

#[test]
fn project_summary_figures() {
    let conn = setup();
    let summary = generate_portfolio_summary(&conn, as_of()).unwrap();
    assert_eq!(summary.projects.len(), 2);

    let k = &summary.projects[0];
    assert_eq!(k.name, "Karaoli");
    assert_eq!(k.total_budget, dec!(1000));
    assert_eq!(k.actual_spent, dec!(1080));
    assert_eq!(k.total_collected, dec!(500));
    assert_eq!(k.total_revenue, dec!(2000));
    assert_eq!(k.collection_rate, dec!(25));
    // 500 - 1080 actual, + 1500 still outstanding on the plan
    assert_eq!(k.net_cash_flow, dec!(920));
    assert_eq!(k.categories_warning, 1);
    assert_eq!(k.cash_flow.len(), 2);

    let worst = k.worst_category.as_ref().unwrap();
    assert_eq!(worst.name, "Architect");
    assert_eq!(worst.progress, dec!(125));
    assert_eq!(worst.overrun, dec!(100));
}

#[test]
fn empty_project_and_totals() {
    let conn = setup();
    let summary = generate_portfolio_summary(&conn, as_of()).unwrap();

    let l = &summary.projects[1];
    assert_eq!(l.name, "Limassol");
    assert_eq!(l.total_budget, Decimal::ZERO);
    assert_eq!(l.collection_rate, Decimal::ZERO);
    assert!(l.worst_category.is_none());
    assert!(l.cash_flow.is_empty());

    let t = &summary.totals;
    assert_eq!(t.project_count, 2);
    assert_eq!(t.total_budget, dec!(1000));
    assert_eq!(t.total_spent, dec!(1080));
    assert_eq!(t.budget_progress, dec!(108));
    assert_eq!(t.net_cash_flow, dec!(920));
}

#[test]
fn rounded_summary_serializes() {
    let conn = setup();
    let summary = generate_portfolio_summary(&conn, as_of()).unwrap().rounded();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["totals"]["project_count"], 2);
    assert_eq!(json["projects"][0]["worst_category"]["name"], "Architect");
    assert!(json["projects"][1]["worst_category"].is_null());
    assert_eq!(json["projects"][0]["cash_flow"][1]["date"], "2025-09");
}

#[test]
fn drafts_are_left_out_of_the_portfolio() {
    let conn = setup();
    let (draft, _) = projects::add_project(&conn, "Paphos", "Draft", false).unwrap();
    projects::add_project(&conn, "Larnaca", " COMPLETED ", false).unwrap();
    conn.execute("INSERT INTO projects(name, status) VALUES ('Nicosia', NULL)", [])
        .unwrap();
    budgets::add_category(&conn, draft, "Buying", dec!(5000), None).unwrap();

    let summary = generate_portfolio_summary(&conn, as_of()).unwrap();
    let names: Vec<&str> = summary.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Karaoli", "Limassol", "Larnaca"]);
    assert_eq!(summary.totals.project_count, 3);
    assert_eq!(summary.totals.total_budget, dec!(1000));
}

#[test]
fn reported_statuses_ignore_case() {
    let project = |status: Option<&str>| devfin::models::Project {
        id: 1,
        name: "P".into(),
        status: status.map(str::to_string),
    };
    assert!(is_reported(&project(Some("Active"))));
    assert!(is_reported(&project(Some("completed"))));
    assert!(!is_reported(&project(Some("Draft"))));
    assert!(!is_reported(&project(None)));
}
