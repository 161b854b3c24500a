// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use devfin::budget::{BudgetReportRow, BudgetTree, generate_budget_report, progress};
use devfin::commands::transactions::NewTransaction;
use devfin::commands::{budgets, projects, transactions};
use devfin::db;
use devfin::models::BudgetCategory;
use devfin::ReportError;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    (conn, pid)
}

fn spend(
    conn: &Connection,
    pid: i64,
    amount: Decimal,
    item: Option<i64>,
    category: Option<&str>,
    status: i64,
) {
    transactions::record_transaction(
        conn,
        &NewTransaction {
            project_id: Some(pid),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            amount,
            r#type: Some("expense".into()),
            transaction_type: Some(status),
            budget_item_id: item,
            category: category.map(|c| c.to_string()),
            ..Default::default()
        },
    )
    .unwrap();
}

fn row(rows: &[BudgetReportRow], id: i64) -> &BudgetReportRow {
    rows.iter().find(|r| r.id == id).unwrap()
}

#[test]
fn materials_item_against_its_phase() {
    let (conn, pid) = setup();
    let phase = budgets::add_category(&conn, pid, "Construction", dec!(2000000), None).unwrap();
    let materials =
        budgets::add_category(&conn, pid, "Materials", dec!(100000), Some(phase)).unwrap();
    spend(&conn, pid, dec!(40000), Some(materials), None, 1);

    let rows = generate_budget_report(&conn, pid).unwrap();
    let m = row(&rows, materials);
    assert_eq!(m.planned, dec!(100000));
    assert_eq!(m.actual, dec!(40000));
    // variance is actual - planned
    assert_eq!(m.variance, dec!(-60000));
    assert_eq!(m.progress, dec!(40));
    assert!(!m.is_parent);
    assert_eq!(m.parent_id, Some(phase));

    let p = row(&rows, phase);
    assert!(p.is_parent);
    assert_eq!(p.planned, dec!(2000000));
    assert_eq!(p.actual, dec!(40000));
    assert_eq!(p.children_planned_total, Some(dec!(100000)));
    assert_eq!(p.children_actual_total, Some(dec!(40000)));
    assert_eq!(m.children_planned_total, None);
}

#[test]
fn name_fallback_only_when_id_match_is_empty() {
    let (conn, pid) = setup();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    let law = budgets::add_category(&conn, pid, "Law", dec!(1000), Some(phase)).unwrap();
    let notary = budgets::add_category(&conn, pid, "Notary", dec!(500), Some(phase)).unwrap();
    spend(&conn, pid, dec!(300), Some(law), None, 1);
    spend(&conn, pid, dec!(999), None, Some("law"), 1);
    spend(&conn, pid, dec!(120), None, Some("  NOTARY "), 1);
    spend(&conn, pid, dec!(80), None, Some("notary"), 2);

    let rows = generate_budget_report(&conn, pid).unwrap();
    assert_eq!(row(&rows, law).actual, dec!(300));
    assert_eq!(row(&rows, notary).actual, dec!(120));
}

#[test]
fn actual_uses_absolute_amounts_of_executed_spend() {
    let (conn, pid) = setup();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    let tax = budgets::add_category(&conn, pid, "Buy Tax", dec!(200), Some(phase)).unwrap();
    conn.execute(
        "INSERT INTO transactions(date, amount, project_id, type, transaction_type, budget_item_id)
         VALUES ('2025-02-01', '-150', ?1, 'expense', 1, ?2)",
        params![pid, tax],
    )
    .unwrap();
    spend(&conn, pid, dec!(50), Some(tax), None, 1);
    spend(&conn, pid, dec!(700), Some(tax), None, 2);

    let rows = generate_budget_report(&conn, pid).unwrap();
    assert_eq!(row(&rows, tax).actual, dec!(200));
    assert_eq!(row(&rows, tax).progress, dec!(100));
}

#[test]
fn phase_without_own_budget_rolls_up_children() {
    let (conn, pid) = setup();
    let phase = budgets::add_category(&conn, pid, "Construction", dec!(0), None).unwrap();
    let a = budgets::add_category(&conn, pid, "Materials", dec!(600), Some(phase)).unwrap();
    let b = budgets::add_category(&conn, pid, "Architect", dec!(400), Some(phase)).unwrap();
    spend(&conn, pid, dec!(100), Some(a), None, 1);
    spend(&conn, pid, dec!(50), Some(b), None, 1);
    spend(&conn, pid, dec!(25), Some(phase), None, 1);

    let rows = generate_budget_report(&conn, pid).unwrap();
    let p = row(&rows, phase);
    assert_eq!(p.planned, dec!(1000));
    assert_eq!(p.children_actual_total, Some(dec!(150)));
    assert_eq!(p.actual, dec!(175));
    assert_eq!(p.variance, dec!(-825));
    assert_eq!(p.progress, dec!(17.5));
}

#[test]
fn rows_follow_phase_then_items_by_id() {
    let (conn, pid) = setup();
    let created = projects::create_default_budget_categories(&conn, pid).unwrap();
    assert_eq!(created, 10);
    let rows = generate_budget_report(&conn, pid).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Buying", "License", "Realtor", "Law", "Buy Tax", "Notary", "Construction",
            "Construction", "Materials", "Architect"
        ]
    );
    assert!(rows.iter().all(|r| r.progress == Decimal::ZERO));
}

#[test]
fn empty_project_has_empty_report() {
    let (conn, pid) = setup();
    assert!(generate_budget_report(&conn, pid).unwrap().is_empty());
}

#[test]
fn progress_is_zero_without_plan() {
    assert_eq!(progress(dec!(50), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(progress(dec!(50), dec!(200)), dec!(25));
}

#[test]
fn insert_rejects_deeper_nesting() {
    let (conn, pid) = setup();
    let (other, _) = projects::add_project(&conn, "Limassol", "Active", false).unwrap();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    let item = budgets::add_category(&conn, pid, "Law", dec!(0), Some(phase)).unwrap();

    let err = budgets::add_category(&conn, pid, "Court fees", dec!(0), Some(item)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReportError>(),
        Some(ReportError::Hierarchy(_))
    ));
    assert!(budgets::add_category(&conn, other, "Law", dec!(0), Some(phase)).is_err());
    assert!(budgets::add_category(&conn, pid, "Law", dec!(0), Some(9999)).is_err());
    assert!(budgets::add_category(&conn, pid, "Law", dec!(-1), None).is_err());
}

#[test]
fn tree_skips_rows_outside_two_levels() {
    let cat = |id, parent| BudgetCategory {
        id,
        project_id: 1,
        category_name: format!("c{}", id),
        planned_amount: Decimal::ZERO,
        parent_id: parent,
    };
    let tree = BudgetTree::from_categories(vec![
        cat(5, None),
        cat(2, Some(5)),
        cat(1, None),
        cat(3, Some(2)),
        cat(4, Some(42)),
        cat(6, Some(5)),
    ]);
    let shape: Vec<(i64, Vec<i64>)> = tree
        .phases
        .iter()
        .map(|p| (p.category.id, p.items.iter().map(|i| i.id).collect()))
        .collect();
    assert_eq!(shape, [(1, vec![]), (5, vec![2, 6])]);
}

#[test]
fn set_planned_updates_report() {
    let (conn, pid) = setup();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    let law = budgets::add_category(&conn, pid, "Law", dec!(0), Some(phase)).unwrap();
    spend(&conn, pid, dec!(90), Some(law), None, 1);
    budgets::set_planned(&conn, law, dec!(100)).unwrap();
    assert!(budgets::set_planned(&conn, 9999, dec!(1)).is_err());

    let rows = generate_budget_report(&conn, pid).unwrap();
    assert_eq!(row(&rows, law).progress, dec!(90));
    assert_eq!(row(&rows, law).variance, dec!(-10));
}
