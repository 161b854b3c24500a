// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use devfin::budget::BudgetTree;
use devfin::commands::{budgets, doctor, payments, projects};
use devfin::store::ReportSource;
use devfin::{cli, db};
use rusqlite::{Connection, params};
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn new_project_gets_default_phases() {
    let conn = setup();
    let (pid, created) = projects::add_project(&conn, "Karaoli", "Active", true).unwrap();
    assert_eq!(created, 10);

    let tree = BudgetTree::from_categories(conn.budget_categories(pid).unwrap());
    let shape: Vec<(String, Vec<String>)> = tree
        .phases
        .iter()
        .map(|p| {
            (
                p.category.category_name.clone(),
                p.items.iter().map(|i| i.category_name.clone()).collect(),
            )
        })
        .collect();
    assert_eq!(shape.len(), 2);
    assert_eq!(shape[0].0, "Buying");
    assert_eq!(shape[0].1, ["License", "Realtor", "Law", "Buy Tax", "Notary"]);
    assert_eq!(shape[1].0, "Construction");
    assert_eq!(shape[1].1, ["Construction", "Materials", "Architect"]);
}

#[test]
fn no_defaults_flag_skips_categories() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "devfin",
        "project",
        "add",
        "--name",
        "X",
        "--no-defaults",
    ]);
    let (_, project_m) = matches.subcommand().unwrap();
    projects::handle(&conn, project_m).unwrap();

    let pid = devfin::utils::id_for_project(&conn, "X").unwrap();
    assert!(conn.budget_categories(pid).unwrap().is_empty());
}

#[test]
fn duplicate_project_name_rolls_back() {
    let conn = setup();
    projects::add_project(&conn, "Karaoli", "Active", true).unwrap();
    assert!(projects::add_project(&conn, "Karaoli", "Active", true).is_err());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM budget_categories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 10);
}

#[test]
fn doctor_lists_records_reports_skip() {
    let conn = setup();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    let item = budgets::add_category(&conn, pid, "Law", dec!(0), Some(phase)).unwrap();
    // written around the insert-time check, as legacy data may be
    conn.execute(
        "INSERT INTO budget_categories(project_id, category_name, parent_id) VALUES (?1, 'Deep', ?2)",
        params![pid, item],
    )
    .unwrap();
    budgets::add_plan(&conn, item, None, dec!(10), None).unwrap();
    payments::add_payment_plan(&conn, pid, None, None, None, dec!(5), None).unwrap();
    conn.execute(
        "INSERT INTO transactions(project_id, amount, type, transaction_type) VALUES (?1, '7', 'expense', 1)",
        params![pid],
    )
    .unwrap();

    let issues = doctor::find_issues(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        kinds,
        [
            "transaction_without_date",
            "payment_plan_without_date",
            "budget_plan_without_date",
            "category_outside_hierarchy",
            "executed_without_budget_link",
        ]
    );
    assert!(issues[3][1].contains("Deep"));
}

#[test]
fn doctor_is_quiet_on_clean_data() {
    let conn = setup();
    projects::add_project(&conn, "Karaoli", "Active", true).unwrap();
    assert!(doctor::find_issues(&conn).unwrap().is_empty());
}

#[test]
fn doctor_flags_non_positive_amounts() {
    let conn = setup();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    conn.execute(
        "INSERT INTO transactions(date, project_id, amount, type) VALUES ('2025-01-01', ?1, '-500', 'income')",
        params![pid],
    )
    .unwrap();

    let issues = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "transaction_non_positive_amount");
    assert_eq!(issues[0][1], "tx 1 amount -500");
}
