// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use devfin::commands::transactions::NewTransaction;
use devfin::commands::{budgets, exporter, payments, projects, transactions};
use devfin::{cli, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    transactions::record_transaction(
        &conn,
        &NewTransaction {
            project_id: Some(pid),
            date: "2025-01-02".parse().ok(),
            amount: dec!(1200),
            r#type: Some("income".into()),
            phase_id: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    payments::add_payment_plan(
        &conn,
        pid,
        Some(1),
        None,
        "2025-03-15".parse().ok(),
        dec!(2000),
        None,
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(args);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_forecast_writes_json_numbers() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("forecast.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "devfin", "export", "forecast", "--project", "Karaoli", "--as-of", "2025-02-10",
            "--format", "json", "--out", &out_str,
        ],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01",
                "actual_income": 1200.0,
                "actual_expense": 0.0,
                "planned_income": 0.0,
                "planned_expense": 0.0,
                "net_flow": 1200.0,
                "cumulative_balance": 1200.0
            },
            {
                "date": "2025-03",
                "actual_income": 0.0,
                "actual_expense": 0.0,
                "planned_income": 800.0,
                "planned_expense": 0.0,
                "net_flow": 800.0,
                "cumulative_balance": 2000.0
            }
        ])
    );
}

#[test]
fn export_budget_writes_csv_with_header() {
    let conn = base_conn();
    let pid = devfin::utils::id_for_project(&conn, "Karaoli").unwrap();
    let phase = budgets::add_category(&conn, pid, "Buying", dec!(0), None).unwrap();
    budgets::add_category(&conn, pid, "Law", dec!(500), Some(phase)).unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("budget.csv");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(
        &conn,
        &["devfin", "export", "budget", "--project", "Karaoli", "--out", &out_str],
    )
    .unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[1], "name");
    assert!(headers.iter().any(|h| h == "variance"));
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "Buying");
    assert_eq!(&records[1][1], "Law");
}

#[test]
fn export_rejects_unknown_project() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("budget.json");
    let out_str = out_path.to_string_lossy().to_string();

    let res = run_export(
        &conn,
        &[
            "devfin", "export", "budget", "--project", "Nowhere", "--format", "json", "--out",
            &out_str,
        ],
    );
    assert!(res.is_err());
    assert!(!out_path.exists());
}
