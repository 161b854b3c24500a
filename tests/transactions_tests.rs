// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use devfin::commands::transactions::{self, NewTransaction};
use devfin::commands::{accounts, config, projects};
use devfin::models::EXECUTED;
use devfin::{cli, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let (pid, _) = projects::add_project(&conn, "Karaoli", "Active", false).unwrap();
    (conn, pid)
}

fn stored_vat(conn: &Connection, id: i64) -> Decimal {
    let s: String = conn
        .query_row("SELECT vat_rate FROM transactions WHERE id=?1", params![id], |r| {
            r.get(0)
        })
        .unwrap();
    s.parse().unwrap()
}

#[test]
fn list_limit_respected() {
    let (conn, pid) = setup();
    for i in 1..=3 {
        transactions::record_transaction(
            &conn,
            &NewTransaction {
                project_id: Some(pid),
                date: NaiveDate::from_ymd_opt(2025, 1, i),
                amount: dec!(10),
                r#type: Some("expense".into()),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["devfin", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
            assert_eq!(rows[0].project, "Karaoli");
            assert_eq!(rows[0].status, None);
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_filters_by_project_and_month() {
    let (conn, pid) = setup();
    let (other, _) = projects::add_project(&conn, "Limassol", "Active", false).unwrap();
    for (project, day) in [(pid, "2025-02-03"), (pid, "2025-03-01"), (other, "2025-02-10")] {
        transactions::record_transaction(
            &conn,
            &NewTransaction {
                project_id: Some(project),
                date: Some(day.parse().unwrap()),
                amount: dec!(1),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let matches = cli::build_cli().get_matches_from([
        "devfin", "tx", "list", "--project", "Karaoli", "--month", "2025-02",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2025-02-03");
}

#[test]
fn vat_is_zero_through_system_accounts() {
    let (conn, pid) = setup();
    config::set(&conn, "default_vat_rate", "19").unwrap();
    let system = accounts::add_account(&conn, "Internal transfer", None, true, None).unwrap();
    let supplier = accounts::add_account(&conn, "Concrete Ltd", None, false, None).unwrap();

    let record = |from, to, vat| {
        transactions::record_transaction(
            &conn,
            &NewTransaction {
                project_id: Some(pid),
                amount: dec!(100),
                from_account_id: from,
                to_account_id: to,
                vat_rate: vat,
                ..Default::default()
            },
        )
        .unwrap()
    };

    let through_system = record(Some(system), Some(supplier), Some(dec!(5)));
    let explicit = record(None, Some(supplier), Some(dec!(5)));
    let defaulted = record(None, Some(supplier), None);
    let into_system = record(Some(supplier), Some(system), None);

    assert_eq!(stored_vat(&conn, through_system), Decimal::ZERO);
    assert_eq!(stored_vat(&conn, explicit), dec!(5));
    assert_eq!(stored_vat(&conn, defaulted), dec!(19));
    assert_eq!(stored_vat(&conn, into_system), Decimal::ZERO);
}

#[test]
fn vat_defaults_to_zero_without_setting() {
    let (conn, _) = setup();
    let rate = transactions::effective_vat_rate(&conn, None, None, None).unwrap();
    assert_eq!(rate, Decimal::ZERO);
}

#[test]
fn absent_status_is_stored_as_null() {
    let (conn, pid) = setup();
    let id = transactions::record_transaction(
        &conn,
        &NewTransaction {
            project_id: Some(pid),
            amount: dec!(3),
            ..Default::default()
        },
    )
    .unwrap();
    let (status, date): (Option<i64>, Option<String>) = conn
        .query_row(
            "SELECT transaction_type, date FROM transactions WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(status, None);
    assert_eq!(date, None);
}

#[test]
fn cli_add_defaults_to_executed() {
    let (conn, _) = setup();
    let matches = cli::build_cli().get_matches_from([
        "devfin", "tx", "add", "--project", "Karaoli", "--amount", "250", "--type", "expense",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    transactions::handle(&conn, tx_m).unwrap();

    let status: Option<i64> = conn
        .query_row("SELECT transaction_type FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(status, Some(EXECUTED));
}

#[test]
fn config_rejects_unknown_keys_and_bad_rates() {
    let (conn, _) = setup();
    assert!(config::set(&conn, "base_currency", "EUR").is_err());
    assert!(config::set(&conn, "default_vat_rate", "nineteen").is_err());
    config::set(&conn, "default_vat_rate", "0.19").unwrap();
    config::set(&conn, "default_vat_rate", "19").unwrap();
    assert_eq!(devfin::utils::get_default_vat_rate(&conn).unwrap(), dec!(19));
}
