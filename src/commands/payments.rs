// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_project, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
            let date = match sub.get_one::<String>("date") {
                Some(d) => Some(parse_date(d)?),
                None => None,
            };
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            let id = add_payment_plan(
                conn,
                project_id,
                sub.get_one::<i64>("phase").copied(),
                sub.get_one::<i64>("apartment").copied(),
                date,
                value,
                sub.get_one::<String>("remarks").map(|s| s.trim()),
            )?;
            println!("Added payment plan {} ({})", id, value);
        }
        Some(("list", sub)) => {
            let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
            let mut stmt = conn.prepare(
                "SELECT id, IFNULL(manual_date,''), phase_id, apartment_id, IFNULL(value,''), IFNULL(remarks,'')
                 FROM customer_payment_plans
                 WHERE project_id=?1
                 ORDER BY manual_date, id",
            )?;
            let rows = stmt.query_map(params![project_id], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<i64>>(2)?,
                    r.get::<_, Option<i64>>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                ))
            })?;
            let opt = |v: Option<i64>| v.map(|x| x.to_string()).unwrap_or_default();
            let mut data = Vec::new();
            for row in rows {
                let (id, d, ph, ap, v, rem) = row?;
                data.push(vec![id.to_string(), d, opt(ph), opt(ap), v, rem]);
            }
            println!(
                "{}",
                pretty_table(&["Id", "Due", "Phase", "Apartment", "Value", "Remarks"], data)
            );
        }
        _ => {}
    }
    Ok(())
}

pub fn add_payment_plan(
    conn: &Connection,
    project_id: i64,
    phase_id: Option<i64>,
    apartment_id: Option<i64>,
    due: Option<NaiveDate>,
    value: Decimal,
    remarks: Option<&str>,
) -> Result<i64> {
    if value <= Decimal::ZERO {
        bail!("Payment plan value must be positive");
    }
    conn.execute(
        "INSERT INTO customer_payment_plans(project_id, phase_id, apartment_id, manual_date, value, remarks)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            project_id,
            phase_id,
            apartment_id,
            due.map(|d| d.to_string()),
            value.to_string(),
            remarks
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
