// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_account, id_for_project, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
            let customer = match sub.get_one::<String>("customer") {
                Some(name) => Some(id_for_account(conn, name)?),
                None => None,
            };
            let price = match sub.get_one::<String>("price") {
                Some(p) => Some(parse_decimal(p)?.to_string()),
                None => None,
            };
            let floor = sub.get_one::<String>("floor").map(|s| s.trim());
            let unit = sub.get_one::<String>("unit").map(|s| s.trim());
            let remarks = sub.get_one::<String>("remarks").map(|s| s.trim());
            conn.execute(
                "INSERT INTO apartments(project_id, customer_account_id, floor, apartment, price, remarks)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![project_id, customer, floor, unit, price, remarks],
            )?;
            println!(
                "Added apartment {} (id {})",
                unit.unwrap_or("-"),
                conn.last_insert_rowid()
            );
        }
        Some(("list", sub)) => {
            let project_id = id_for_project(conn, sub.get_one::<String>("project").unwrap())?;
            let mut stmt = conn.prepare(
                "SELECT ap.id, IFNULL(ap.floor,''), IFNULL(ap.apartment,''), IFNULL(a.name,''),
                        IFNULL(ap.price,''), IFNULL(ap.remarks,'')
                 FROM apartments ap LEFT JOIN accounts a ON ap.customer_account_id=a.id
                 WHERE ap.project_id=?1
                 ORDER BY ap.id",
            )?;
            let rows = stmt.query_map(params![project_id], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, f, u, c, p, rem) = row?;
                data.push(vec![id.to_string(), f, u, c, p, rem]);
            }
            println!(
                "{}",
                pretty_table(&["Id", "Floor", "Apartment", "Customer", "Price", "Remarks"], data)
            );
        }
        _ => {}
    }
    Ok(())
}
