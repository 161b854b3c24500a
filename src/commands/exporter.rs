// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::{budget_rows, forecast_rows};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("forecast", sub)) => {
            let rows = forecast_rows(conn, sub)?;
            write_rows(sub, &rows)
        }
        Some(("budget", sub)) => {
            let rows = budget_rows(conn, sub)?;
            write_rows(sub, &rows)
        }
        _ => Ok(()),
    }
}

fn write_rows<T: Serialize>(sub: &clap::ArgMatches, rows: &[T]) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} rows to {}", rows.len(), out);
    Ok(())
}
