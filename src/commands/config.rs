// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{DEFAULT_VAT_RATE, parse_decimal, pretty_table, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

const KNOWN_KEYS: &[&str] = &[DEFAULT_VAT_RATE];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            set(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        ));
    }
    if key == DEFAULT_VAT_RATE {
        parse_decimal(value)?;
    }
    set_setting(conn, key, value)
}

fn show(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut data = Vec::new();
    for row in rows {
        let (k, v) = row?;
        data.push(vec![k, v]);
    }
    println!("{}", pretty_table(&["Key", "Value"], data));
    Ok(())
}
