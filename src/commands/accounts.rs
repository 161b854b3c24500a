// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::classify::AccountClass;
use crate::utils::{id_for_account_type, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let typ = sub.get_one::<String>("type").map(|s| s.trim());
            let system = sub.get_flag("system");
            let remarks = sub.get_one::<String>("remarks").map(|s| s.trim());
            add_account(conn, name, typ, system, remarks)?;
            println!(
                "Added account '{}' ({}{})",
                name,
                typ.unwrap_or("untyped"),
                if system { ", system" } else { "" }
            );
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.name, IFNULL(t.name,''), IFNULL(t.class,''), a.is_system_account
                 FROM accounts a LEFT JOIN account_types t ON a.account_type_id=t.id
                 ORDER BY a.name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i64>(4)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, n, t, c, sys) = row?;
                let sys = if sys != 0 { "yes" } else { "" };
                data.push(vec![id.to_string(), n, t, c, sys.to_string()]);
            }
            println!(
                "{}",
                pretty_table(&["Id", "Name", "Type", "Class", "System"], data)
            );
        }
        Some(("type-add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let explicit = match sub.get_one::<String>("class") {
                Some(c) => Some(c.parse::<AccountClass>().map_err(|e| anyhow!(e))?),
                None => None,
            };
            let class = add_account_type(conn, name, explicit)?;
            println!("Added account type '{}' ({})", name, class);
        }
        Some(("types", _)) => {
            let mut stmt = conn.prepare("SELECT id, name, class FROM account_types ORDER BY id")?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, n, c) = row?;
                data.push(vec![id.to_string(), n, c]);
            }
            println!("{}", pretty_table(&["Id", "Name", "Class"], data));
        }
        _ => {}
    }
    Ok(())
}

/// Stores an account type. Without an explicit class one is inferred from
/// the name, once, here.
pub fn add_account_type(
    conn: &Connection,
    name: &str,
    class: Option<AccountClass>,
) -> Result<AccountClass> {
    let class = class.unwrap_or_else(|| AccountClass::infer_from_type_name(name));
    conn.execute(
        "INSERT INTO account_types(name, class) VALUES (?1, ?2)",
        params![name, class.as_str()],
    )?;
    Ok(class)
}

pub fn add_account(
    conn: &Connection,
    name: &str,
    account_type: Option<&str>,
    is_system: bool,
    remarks: Option<&str>,
) -> Result<i64> {
    let type_id = match account_type {
        Some(t) => Some(id_for_account_type(conn, t)?),
        None => None,
    };
    conn.execute(
        "INSERT INTO accounts(name, account_type_id, is_system_account, remarks)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, type_id, is_system as i64, remarks],
    )?;
    Ok(conn.last_insert_rowid())
}
