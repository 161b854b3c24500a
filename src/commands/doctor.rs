// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Records the reports leave out without complaint, as (issue, detail).
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut collect = |issue: &str, sql: &str| -> Result<()> {
        let mut stmt = conn.prepare(sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let detail: String = r.get(0)?;
            rows.push(vec![issue.to_string(), detail]);
        }
        Ok(())
    };

    // 1) Undated transactions never reach a month
    collect(
        "transaction_without_date",
        "SELECT 'tx ' || id || ' amount ' || amount FROM transactions
         WHERE date IS NULL OR trim(date)='' ORDER BY id",
    )?;

    // 2) Payment plans the forecast cannot place
    collect(
        "payment_plan_without_date",
        "SELECT 'plan ' || id FROM customer_payment_plans
         WHERE manual_date IS NULL OR trim(manual_date)='' ORDER BY id",
    )?;
    collect(
        "payment_plan_without_value",
        "SELECT 'plan ' || id FROM customer_payment_plans
         WHERE value IS NULL OR CAST(value AS REAL) <= 0 ORDER BY id",
    )?;

    // 3) Budget plans with no date
    collect(
        "budget_plan_without_date",
        "SELECT 'budget plan ' || id FROM budget_plans
         WHERE planned_date IS NULL OR trim(planned_date)='' ORDER BY id",
    )?;

    // 4) Categories outside the phase -> item shape
    collect(
        "category_outside_hierarchy",
        "SELECT 'category ' || c.id || ' (' || c.category_name || ')' FROM budget_categories c
         LEFT JOIN budget_categories p ON c.parent_id=p.id
         WHERE c.parent_id IS NOT NULL
           AND (p.id IS NULL OR p.parent_id IS NOT NULL OR p.project_id != c.project_id)
         ORDER BY c.id",
    )?;

    // 5) Executed spend the budget report cannot attribute
    collect(
        "executed_without_budget_link",
        "SELECT 'tx ' || id FROM transactions
         WHERE transaction_type=1 AND budget_item_id IS NULL
           AND (category IS NULL OR trim(category)='')
           AND lower(trim(IFNULL(type,''))) != 'income'
         ORDER BY id",
    )?;

    // 6) Legacy non-positive amounts the forecast ignores
    collect(
        "transaction_non_positive_amount",
        "SELECT 'tx ' || id || ' amount ' || amount FROM transactions
         WHERE CAST(amount AS REAL) <= 0 ORDER BY id",
    )?;

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
