// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only queries the report engines run against the project store.

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::classify::AccountClass;
use crate::error::ReportError;
use crate::models::{
    Account, AccountType, BudgetCategory, BudgetPlan, CustomerPaymentPlan, Project, Transaction,
};

/// Query interface the engines read through. `None` for a project id means
/// every project.
pub trait ReportSource {
    fn projects(&self) -> Result<Vec<Project>, ReportError>;

    fn transactions(&self, project_id: Option<i64>) -> Result<Vec<Transaction>, ReportError>;

    fn payment_plans(
        &self,
        project_id: Option<i64>,
    ) -> Result<Vec<CustomerPaymentPlan>, ReportError>;

    /// Budget plans whose category belongs to the project.
    fn budget_plans(&self, project_id: Option<i64>) -> Result<Vec<BudgetPlan>, ReportError>;

    fn budget_categories(&self, project_id: i64) -> Result<Vec<BudgetCategory>, ReportError>;

    /// Every account with its type, keyed by id.
    fn accounts(&self) -> Result<HashMap<i64, Account>, ReportError>;
}

pub(crate) fn stored_decimal(
    table: &'static str,
    id: i64,
    raw: &str,
) -> Result<Decimal, ReportError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| ReportError::invalid(table, id, format!("amount '{}': {}", raw, e)))
}

fn stored_opt_decimal(
    table: &'static str,
    id: i64,
    raw: Option<String>,
) -> Result<Option<Decimal>, ReportError> {
    match raw {
        Some(s) if !s.trim().is_empty() => stored_decimal(table, id, &s).map(Some),
        _ => Ok(None),
    }
}

/// Dates are `YYYY-MM-DD`; a trailing time part from legacy imports is ignored.
pub(crate) fn stored_date(
    table: &'static str,
    id: i64,
    raw: Option<String>,
) -> Result<Option<NaiveDate>, ReportError> {
    let Some(s) = raw else {
        return Ok(None);
    };
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| ReportError::invalid(table, id, format!("date '{}': {}", s, e)))
}

impl ReportSource for Connection {
    fn projects(&self) -> Result<Vec<Project>, ReportError> {
        let mut stmt = self.prepare("SELECT id, name, status FROM projects ORDER BY id")?;
        let rows = stmt.query_map([], |r| {
            Ok(Project {
                id: r.get(0)?,
                name: r.get(1)?,
                status: r.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn transactions(&self, project_id: Option<i64>) -> Result<Vec<Transaction>, ReportError> {
        let mut stmt = self.prepare_cached(
            "SELECT id, date, amount, project_id, from_account_id, to_account_id, type,
                    transaction_type, phase_id, budget_item_id, category, vat_rate, remarks
             FROM transactions
             WHERE (?1 IS NULL OR project_id=?1)
             ORDER BY id",
        )?;
        let mut cur = stmt.query(params![project_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let amount: String = r.get(2)?;
            let vat: String = r.get(11)?;
            out.push(Transaction {
                id,
                date: stored_date("transactions", id, r.get(1)?)?,
                amount: stored_decimal("transactions", id, &amount)?,
                project_id: r.get(3)?,
                from_account_id: r.get(4)?,
                to_account_id: r.get(5)?,
                r#type: r.get(6)?,
                transaction_type: r.get(7)?,
                phase_id: r.get(8)?,
                budget_item_id: r.get(9)?,
                category: r.get(10)?,
                vat_rate: stored_decimal("transactions", id, &vat)?,
                remarks: r.get(12)?,
            });
        }
        Ok(out)
    }

    fn payment_plans(
        &self,
        project_id: Option<i64>,
    ) -> Result<Vec<CustomerPaymentPlan>, ReportError> {
        let mut stmt = self.prepare_cached(
            "SELECT id, project_id, phase_id, apartment_id, manual_date, value, remarks
             FROM customer_payment_plans
             WHERE (?1 IS NULL OR project_id=?1)
             ORDER BY id",
        )?;
        let mut cur = stmt.query(params![project_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            out.push(CustomerPaymentPlan {
                id,
                project_id: r.get(1)?,
                phase_id: r.get(2)?,
                apartment_id: r.get(3)?,
                manual_date: stored_date("customer_payment_plans", id, r.get(4)?)?,
                value: stored_opt_decimal("customer_payment_plans", id, r.get(5)?)?,
                remarks: r.get(6)?,
            });
        }
        Ok(out)
    }

    fn budget_plans(&self, project_id: Option<i64>) -> Result<Vec<BudgetPlan>, ReportError> {
        let mut stmt = self.prepare_cached(
            "SELECT bp.id, bp.budget_category_id, bp.planned_date, bp.amount, bp.description
             FROM budget_plans bp
             JOIN budget_categories bc ON bp.budget_category_id=bc.id
             WHERE (?1 IS NULL OR bc.project_id=?1)
             ORDER BY bp.id",
        )?;
        let mut cur = stmt.query(params![project_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let amount: String = r.get(3)?;
            out.push(BudgetPlan {
                id,
                budget_category_id: r.get(1)?,
                planned_date: stored_date("budget_plans", id, r.get(2)?)?,
                amount: stored_decimal("budget_plans", id, &amount)?,
                description: r.get(4)?,
            });
        }
        Ok(out)
    }

    fn budget_categories(&self, project_id: i64) -> Result<Vec<BudgetCategory>, ReportError> {
        let mut stmt = self.prepare_cached(
            "SELECT id, project_id, category_name, planned_amount, parent_id
             FROM budget_categories
             WHERE project_id=?1
             ORDER BY id",
        )?;
        let mut cur = stmt.query(params![project_id])?;
        let mut out = Vec::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let planned: String = r.get(3)?;
            out.push(BudgetCategory {
                id,
                project_id: r.get(1)?,
                category_name: r.get(2)?,
                planned_amount: stored_decimal("budget_categories", id, &planned)?,
                parent_id: r.get(4)?,
            });
        }
        Ok(out)
    }

    fn accounts(&self) -> Result<HashMap<i64, Account>, ReportError> {
        let mut stmt = self.prepare_cached(
            "SELECT a.id, a.name, a.is_system_account, a.remarks, t.id, t.name, t.class
             FROM accounts a
             LEFT JOIN account_types t ON a.account_type_id=t.id",
        )?;
        let mut cur = stmt.query([])?;
        let mut out = HashMap::new();
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let type_id: Option<i64> = r.get(4)?;
            let account_type = match type_id {
                Some(tid) => {
                    let class: String = r.get(6)?;
                    let class = class
                        .parse::<AccountClass>()
                        .map_err(|e| ReportError::invalid("account_types", tid, e))?;
                    Some(AccountType {
                        id: tid,
                        name: r.get(5)?,
                        class,
                    })
                }
                None => None,
            };
            out.insert(
                id,
                Account {
                    id,
                    name: r.get(1)?,
                    account_type,
                    is_system_account: r.get::<_, i64>(2)? != 0,
                    remarks: r.get(3)?,
                },
            );
        }
        Ok(out)
    }
}
