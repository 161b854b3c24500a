// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Planned vs. actual spend per budget category, with phase roll-ups.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::classify::same_category_name;
use crate::error::ReportError;
use crate::models::{BudgetCategory, Transaction};
use crate::store::ReportSource;

/// A top-level category together with the items filed under it.
#[derive(Debug, Clone)]
pub struct Phase {
    pub category: BudgetCategory,
    pub items: Vec<BudgetCategory>,
}

/// Two-level phase -> item view of a project's budget categories, both
/// levels sorted by id.
#[derive(Debug, Clone, Default)]
pub struct BudgetTree {
    pub phases: Vec<Phase>,
}

impl BudgetTree {
    /// Rows that do not fit the two-level shape (a parent that is missing or
    /// is itself an item) are left out of the tree.
    pub fn from_categories(categories: Vec<BudgetCategory>) -> Self {
        let phase_ids: HashSet<i64> = categories
            .iter()
            .filter(|c| c.is_phase())
            .map(|c| c.id)
            .collect();

        let mut phases: BTreeMap<i64, Phase> = BTreeMap::new();
        let mut items = Vec::new();
        for cat in categories {
            match cat.parent_id {
                None => {
                    phases.insert(
                        cat.id,
                        Phase {
                            category: cat,
                            items: Vec::new(),
                        },
                    );
                }
                Some(parent) if phase_ids.contains(&parent) => items.push(cat),
                Some(parent) => warn!(
                    category = cat.id,
                    parent, "budget category is not under a phase; skipped"
                ),
            }
        }
        for item in items {
            if let Some(phase) = item.parent_id.and_then(|p| phases.get_mut(&p)) {
                phase.items.push(item);
            }
        }
        for phase in phases.values_mut() {
            phase.items.sort_by_key(|c| c.id);
        }
        BudgetTree {
            phases: phases.into_values().collect(),
        }
    }

    /// Validates the parent of a category about to be created in `project_id`.
    /// Items may only hang directly off a phase of the same project.
    pub fn check_parent(
        existing: &[BudgetCategory],
        project_id: i64,
        parent_id: Option<i64>,
    ) -> Result<(), ReportError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let parent = existing
            .iter()
            .find(|c| c.id == parent_id)
            .ok_or_else(|| {
                ReportError::Hierarchy(format!(
                    "parent category {} not found in project {}",
                    parent_id, project_id
                ))
            })?;
        if parent.project_id != project_id {
            return Err(ReportError::Hierarchy(format!(
                "parent category {} belongs to project {}",
                parent_id, parent.project_id
            )));
        }
        if !parent.is_phase() {
            return Err(ReportError::Hierarchy(format!(
                "category {} is an item; items cannot have children",
                parent_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetReportRow {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub is_parent: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub planned: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub variance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub progress: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub children_planned_total: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub children_actual_total: Option<Decimal>,
}

impl BudgetReportRow {
    fn new(cat: &BudgetCategory, planned: Decimal, actual: Decimal) -> Self {
        BudgetReportRow {
            id: cat.id,
            name: cat.category_name.clone(),
            parent_id: cat.parent_id,
            is_parent: cat.is_phase(),
            planned,
            actual,
            variance: actual - planned,
            progress: progress(actual, planned),
            children_planned_total: None,
            children_actual_total: None,
        }
    }

    pub fn rounded(&self) -> Self {
        BudgetReportRow {
            planned: self.planned.round_dp(2),
            actual: self.actual.round_dp(2),
            variance: self.variance.round_dp(2),
            progress: self.progress.round_dp(2),
            children_planned_total: self.children_planned_total.map(|d| d.round_dp(2)),
            children_actual_total: self.children_actual_total.map(|d| d.round_dp(2)),
            ..self.clone()
        }
    }
}

/// `actual / planned * 100`, 0 when nothing was planned.
pub fn progress(actual: Decimal, planned: Decimal) -> Decimal {
    if planned <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    actual / planned * Decimal::ONE_HUNDRED
}

/// Executed spend for one category. Transactions linked by id count first;
/// only when they sum to zero are transactions whose free-text category
/// matches the category name counted instead.
pub fn category_actual(category: &BudgetCategory, executed: &[&Transaction]) -> Decimal {
    let by_id: Decimal = executed
        .iter()
        .filter(|tx| tx.budget_item_id == Some(category.id))
        .map(|tx| tx.amount.abs())
        .sum();
    if !by_id.is_zero() {
        return by_id;
    }
    executed
        .iter()
        .filter(|tx| {
            tx.category
                .as_deref()
                .is_some_and(|name| same_category_name(name, &category.category_name))
        })
        .map(|tx| tx.amount.abs())
        .sum()
}

#[instrument(skip(store))]
pub fn generate_budget_report<S: ReportSource + ?Sized>(
    store: &S,
    project_id: i64,
) -> Result<Vec<BudgetReportRow>, ReportError> {
    let categories = store.budget_categories(project_id)?;
    let transactions = store.transactions(Some(project_id))?;
    debug!(
        categories = categories.len(),
        transactions = transactions.len(),
        "budget inputs loaded"
    );
    Ok(build_budget_report(
        &BudgetTree::from_categories(categories),
        &transactions,
    ))
}

pub fn build_budget_report(
    tree: &BudgetTree,
    transactions: &[Transaction],
) -> Vec<BudgetReportRow> {
    let executed: Vec<&Transaction> = transactions.iter().filter(|t| t.is_executed()).collect();

    let mut report = Vec::new();
    for phase in &tree.phases {
        let item_rows: Vec<BudgetReportRow> = phase
            .items
            .iter()
            .map(|item| {
                let actual = category_actual(item, &executed);
                BudgetReportRow::new(item, item.planned_amount, actual)
            })
            .collect();

        let children_planned: Decimal = item_rows.iter().map(|r| r.planned).sum();
        let children_actual: Decimal = item_rows.iter().map(|r| r.actual).sum();

        let own_planned = phase.category.planned_amount;
        let planned = if own_planned > Decimal::ZERO {
            own_planned
        } else {
            children_planned
        };
        let actual = children_actual + category_actual(&phase.category, &executed);

        let mut phase_row = BudgetReportRow::new(&phase.category, planned, actual);
        phase_row.children_planned_total = Some(children_planned);
        phase_row.children_actual_total = Some(children_actual);

        report.push(phase_row);
        report.extend(item_rows);
    }
    report
}
