// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly cash-flow forecast: executed transactions merged with the still
//! outstanding part of customer payment plans and budget plans.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::classify::{FlowType, classify_direction};
use crate::error::ReportError;
use crate::models::{Account, BudgetPlan, CustomerPaymentPlan, Transaction};
use crate::store::ReportSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastRow {
    /// `YYYY-MM`
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub planned_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub planned_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_flow: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_balance: Decimal,
}

impl ForecastRow {
    /// Copy with every amount rounded to cents, for display and export.
    pub fn rounded(&self) -> Self {
        ForecastRow {
            date: self.date.clone(),
            actual_income: self.actual_income.round_dp(2),
            actual_expense: self.actual_expense.round_dp(2),
            planned_income: self.planned_income.round_dp(2),
            planned_expense: self.planned_expense.round_dp(2),
            net_flow: self.net_flow.round_dp(2),
            cumulative_balance: self.cumulative_balance.round_dp(2),
        }
    }
}

/// Everything one forecast run reads from the store.
#[derive(Debug, Clone, Default)]
pub struct ForecastInputs {
    pub transactions: Vec<Transaction>,
    pub payment_plans: Vec<CustomerPaymentPlan>,
    pub budget_plans: Vec<BudgetPlan>,
    pub accounts: HashMap<i64, Account>,
}

impl ForecastInputs {
    pub fn load<S: ReportSource + ?Sized>(
        store: &S,
        project_id: Option<i64>,
    ) -> Result<Self, ReportError> {
        Ok(ForecastInputs {
            transactions: store.transactions(project_id)?,
            payment_plans: store.payment_plans(project_id)?,
            budget_plans: store.budget_plans(project_id)?,
            accounts: store.accounts()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthTotals {
    actual_income: Decimal,
    actual_expense: Decimal,
    planned_income: Decimal,
    planned_expense: Decimal,
}

/// Builds the forecast for one project, or for all projects when
/// `project_id` is `None`. `as_of` decides which month overdue plans roll
/// into.
#[instrument(skip(store))]
pub fn generate_cash_flow_forecast<S: ReportSource + ?Sized>(
    store: &S,
    project_id: Option<i64>,
    as_of: NaiveDate,
) -> Result<Vec<ForecastRow>, ReportError> {
    let inputs = ForecastInputs::load(store, project_id)?;
    debug!(
        transactions = inputs.transactions.len(),
        payment_plans = inputs.payment_plans.len(),
        budget_plans = inputs.budget_plans.len(),
        "forecast inputs loaded"
    );
    Ok(build_forecast(&inputs, as_of))
}

pub fn build_forecast(inputs: &ForecastInputs, as_of: NaiveDate) -> Vec<ForecastRow> {
    let current_month = month_start(as_of);
    let mut months: BTreeMap<String, MonthTotals> = BTreeMap::new();

    add_planned_income(&mut months, &inputs.transactions, &inputs.payment_plans, current_month);
    add_planned_expense(&mut months, &inputs.transactions, &inputs.budget_plans, current_month);
    add_actuals(&mut months, &inputs.transactions, &inputs.accounts);

    accumulate(months)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Plans due before the current month are carried into it.
pub fn rolled_month(due: NaiveDate, current_month: NaiveDate) -> NaiveDate {
    if due < current_month { current_month } else { due }
}

/// Amounts are positive magnitudes; legacy rows at or below zero carry no flow.
fn has_amount(tx: &Transaction) -> bool {
    tx.amount > Decimal::ZERO
}

/// Income already received per payment phase, regardless of execution status.
pub fn actual_income_by_phase(transactions: &[Transaction]) -> HashMap<i64, Decimal> {
    let mut by_phase: HashMap<i64, Decimal> = HashMap::new();
    for tx in transactions.iter().filter(|tx| has_amount(tx)) {
        if let (Some(phase), Some(FlowType::Income)) = (tx.phase_id, tx.flow_type()) {
            *by_phase.entry(phase).or_insert(Decimal::ZERO) += tx.amount;
        }
    }
    by_phase
}

/// Part of a payment plan not yet covered by income received for its phase.
/// `None` when nothing is outstanding or the plan has no positive value.
pub fn outstanding_remainder(
    plan: &CustomerPaymentPlan,
    received_by_phase: &HashMap<i64, Decimal>,
) -> Option<Decimal> {
    let value = plan.value.filter(|v| *v > Decimal::ZERO)?;
    let received = plan
        .phase_id
        .and_then(|p| received_by_phase.get(&p).copied())
        .unwrap_or(Decimal::ZERO);
    if received >= value {
        return None;
    }
    Some(value - received)
}

fn add_planned_income(
    months: &mut BTreeMap<String, MonthTotals>,
    transactions: &[Transaction],
    plans: &[CustomerPaymentPlan],
    current_month: NaiveDate,
) {
    let received = actual_income_by_phase(transactions);
    let mut rolled = 0usize;
    for plan in plans {
        let Some(remainder) = outstanding_remainder(plan, &received) else {
            continue;
        };
        let Some(due) = plan.manual_date else {
            continue;
        };
        let effective = rolled_month(due, current_month);
        if effective != due {
            rolled += 1;
        }
        months.entry(month_key(effective)).or_default().planned_income += remainder;
    }
    debug!(plans = plans.len(), rolled, "planned income bucketed");
}

/// Share of a category's plan still unspent: `max(0, (planned - actual) / planned)`,
/// or 1 when either side is not positive.
pub fn remaining_ratio(total_planned: Decimal, total_actual: Decimal) -> Decimal {
    if total_planned <= Decimal::ZERO || total_actual <= Decimal::ZERO {
        return Decimal::ONE;
    }
    ((total_planned - total_actual) / total_planned).max(Decimal::ZERO)
}

fn add_planned_expense(
    months: &mut BTreeMap<String, MonthTotals>,
    transactions: &[Transaction],
    plans: &[BudgetPlan],
    current_month: NaiveDate,
) {
    let mut spent_by_category: HashMap<i64, Decimal> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.is_executed() && has_amount(tx))
    {
        if let Some(cat) = tx.budget_item_id {
            *spent_by_category.entry(cat).or_insert(Decimal::ZERO) += tx.amount;
        }
    }

    let live = || plans.iter().filter(|bp| bp.amount > Decimal::ZERO);
    let mut planned_by_category: HashMap<i64, Decimal> = HashMap::new();
    for bp in live() {
        *planned_by_category
            .entry(bp.budget_category_id)
            .or_insert(Decimal::ZERO) += bp.amount;
    }

    let mut scaled = 0usize;
    for bp in live() {
        let Some(planned_date) = bp.planned_date else {
            continue;
        };
        let effective = rolled_month(planned_date, current_month);
        let ratio = remaining_ratio(
            planned_by_category
                .get(&bp.budget_category_id)
                .copied()
                .unwrap_or(Decimal::ZERO),
            spent_by_category
                .get(&bp.budget_category_id)
                .copied()
                .unwrap_or(Decimal::ZERO),
        );
        if ratio != Decimal::ONE {
            scaled += 1;
        }
        months.entry(month_key(effective)).or_default().planned_expense += bp.amount * ratio;
    }
    debug!(plans = plans.len(), scaled, "planned expense bucketed");
}

fn add_actuals(
    months: &mut BTreeMap<String, MonthTotals>,
    transactions: &[Transaction],
    accounts: &HashMap<i64, Account>,
) {
    for tx in transactions {
        let Some(date) = tx.date else {
            continue;
        };
        if !has_amount(tx) {
            continue;
        }
        let entry = months.entry(month_key(date)).or_default();
        match classify_direction(tx, accounts) {
            FlowType::Income => entry.actual_income += tx.amount,
            FlowType::Expense => entry.actual_expense += tx.amount,
        }
    }
}

/// Walks months in key order carrying the running balance.
fn accumulate(months: BTreeMap<String, MonthTotals>) -> Vec<ForecastRow> {
    let mut cumulative = Decimal::ZERO;
    let mut rows = Vec::with_capacity(months.len());
    for (month, t) in months {
        let actual_net = t.actual_income - t.actual_expense;
        let planned_net = t.planned_income - t.planned_expense;
        let net_flow = actual_net + planned_net;
        cumulative += net_flow;
        rows.push(ForecastRow {
            date: month,
            actual_income: t.actual_income,
            actual_expense: t.actual_expense,
            planned_income: t.planned_income,
            planned_expense: t.planned_expense,
            net_flow,
            cumulative_balance: cumulative,
        });
    }
    rows
}
