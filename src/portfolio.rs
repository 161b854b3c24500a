// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-project summary built from the per-project forecast and budget reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::budget::{BudgetReportRow, generate_budget_report, progress};
use crate::error::ReportError;
use crate::forecast::{ForecastInputs, ForecastRow, build_forecast};
use crate::models::Project;
use crate::store::ReportSource;

/// Item progress at or above this percentage (and not over budget) is flagged.
pub const WARNING_PROGRESS: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Project statuses that count toward the portfolio.
pub const REPORTED_STATUSES: &[&str] = &["active", "completed"];

/// Drafts and other non-running projects stay out of the portfolio.
pub fn is_reported(project: &Project) -> bool {
    project.status.as_deref().is_some_and(|s| {
        let s = s.trim();
        REPORTED_STATUSES.iter().any(|r| s.eq_ignore_ascii_case(r))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorstCategory {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub progress: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub overrun: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_budget: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_collected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub collection_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_cash_flow: Decimal,
    pub categories_warning: usize,
    pub worst_category: Option<WorstCategory>,
    pub cash_flow: Vec<ForecastRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioTotals {
    pub project_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_budget: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget_progress: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_collected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub collection_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_cash_flow: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub projects: Vec<ProjectSummary>,
    pub totals: PortfolioTotals,
}

impl PortfolioSummary {
    /// Copy with money and percentages rounded to two places.
    pub fn rounded(&self) -> Self {
        let r = |d: Decimal| d.round_dp(2);
        PortfolioSummary {
            projects: self
                .projects
                .iter()
                .map(|p| ProjectSummary {
                    total_budget: r(p.total_budget),
                    actual_spent: r(p.actual_spent),
                    total_collected: r(p.total_collected),
                    total_revenue: r(p.total_revenue),
                    collection_rate: r(p.collection_rate),
                    net_cash_flow: r(p.net_cash_flow),
                    ..p.clone()
                })
                .collect(),
            totals: PortfolioTotals {
                project_count: self.totals.project_count,
                total_budget: r(self.totals.total_budget),
                total_spent: r(self.totals.total_spent),
                budget_progress: r(self.totals.budget_progress),
                total_collected: r(self.totals.total_collected),
                total_revenue: r(self.totals.total_revenue),
                collection_rate: r(self.totals.collection_rate),
                net_cash_flow: r(self.totals.net_cash_flow),
            },
        }
    }
}

/// Over-budget item with the highest progress, if any item is over budget.
pub fn worst_item(rows: &[BudgetReportRow]) -> Option<WorstCategory> {
    rows.iter()
        .filter(|r| !r.is_parent && r.planned > Decimal::ZERO && r.progress > Decimal::ONE_HUNDRED)
        .max_by(|a, b| a.progress.cmp(&b.progress).then(b.id.cmp(&a.id)))
        .map(|r| WorstCategory {
            id: r.id,
            name: r.name.clone(),
            progress: r.progress.round_dp(2),
            overrun: (r.actual - r.planned).round_dp(2),
        })
}

pub fn warning_count(rows: &[BudgetReportRow]) -> usize {
    rows.iter()
        .filter(|r| {
            !r.is_parent && r.progress >= WARNING_PROGRESS && r.progress <= Decimal::ONE_HUNDRED
        })
        .count()
}

fn summarize_project<S: ReportSource + ?Sized>(
    store: &S,
    id: i64,
    name: String,
    as_of: NaiveDate,
) -> Result<ProjectSummary, ReportError> {
    let inputs = ForecastInputs::load(store, Some(id))?;
    let cash_flow = build_forecast(&inputs, as_of);
    let budget = generate_budget_report(store, id)?;

    let phases = || budget.iter().filter(|r| r.is_parent);
    let total_budget: Decimal = phases().map(|r| r.planned).sum();
    let actual_spent: Decimal = phases().map(|r| r.actual).sum();
    let total_collected: Decimal = cash_flow.iter().map(|r| r.actual_income).sum();
    let total_revenue: Decimal = inputs
        .payment_plans
        .iter()
        .filter_map(|p| p.value)
        .filter(|v| *v > Decimal::ZERO)
        .sum();
    let net_cash_flow = cash_flow
        .last()
        .map(|r| r.cumulative_balance)
        .unwrap_or(Decimal::ZERO);

    Ok(ProjectSummary {
        id,
        name,
        total_budget,
        actual_spent,
        total_collected,
        total_revenue,
        collection_rate: progress(total_collected, total_revenue),
        net_cash_flow,
        categories_warning: warning_count(&budget),
        worst_category: worst_item(&budget),
        cash_flow: cash_flow.iter().map(ForecastRow::rounded).collect(),
    })
}

#[instrument(skip(store))]
pub fn generate_portfolio_summary<S: ReportSource + ?Sized>(
    store: &S,
    as_of: NaiveDate,
) -> Result<PortfolioSummary, ReportError> {
    let mut projects = Vec::new();
    let mut totals = PortfolioTotals::default();
    for project in store.projects()? {
        if !is_reported(&project) {
            debug!(project = project.id, status = ?project.status, "not reported");
            continue;
        }
        let summary = summarize_project(store, project.id, project.name, as_of)?;
        totals.project_count += 1;
        totals.total_budget += summary.total_budget;
        totals.total_spent += summary.actual_spent;
        totals.total_collected += summary.total_collected;
        totals.total_revenue += summary.total_revenue;
        totals.net_cash_flow += summary.net_cash_flow;
        projects.push(summary);
    }
    totals.budget_progress = progress(totals.total_spent, totals.total_budget);
    totals.collection_rate = progress(totals.total_collected, totals.total_revenue);
    debug!(projects = totals.project_count, "portfolio summarized");
    Ok(PortfolioSummary { projects, totals })
}
