// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Direction and category matching rules shared by the report engines.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Account, Transaction};

/// Which way money tends to flow through accounts of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountClass {
    #[serde(rename = "income")]
    IncomeBearing,
    #[serde(rename = "expense")]
    ExpenseBearing,
    #[serde(rename = "neutral")]
    Neutral,
}

impl AccountClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountClass::IncomeBearing => "income",
            AccountClass::ExpenseBearing => "expense",
            AccountClass::Neutral => "neutral",
        }
    }

    /// Guess a class from a free-text account type name.
    ///
    /// Only used when an account type is created without an explicit class,
    /// e.g. while loading legacy type names like "Project Account" or
    /// "Supplier". Reports never call this; they read the stored class.
    pub fn infer_from_type_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if lowered.contains("project") || lowered.contains("income") {
            AccountClass::IncomeBearing
        } else if lowered.contains("supplier") || lowered.contains("expense") {
            AccountClass::ExpenseBearing
        } else {
            AccountClass::Neutral
        }
    }
}

impl fmt::Display for AccountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(AccountClass::IncomeBearing),
            "expense" => Ok(AccountClass::ExpenseBearing),
            "neutral" => Ok(AccountClass::Neutral),
            other => Err(format!(
                "Unknown account class '{}', expected income|expense|neutral",
                other
            )),
        }
    }
}

/// Direction of a money movement as seen by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Income,
    Expense,
}

impl FlowType {
    /// Reads a transaction `type` tag, ignoring case and surrounding space.
    /// Anything other than "income" or "expense" yields `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let tag = raw?.trim().to_lowercase();
        match tag.as_str() {
            "income" => Some(FlowType::Income),
            "expense" => Some(FlowType::Expense),
            _ => None,
        }
    }
}

/// Classifies an actual transaction as income or expense.
///
/// The explicit `type` tag wins. Untagged transactions are income only when
/// they land in an income-bearing account; every other combination,
/// including unknown accounts and money leaving a project account, counts
/// as expense so that no flow is dropped.
pub fn classify_direction(tx: &Transaction, accounts: &HashMap<i64, Account>) -> FlowType {
    if let Some(tagged) = tx.flow_type() {
        return tagged;
    }
    let to_class = tx
        .to_account_id
        .and_then(|id| accounts.get(&id))
        .map(Account::class);
    match to_class {
        Some(AccountClass::IncomeBearing) => FlowType::Income,
        _ => FlowType::Expense,
    }
}

/// Case- and whitespace-insensitive category name equality.
pub fn same_category_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
