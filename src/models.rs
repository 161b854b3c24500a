// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::{AccountClass, FlowType};

/// `transaction_type` value marking money that has actually moved.
pub const EXECUTED: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountType {
    pub id: i64,
    pub name: String,
    pub class: AccountClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: Option<AccountType>,
    pub is_system_account: bool,
    pub remarks: Option<String>,
}

impl Account {
    pub fn class(&self) -> AccountClass {
        self.account_type
            .as_ref()
            .map(|t| t.class)
            .unwrap_or(AccountClass::Neutral)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub project_id: Option<i64>,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub r#type: Option<String>, // free text, normally "income" / "expense"
    pub transaction_type: Option<i64>,
    pub phase_id: Option<i64>,
    pub budget_item_id: Option<i64>,
    pub category: Option<String>, // legacy name link to a budget category
    pub vat_rate: Decimal,
    pub remarks: Option<String>,
}

impl Transaction {
    pub fn is_executed(&self) -> bool {
        self.transaction_type == Some(EXECUTED)
    }

    pub fn flow_type(&self) -> Option<FlowType> {
        FlowType::parse(self.r#type.as_deref())
    }
}

/// Scheduled incoming payment from a buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPaymentPlan {
    pub id: i64,
    pub project_id: Option<i64>,
    pub phase_id: Option<i64>,
    pub apartment_id: Option<i64>,
    pub manual_date: Option<NaiveDate>,
    pub value: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Scheduled outgoing payment against one budget category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub id: i64,
    pub budget_category_id: i64,
    pub planned_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: i64,
    pub project_id: i64,
    pub category_name: String,
    pub planned_amount: Decimal,
    pub parent_id: Option<i64>,
}

impl BudgetCategory {
    pub fn is_phase(&self) -> bool {
        self.parent_id.is_none()
    }
}
