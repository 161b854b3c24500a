// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors raised while reading report inputs or enforcing the budget hierarchy.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The store could not be read.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A stored value could not be interpreted.
    #[error("Invalid {table} row {id}: {reason}")]
    InvalidRecord {
        table: &'static str,
        id: i64,
        reason: String,
    },

    /// A budget category would break the phase -> item shape.
    #[error("Budget hierarchy violation: {0}")]
    Hierarchy(String),
}

impl ReportError {
    pub fn invalid(table: &'static str, id: i64, reason: impl Into<String>) -> Self {
        ReportError::InvalidRecord {
            table,
            id,
            reason: reason.into(),
        }
    }
}
