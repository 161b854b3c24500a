// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod apartments;
pub mod budgets;
pub mod config;
pub mod doctor;
pub mod exporter;
pub mod payments;
pub mod projects;
pub mod reports;
pub mod transactions;
