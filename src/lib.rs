//! Payroll engine for cafeteria and HR organizations.
//!
//! This crate calculates monthly salaries from basic pay, percentage and
//! fixed-value adjustments, meal-order costs and a progressive PAYE table,
//! renders each result as a PDF payslip, and persists one payroll record per
//! employee and month. An axum API drives batches and serves signed links to
//! the stored payslips.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payslip;
pub mod repository;
pub mod storage;
