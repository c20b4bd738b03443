//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating payroll,
//! rendering payslips, and talking to storage.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::InvalidMonth {
///     value: "13~2026".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid payroll month '13~2026': expected MM~YYYY");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A request did not name the organization it targets.
    #[error("Organization id is required")]
    MissingOrganization,

    /// The organization does not exist.
    #[error("Organization not found: {organization_id}")]
    OrganizationNotFound {
        /// The organization id that was looked up.
        organization_id: String,
    },

    /// The employee does not exist in the organization.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee id that was looked up.
        employee_id: String,
    },

    /// A payroll month string was not in `MM~YYYY` form.
    #[error("Invalid payroll month '{value}': expected MM~YYYY")]
    InvalidMonth {
        /// The rejected value.
        value: String,
    },

    /// A date range was malformed.
    #[error("Invalid date range: {message}")]
    InvalidDateRange {
        /// A description of what made the range invalid.
        message: String,
    },

    /// A salary adjustment carried an invalid amount.
    #[error("Invalid adjustment '{label}': {message}")]
    InvalidAdjustment {
        /// The adjustment label.
        label: String,
        /// A description of what made the adjustment invalid.
        message: String,
    },

    /// The PAYE tax slab table is inconsistent.
    #[error("Invalid tax table: {message}")]
    InvalidTaxTable {
        /// A description of the inconsistency.
        message: String,
    },

    /// The payslip URL mode was neither `P` nor `D`.
    #[error("Invalid payslip mode '{mode}': expected P or D")]
    InvalidPayslipMode {
        /// The rejected mode.
        mode: String,
    },

    /// No payroll exists for the employee and month.
    #[error("Payroll not found for employee '{employee_id}' in {month}")]
    PayrollNotFound {
        /// The employee id.
        employee_id: String,
        /// The payroll month.
        month: String,
    },

    /// A payroll already exists for the employee and month.
    #[error("Payroll already exists for employee '{employee_id}' in {month}")]
    PayrollExists {
        /// The employee id.
        employee_id: String,
        /// The payroll month.
        month: String,
    },

    /// The payslip PDF could not be rendered.
    #[error("Failed to render payslip for employee '{employee_id}': {message}")]
    PayslipRender {
        /// The employee the payslip was for.
        employee_id: String,
        /// A description of the rendering failure.
        message: String,
    },

    /// An object storage operation failed.
    #[error("Storage error for '{key}': {message}")]
    Storage {
        /// The object key involved.
        key: String,
        /// A description of the failure.
        message: String,
    },

    /// A stored object does not exist.
    #[error("Stored object not found: {key}")]
    ObjectNotFound {
        /// The object key that was looked up.
        key: String,
    },

    /// A signed download link was invalid or expired.
    #[error("Invalid or expired download signature")]
    InvalidSignature,

    /// The caller's identity was not supplied.
    #[error("Caller identity is required")]
    MissingIdentity,

    /// The record store failed.
    #[error("Repository error: {message}")]
    Repository {
        /// A description of the failure.
        message: String,
    },

    /// A payroll batch stopped at the first failing employee.
    #[error("Payroll batch aborted at employee '{employee_id}': {message}")]
    BatchAborted {
        /// The employee whose processing failed.
        employee_id: String,
        /// The failure that aborted the batch.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
