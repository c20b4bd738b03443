//! Response types for the payroll API.
//!
//! This module defines the error response structures, the mapping from
//! [`PayrollError`] to HTTP statuses, and the JSON bodies of successful
//! responses that are not plain domain types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PayrollError;
use crate::models::{PayrollMonth, PayrollRecord};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a response from a status and body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            PayrollError::ConfigNotFound { .. } | PayrollError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            PayrollError::MissingOrganization => (StatusCode::BAD_REQUEST, "MISSING_ORG_ID"),
            PayrollError::OrganizationNotFound { .. } => {
                (StatusCode::NOT_FOUND, "ORGANIZATION_NOT_FOUND")
            }
            PayrollError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            PayrollError::InvalidMonth { .. } => (StatusCode::BAD_REQUEST, "INVALID_MONTH"),
            PayrollError::InvalidDateRange { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_DATE_RANGE")
            }
            PayrollError::InvalidAdjustment { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_ADJUSTMENT")
            }
            PayrollError::InvalidTaxTable { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TAX_TABLE_ERROR")
            }
            PayrollError::InvalidPayslipMode { .. } => (StatusCode::BAD_REQUEST, "INVALID_MODE"),
            PayrollError::PayrollNotFound { .. } => (StatusCode::NOT_FOUND, "PAYROLL_NOT_FOUND"),
            PayrollError::PayrollExists { .. } => (StatusCode::CONFLICT, "PAYROLL_EXISTS"),
            PayrollError::PayslipRender { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PAYSLIP_RENDER_ERROR")
            }
            PayrollError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            PayrollError::ObjectNotFound { .. } => (StatusCode::NOT_FOUND, "OBJECT_NOT_FOUND"),
            PayrollError::InvalidSignature => (StatusCode::FORBIDDEN, "INVALID_SIGNATURE"),
            PayrollError::MissingIdentity => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            PayrollError::Repository { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
            }
            PayrollError::BatchAborted { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "BATCH_ABORTED")
            }
            PayrollError::CalculationError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CALCULATION_ERROR")
            }
        };
        ApiErrorResponse::new(status, ApiError::new(code, message))
    }
}

/// A payroll record joined with the employee's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollListItem {
    /// Record id.
    pub id: Uuid,
    /// The employee paid.
    pub employee_id: String,
    /// The employee's name, empty if the employee no longer exists.
    pub employee_name: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// Gross salary.
    pub gross_salary: Decimal,
    /// Deductions excluding PAYE.
    pub total_deductions: Decimal,
    /// PAYE withheld.
    pub income_tax: Decimal,
    /// Net salary.
    pub net_salary: Decimal,
    /// Payslip storage path.
    pub payroll_pdf: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl PayrollListItem {
    /// Joins a record with an employee name.
    pub fn new(record: PayrollRecord, employee_name: impl Into<String>) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_id,
            employee_name: employee_name.into(),
            month: record.month,
            gross_salary: record.gross_salary,
            total_deductions: record.total_deductions,
            income_tax: record.income_tax,
            net_salary: record.net_salary,
            payroll_pdf: record.payroll_pdf,
            created_at: record.created_at,
        }
    }

    /// Returns true if `needle` appears in the employee id, name or month, ignoring case.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.employee_id.to_lowercase().contains(&needle)
            || self.employee_name.to_lowercase().contains(&needle)
            || self.month.to_string().contains(&needle)
    }
}

/// Body of a signed download link response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrlResponse {
    /// The signed link.
    pub url: String,
}

/// Body of a month deletion response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Number of payroll records deleted.
    pub deleted: usize,
}
