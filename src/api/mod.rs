//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints that run payroll batches,
//! list and fetch payroll records, and hand out signed payslip links.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{EMPLOYEE_ID_HEADER, create_router};
pub use request::{CalculateAllQuery, FileQuery, OrgQuery, PayrollPeriodRequest, SearchQuery};
pub use response::{ApiError, ApiErrorResponse, DeleteResponse, PayrollListItem, SignedUrlResponse};
pub use state::AppState;
