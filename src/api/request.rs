//! Request types for the payroll API.
//!
//! Query strings name the organization with `orgId`. Bodies and path
//! segments carry months as `MM~YYYY` and ranges as `[startISO, endISO]`.

use serde::{Deserialize, Serialize};

use crate::batch::{BatchRequest, FailurePolicy};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{DateRange, PayrollMonth};

/// Query naming the target organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgQuery {
    /// The organization id.
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
}

impl OrgQuery {
    /// Returns the organization id, failing with `MissingOrganization` if absent or blank.
    pub fn require(&self) -> PayrollResult<&str> {
        require_org(self.org_id.as_deref())
    }
}

/// Query of `POST /payroll/calculate-all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculateAllQuery {
    /// The organization id.
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    /// Overrides the configured failure policy.
    #[serde(default)]
    pub policy: Option<FailurePolicy>,
}

/// Query of `GET /payroll`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The organization id.
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    /// Case-insensitive filter on employee id, name and month.
    #[serde(default)]
    pub search: Option<String>,
}

/// Body of the batch and preview endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollPeriodRequest {
    /// The meal-cost window.
    pub range: DateRange,
    /// The payroll month.
    pub month: PayrollMonth,
}

impl PayrollPeriodRequest {
    /// Builds the batch request for an organization.
    pub fn into_batch(self, organization_id: impl Into<String>) -> BatchRequest {
        BatchRequest {
            organization_id: organization_id.into(),
            month: self.month,
            meal_window: self.range,
        }
    }
}

/// Query of a signed payslip link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileQuery {
    /// `inline` or `attachment`.
    pub disposition: String,
    /// Unix time after which the link is refused.
    pub expires: i64,
    /// Hex HMAC over key, disposition and expiry.
    pub signature: String,
}

pub(crate) fn require_org(org_id: Option<&str>) -> PayrollResult<&str> {
    match org_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(PayrollError::MissingOrganization),
    }
}
