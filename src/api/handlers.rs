//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{FailurePolicy, delete_month};
use crate::error::{PayrollError, PayrollResult};
use crate::models::PayrollMonth;
use crate::storage::Disposition;

use super::request::{
    CalculateAllQuery, FileQuery, OrgQuery, PayrollPeriodRequest, SearchQuery, require_org,
};
use super::response::{
    ApiError, ApiErrorResponse, DeleteResponse, PayrollListItem, SignedUrlResponse,
};
use super::state::AppState;

/// Header naming the calling employee, set by the upstream auth layer.
pub const EMPLOYEE_ID_HEADER: &str = "x-employee-id";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll", get(list_handler))
        .route("/payroll/calculate-all", post(calculate_all_handler))
        .route("/payroll/preview/:emp_id", post(preview_handler))
        .route("/payroll/delete-by-month/:month", delete(delete_month_handler))
        .route("/payroll/user/my-payrolls", get(my_payrolls_handler))
        .route(
            "/payroll/geturl/as-hr/:emp_id/:month/:mode",
            get(signed_url_handler),
        )
        .route("/payroll/:emp_id/:month", get(get_payroll_handler))
        .route("/files/*key", get(file_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Logs a failed request and converts the error to its HTTP form.
fn failure(correlation_id: Uuid, error: PayrollError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    ApiErrorResponse::from(error).into_response()
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including our own
            // month and range validation errors.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("Invalid payroll month") {
                ApiError::new("INVALID_MONTH", body_text)
            } else if body_text.contains("Invalid date range") {
                ApiError::new("INVALID_DATE_RANGE", body_text)
            } else if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Query string rejected"
    );
    ApiErrorResponse::bad_request(ApiError::validation_error(body_text)).into_response()
}

async fn ensure_organization(state: &AppState, organization_id: &str) -> PayrollResult<()> {
    match state.repository().find_organization(organization_id).await? {
        Some(_) => Ok(()),
        None => Err(PayrollError::OrganizationNotFound {
            organization_id: organization_id.to_string(),
        }),
    }
}

/// Handler for POST /payroll/calculate-all.
///
/// Runs the batch for every employee of the organization. An aborted batch
/// answers 500 `BATCH_ABORTED` with the report as details.
async fn calculate_all_handler(
    State(state): State<AppState>,
    query: Result<Query<CalculateAllQuery>, QueryRejection>,
    payload: Result<Json<PayrollPeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll batch request");

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };
    let organization_id = match require_org(query.org_id.as_deref()) {
        Ok(id) => id.to_string(),
        Err(err) => return failure(correlation_id, err),
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let policy: FailurePolicy = query.policy.unwrap_or(state.batch().policy());
    let batch = state.batch().with_policy(policy);
    let report = match batch.run(&request.into_batch(organization_id)).await {
        Ok(report) => report,
        Err(err) => return failure(correlation_id, err),
    };

    if report.aborted {
        let (employee_id, message) = report
            .first_failure()
            .map(|o| (o.employee_id.clone(), o.error.clone().unwrap_or_default()))
            .unwrap_or_default();
        let error = PayrollError::BatchAborted {
            employee_id,
            message,
        };
        warn!(
            correlation_id = %correlation_id,
            error = %error,
            skipped = report.skipped,
            "Payroll batch aborted"
        );
        let details = serde_json::to_value(&report).unwrap_or_default();
        let mut response = ApiErrorResponse::from(error);
        response.error.details = Some(details);
        return response.into_response();
    }

    info!(
        correlation_id = %correlation_id,
        organization_id = %report.organization_id,
        month = %report.month,
        generated = report.generated,
        failed = report.failed,
        duration_ms = report.duration_ms,
        "Payroll batch request completed"
    );
    json_response(StatusCode::OK, report)
}

/// Handler for POST /payroll/preview/:emp_id.
async fn preview_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<OrgQuery>, QueryRejection>,
    payload: Result<Json<PayrollPeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing payroll preview"
    );

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };
    let organization_id = match query.require() {
        Ok(id) => id.to_string(),
        Err(err) => return failure(correlation_id, err),
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    match state
        .batch()
        .preview(&organization_id, &employee_id, request.month, &request.range)
        .await
    {
        Ok(preview) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                net_salary = %preview.breakdown.net_salary,
                "Payroll preview calculated"
            );
            json_response(StatusCode::OK, preview)
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for DELETE /payroll/delete-by-month/:month.
async fn delete_month_handler(
    State(state): State<AppState>,
    Path(month): Path<String>,
    query: Result<Query<OrgQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        month = %month,
        "Processing payroll month deletion"
    );

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };
    let result = async {
        let organization_id = query.require()?;
        let month: PayrollMonth = month.parse()?;
        ensure_organization(&state, organization_id).await?;
        delete_month(state.repository(), state.store(), organization_id, month).await
    }
    .await;

    match result {
        Ok(deleted) => json_response(StatusCode::OK, DeleteResponse { deleted }),
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /payroll.
///
/// Lists the organization's records joined with employee names, filtered
/// by `search` on employee id, name and month.
async fn list_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };
    let result = async {
        let organization_id = require_org(query.org_id.as_deref())?;
        ensure_organization(&state, organization_id).await?;

        let names: HashMap<String, String> = state
            .repository()
            .employees(organization_id)
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();
        let needle = query.search.as_deref().unwrap_or_default();

        let items: Vec<PayrollListItem> = state
            .repository()
            .payrolls_for_organization(organization_id)
            .await?
            .into_iter()
            .map(|record| {
                let name = names.get(&record.employee_id).cloned().unwrap_or_default();
                PayrollListItem::new(record, name)
            })
            .filter(|item| item.matches_search(needle))
            .collect();
        Ok::<_, PayrollError>(items)
    }
    .await;

    match result {
        Ok(items) => {
            info!(
                correlation_id = %correlation_id,
                count = items.len(),
                "Listed payrolls"
            );
            json_response(StatusCode::OK, items)
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /payroll/:emp_id/:month.
async fn get_payroll_handler(
    State(state): State<AppState>,
    Path((employee_id, month)): Path<(String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = async {
        let month: PayrollMonth = month.parse()?;
        state
            .repository()
            .find_payroll(&employee_id, month)
            .await?
            .ok_or_else(|| PayrollError::PayrollNotFound {
                employee_id: employee_id.clone(),
                month: month.to_string(),
            })
    }
    .await;

    match result {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /payroll/geturl/as-hr/:emp_id/:month/:mode.
///
/// Mode `P` links for inline viewing, `D` for download.
async fn signed_url_handler(
    State(state): State<AppState>,
    Path((employee_id, month, mode)): Path<(String, String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = async {
        let disposition = Disposition::from_mode(&mode)?;
        let month: PayrollMonth = month.parse()?;
        let record = state
            .repository()
            .find_payroll(&employee_id, month)
            .await?
            .ok_or_else(|| PayrollError::PayrollNotFound {
                employee_id: employee_id.clone(),
                month: month.to_string(),
            })?;

        if !state.store().exists(&record.payroll_pdf).await? {
            return Err(PayrollError::ObjectNotFound {
                key: record.payroll_pdf,
            });
        }
        state
            .store()
            .signed_url(&record.payroll_pdf, disposition, state.url_ttl())
            .await
    }
    .await;

    match result {
        Ok(url) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                "Issued payslip link"
            );
            json_response(StatusCode::OK, SignedUrlResponse { url })
        }
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /payroll/user/my-payrolls.
async fn my_payrolls_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = async {
        let employee_id = headers
            .get(EMPLOYEE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(PayrollError::MissingIdentity)?;

        let records = state.repository().payrolls_for_employee(employee_id).await?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let name = state
                .repository()
                .find_employee(&record.organization_id, employee_id)
                .await?
                .map(|e| e.name)
                .unwrap_or_default();
            items.push(PayrollListItem::new(record, name));
        }
        Ok::<_, PayrollError>(items)
    }
    .await;

    match result {
        Ok(items) => json_response(StatusCode::OK, items),
        Err(err) => failure(correlation_id, err),
    }
}

/// Handler for GET /files/*key.
///
/// Serves a stored payslip after checking the link signature and expiry.
async fn file_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = async {
        let Ok(Query(query)) = query else {
            return Err(PayrollError::InvalidSignature);
        };
        let disposition: Disposition = query.disposition.parse()?;
        state.signer().verify(
            &key,
            disposition,
            query.expires,
            &query.signature,
            Utc::now(),
        )?;
        let object = state.store().download(&key).await?;
        Ok::<_, PayrollError>((disposition, object))
    }
    .await;

    match result {
        Ok((disposition, object)) => {
            let file_name = key.rsplit('/').next().unwrap_or(key.as_str());
            let content_disposition = format!("{}; filename=\"{}\"", disposition, file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, object.content_type),
                    (header::CONTENT_DISPOSITION, content_disposition),
                ],
                object.bytes,
            )
                .into_response()
        }
        Err(err) => failure(correlation_id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::storage::{MemoryObjectStore, UrlSigner};
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const PERIOD: &str = r#"{
        "range": ["2026-01-01T00:00:00Z", "2026-01-31T23:59:59Z"],
        "month": "01~2026"
    }"#;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/demo").expect("Failed to load config");
        let signer = UrlSigner::new("test-secret", "http://localhost:3000");
        AppState::new(
            Arc::new(config.repository()),
            Arc::new(MemoryObjectStore::new(signer.clone())),
            signer,
            FailurePolicy::Abort,
            Duration::from_secs(300),
        )
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_calculate_all_returns_report() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/payroll/calculate-all?orgId=org_acme", PERIOD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["generated"], 3);
        assert_eq!(report["aborted"], false);
    }

    #[tokio::test]
    async fn test_missing_org_id_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/payroll/calculate-all", PERIOD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "MISSING_ORG_ID");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(post("/payroll/calculate-all?orgId=org_acme", "{invalid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_invalid_month_in_body_returns_400() {
        let router = create_router(create_test_state());
        let body = PERIOD.replace("01~2026", "13~2026");

        let response = router
            .oneshot(post("/payroll/calculate-all?orgId=org_acme", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "INVALID_MONTH");
    }

    #[tokio::test]
    async fn test_missing_month_returns_validation_error() {
        let router = create_router(create_test_state());
        let body = r#"{"range": ["2026-01-01T00:00:00Z", "2026-01-31T23:59:59Z"]}"#;

        let response = router
            .oneshot(post("/payroll/calculate-all?orgId=org_acme", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = error_body(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let state = create_test_state();
        let router = create_router(state.clone());

        let response = router
            .oneshot(post("/payroll/preview/emp_001?orgId=org_acme", PERIOD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let preview: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let net: Decimal = preview["breakdown"]["net_salary"].as_str().unwrap().parse().unwrap();
        assert_eq!(net, Decimal::new(64000, 0));

        let month = "01~2026".parse().unwrap();
        let stored = state.repository().find_payroll("emp_001", month).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_bad_mode_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/payroll/geturl/as-hr/emp_001/01~2026/X")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "INVALID_MODE");
    }

    #[tokio::test]
    async fn test_my_payrolls_requires_identity() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/payroll/user/my-payrolls")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unsigned_file_request_returns_403() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/files/emp_001/emp_001-01~2026.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_body(response).await.code, "INVALID_SIGNATURE");
    }
}
