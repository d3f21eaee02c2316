//! Audit viewer endpoint.

use crate::{
    core::{access, audit},
    entities::AuditLogModel,
    errors::Result,
    http::{AppState, extract::AuthUser},
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

/// Query parameters for the audit viewer.
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    /// Only entries with this action tag
    pub action_type: Option<String>,
    /// Only entries by this user
    pub user_id: Option<i64>,
    /// Only entries scoped to this fund
    pub fund_id: Option<i64>,
    /// Page size
    pub limit: Option<u64>,
    /// Rows to skip
    pub offset: Option<u64>,
}

/// One page of audit entries plus the total matching count.
#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    /// The page of entries, newest first
    pub logs: Vec<AuditLogModel>,
    /// Total entries matching the filter
    pub total: u64,
}

/// `GET /api/audit-logs` - filtered, paginated audit entries. Admin only.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<AuditLogPage>> {
    access::require_admin(&caller)?;

    let filter = audit::AuditLogFilter {
        action_type: query.action_type,
        user_id: query.user_id,
        fund_id: query.fund_id,
        limit: query.limit,
        offset: query.offset,
    };
    let (logs, total) = audit::query_logs(&state.db, &filter).await?;

    Ok(Json(AuditLogPage { logs, total }))
}
