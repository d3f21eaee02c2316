//! Audit sink - records state-changing actions.
//!
//! Every mutating operation logs one row through [`log_action`]. The query
//! side backs the admin audit viewer with action/user/fund filters and
//! limit/offset pagination, newest entries first.

use crate::{
    entities::{AuditLog, audit_log},
    errors::Result,
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// Request metadata attached to audit entries.
#[derive(Clone, Debug, Default)]
pub struct ClientInfo {
    /// Client IP as reported by proxy headers or the socket
    pub ip_address: Option<String>,
    /// Client User-Agent header
    pub user_agent: Option<String>,
}

/// Records one audit entry.
///
/// `details` is serialized to JSON; values that fail to serialize are stored
/// as their `Debug` form rather than failing the action being audited.
pub async fn log_action(
    db: &DatabaseConnection,
    user_id: Option<i64>,
    action_type: &str,
    action_description: impl Into<String>,
    fund_id: Option<i64>,
    details: Option<serde_json::Value>,
    client: &ClientInfo,
) -> Result<audit_log::Model> {
    let details = details.map(|value| {
        serde_json::to_string(&value).unwrap_or_else(|_| format!("{value:?}"))
    });

    audit_log::ActiveModel {
        user_id: Set(user_id),
        action_type: Set(action_type.to_string()),
        action_description: Set(action_description.into()),
        ip_address: Set(client.ip_address.clone()),
        user_agent: Set(client.user_agent.clone()),
        details: Set(details),
        fund_id: Set(fund_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Filter and page parameters for the audit viewer.
#[derive(Clone, Debug, Default)]
pub struct AuditLogFilter {
    /// Only entries with this action tag
    pub action_type: Option<String>,
    /// Only entries by this user
    pub user_id: Option<i64>,
    /// Only entries scoped to this fund
    pub fund_id: Option<i64>,
    /// Page size; defaults to 50, capped at 200
    pub limit: Option<u64>,
    /// Rows to skip
    pub offset: Option<u64>,
}

/// Default page size for the audit viewer.
const DEFAULT_PAGE_SIZE: u64 = 50;
/// Upper bound on requested page sizes.
const MAX_PAGE_SIZE: u64 = 200;

/// Returns one page of audit entries plus the total matching count.
pub async fn query_logs(
    db: &DatabaseConnection,
    filter: &AuditLogFilter,
) -> Result<(Vec<audit_log::Model>, u64)> {
    let mut query = AuditLog::find();

    if let Some(ref action_type) = filter.action_type {
        query = query.filter(audit_log::Column::ActionType.eq(action_type));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(audit_log::Column::UserId.eq(user_id));
    }
    if let Some(fund_id) = filter.fund_id {
        query = query.filter(audit_log::Column::FundId.eq(fund_id));
    }

    let total = query.clone().count(db).await?;

    let limit = filter
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0);

    let logs = query
        .order_by_desc(audit_log::Column::CreatedAt)
        .order_by_desc(audit_log::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((logs, total))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_log_and_query() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;

        let client = ClientInfo {
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("tests".to_string()),
        };

        log_action(
            &db,
            Some(admin.id),
            "FUND_CREATED",
            "Created fund Family",
            Some(1),
            Some(serde_json::json!({ "name": "Family" })),
            &client,
        )
        .await?;
        log_action(&db, None, "LOGIN_FAILED", "Bad password for alice", None, None, &client)
            .await?;

        let (all, total) = query_logs(&db, &AuditLogFilter::default()).await?;
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].action_type, "LOGIN_FAILED");
        assert_eq!(all[0].user_id, None);
        assert_eq!(all[1].ip_address.as_deref(), Some("10.0.0.1"));
        assert!(all[1].details.as_deref().unwrap().contains("Family"));

        Ok(())
    }

    #[tokio::test]
    async fn test_query_filters_and_paging() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let client = ClientInfo::default();

        for i in 0..5 {
            log_action(
                &db,
                Some(admin.id),
                "PAYMENT_VERIFIED",
                format!("Verified payment {i}"),
                Some(7),
                None,
                &client,
            )
            .await?;
        }
        log_action(&db, Some(admin.id), "LOGOUT", "Logged out", None, None, &client).await?;

        let filter = AuditLogFilter {
            action_type: Some("PAYMENT_VERIFIED".to_string()),
            fund_id: Some(7),
            limit: Some(2),
            offset: Some(2),
            ..AuditLogFilter::default()
        };
        let (page, total) = query_logs(&db, &filter).await?;
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let by_user = AuditLogFilter {
            user_id: Some(admin.id),
            ..AuditLogFilter::default()
        };
        let (_, total) = query_logs(&db, &by_user).await?;
        assert_eq!(total, 6);

        let nobody = AuditLogFilter {
            user_id: Some(9999),
            ..AuditLogFilter::default()
        };
        let (page, total) = query_logs(&db, &nobody).await?;
        assert_eq!(total, 0);
        assert!(page.is_empty());

        Ok(())
    }
}
