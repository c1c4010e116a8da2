use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;
use sacm_domain::pagination::PageRequest;

use crate::domain::types::{AuditAction, AuditEntry};
use crate::error::PortalError;
use crate::handlers::{PageResponse, require_admin};
use crate::state::AppState;
use crate::usecase::audit::ListAuditLogUseCase;

#[derive(Serialize)]
pub struct AuditEntryResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub model_name: String,
    pub object_id: Option<String>,
    pub object_repr: Option<String>,
    pub changes: Option<serde_json::Value>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            model_name: entry.model_name,
            object_id: entry.object_id,
            object_repr: entry.object_repr,
            changes: entry.changes,
            created_at: entry.created_at,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct AuditLogQuery {
    pub action: Option<AuditAction>,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /admin/audit-logs ────────────────────────────────────────────────────

pub async fn list_audit_logs(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<PageResponse<AuditEntryResponse>>, PortalError> {
    require_admin(&identity)?;
    let usecase = ListAuditLogUseCase {
        audit: state.audit_repo(),
    };
    let page = usecase
        .execute(query.action, PageRequest::new(query.per_page, query.page))
        .await?;
    Ok(Json(PageResponse::from_page(page, AuditEntryResponse::from)))
}
