use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;
use sacm_domain::pagination::PageRequest;

use crate::domain::types::InboxItem;
use crate::error::PortalError;
use crate::handlers::PageResponse;
use crate::state::AppState;
use crate::usecase::notification::InboxUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub sender_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub notification_type: String,
    pub course_id: Option<Uuid>,
    pub file_id: Option<Uuid>,
    pub is_read: bool,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms_opt")]
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InboxItem> for NotificationResponse {
    fn from(item: InboxItem) -> Self {
        Self {
            id: item.notification_id,
            sender_id: item.sender_id,
            title: item.title,
            body: item.body,
            notification_type: item.notification_type,
            course_id: item.course_id,
            file_id: item.file_id,
            is_read: item.is_read,
            read_at: item.read_at,
            created_at: item.created_at,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /users/@me/notifications ─────────────────────────────────────────────

pub async fn list_notifications(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<PageResponse<NotificationResponse>>, PortalError> {
    let usecase = InboxUseCase {
        notifications: state.notification_repo(),
    };
    let page = usecase
        .list(
            identity.user_id,
            query.unread_only,
            PageRequest::new(query.per_page, query.page),
        )
        .await?;
    Ok(Json(PageResponse::from_page(
        page,
        NotificationResponse::from,
    )))
}

// ── GET /users/@me/notifications/unread-count ────────────────────────────────

#[derive(Serialize)]
pub struct CountResponse {
    pub count: u64,
}

pub async fn unread_count(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, PortalError> {
    let usecase = InboxUseCase {
        notifications: state.notification_repo(),
    };
    let count = usecase.unread_count(identity.user_id).await?;
    Ok(Json(CountResponse { count }))
}

// ── POST /users/@me/notifications/{id}/read ──────────────────────────────────

pub async fn mark_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let usecase = InboxUseCase {
        notifications: state.notification_repo(),
    };
    usecase.mark_read(identity.user_id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /users/@me/notifications/read ───────────────────────────────────────

pub async fn mark_all_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, PortalError> {
    let usecase = InboxUseCase {
        notifications: state.notification_repo(),
    };
    let count = usecase.mark_all_read(identity.user_id).await?;
    Ok(Json(CountResponse { count }))
}

// ── DELETE /users/@me/notifications/{id} ─────────────────────────────────────

pub async fn delete_notification(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let usecase = InboxUseCase {
        notifications: state.notification_repo(),
    };
    usecase.delete(identity.user_id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
