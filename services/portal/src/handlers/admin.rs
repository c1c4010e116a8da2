use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;
use sacm_domain::pagination::PageRequest;
use sacm_domain::user::{AccountStatus, UserRole};

use crate::domain::types::{UserFilter, UserStats};
use crate::error::PortalError;
use crate::handlers::academic::SemesterResponse;
use crate::handlers::{ActivityResponse, PageResponse, UserResponse, require_admin};
use crate::state::AppState;
use crate::usecase::user_admin::{
    AdminDashboardUseCase, ChangeStatusUseCase, CreateUserInput, CreateUserUseCase,
    ListUsersUseCase, StatusChange,
};
use crate::usecase::user_import::ImportUsersUseCase;

// ── GET /admin/users ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
    pub status: Option<AccountStatus>,
    pub search: Option<String>,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_users(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<PageResponse<UserResponse>>, PortalError> {
    require_admin(&identity)?;
    let filter = UserFilter {
        role: query.role,
        major_id: query.major_id,
        level_id: query.level_id,
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let page = usecase
        .execute(filter, PageRequest::new(query.per_page, query.page))
        .await?;
    Ok(Json(PageResponse::from_page(page, UserResponse::from)))
}

// ── POST /admin/users ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub academic_id: String,
    pub id_card_number: String,
    pub full_name: String,
    pub role: UserRole,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
}

pub async fn create_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = CreateUserUseCase {
        users: state.user_repo(),
        majors: state.major_repo(),
        levels: state.level_repo(),
        audit: state.audit_repo(),
    };
    let user = usecase
        .execute(
            actor.user_id,
            CreateUserInput {
                academic_id: body.academic_id,
                id_card_number: body.id_card_number,
                full_name: body.full_name,
                role: body.role,
                major_id: body.major_id,
                level_id: body.level_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── POST /admin/users/{id}/suspend, /reactivate ──────────────────────────────

async fn change_status(
    identity: IdentityHeaders,
    state: AppState,
    user_id: Uuid,
    change: StatusChange,
) -> Result<Json<UserResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = ChangeStatusUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
    };
    let user = usecase.execute(actor.user_id, user_id, change).await?;
    Ok(Json(user.into()))
}

pub async fn suspend_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, PortalError> {
    change_status(identity, state, user_id, StatusChange::Suspend).await
}

pub async fn reactivate_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, PortalError> {
    change_status(identity, state, user_id, StatusChange::Reactivate).await
}

// ── POST /admin/users/import ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ImportResponse {
    pub created: u64,
    pub errors: Vec<String>,
}

pub async fn import_users(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = ImportUsersUseCase {
        users: state.user_repo(),
        majors: state.major_repo(),
        levels: state.level_repo(),
        audit: state.audit_repo(),
    };
    let report = usecase.execute(actor.user_id, &body).await?;
    Ok(Json(ImportResponse {
        created: report.created,
        errors: report.errors,
    }))
}

// ── GET /admin/dashboard ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub stats: UserStats,
    pub active_majors: u64,
    pub current_semester: Option<SemesterResponse>,
    pub recent_activities: Vec<ActivityResponse>,
}

pub async fn get_dashboard(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, PortalError> {
    require_admin(&identity)?;
    let usecase = AdminDashboardUseCase {
        users: state.user_repo(),
        majors: state.major_repo(),
        semesters: state.semester_repo(),
        audit: state.audit_repo(),
    };
    let dashboard = usecase.execute().await?;
    Ok(Json(DashboardResponse {
        stats: dashboard.stats,
        active_majors: dashboard.active_majors,
        current_semester: dashboard.current_semester.map(SemesterResponse::from),
        recent_activities: dashboard
            .recent_activities
            .into_iter()
            .map(ActivityResponse::from)
            .collect(),
    }))
}
