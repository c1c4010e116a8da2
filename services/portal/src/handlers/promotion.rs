use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;

use crate::error::PortalError;
use crate::handlers::require_admin;
use crate::state::AppState;
use crate::usecase::promotion::{PromoteStudentsUseCase, PromotionResult, PromotionStatsUseCase};

#[derive(Serialize)]
pub struct PromotionResponse {
    pub from_level: String,
    pub to_level: String,
    pub promoted: u64,
}

impl From<PromotionResult> for PromotionResponse {
    fn from(result: PromotionResult) -> Self {
        Self {
            from_level: result.from_level.name,
            to_level: result.to_level.name,
            promoted: result.promoted,
        }
    }
}

// ── POST /admin/promotions ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PromoteRequest {
    pub from_level_id: Uuid,
    pub to_level_id: Uuid,
    pub major_id: Option<Uuid>,
}

pub async fn promote(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<PromoteRequest>,
) -> Result<Json<PromotionResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = PromoteStudentsUseCase {
        users: state.user_repo(),
        levels: state.level_repo(),
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let result = usecase
        .execute(
            actor.user_id,
            body.from_level_id,
            body.to_level_id,
            body.major_id,
        )
        .await?;
    Ok(Json(result.into()))
}

// ── POST /admin/promotions/next ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PromoteNextRequest {
    pub from_level_id: Uuid,
    pub major_id: Option<Uuid>,
}

pub async fn promote_next(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<PromoteNextRequest>,
) -> Result<Json<PromotionResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = PromoteStudentsUseCase {
        users: state.user_repo(),
        levels: state.level_repo(),
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let result = usecase
        .next(actor.user_id, body.from_level_id, body.major_id)
        .await?;
    Ok(Json(result.into()))
}

// ── GET /admin/promotions/stats ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct LevelStatsResponse {
    pub level_id: Uuid,
    pub number: i32,
    pub name: String,
    pub active_students: u64,
    pub next_level: Option<String>,
}

pub async fn promotion_stats(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<LevelStatsResponse>>, PortalError> {
    require_admin(&identity)?;
    let usecase = PromotionStatsUseCase {
        users: state.user_repo(),
        levels: state.level_repo(),
    };
    let stats = usecase.execute().await?;
    Ok(Json(
        stats
            .into_iter()
            .map(|s| LevelStatsResponse {
                level_id: s.level.id,
                number: s.level.number,
                name: s.level.name,
                active_students: s.active_students,
                next_level: s.next_level,
            })
            .collect(),
    ))
}
