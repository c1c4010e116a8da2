use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;

use crate::domain::academic::{Level, Major, Semester};
use crate::error::PortalError;
use crate::handlers::require_admin;
use crate::state::AppState;
use crate::usecase::academic::{
    CreateLevelUseCase, ListLevelsUseCase, ListMajorsUseCase, ListSemestersUseCase, MajorInput,
    SaveMajorUseCase, SaveSemesterUseCase, SemesterInput,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MajorResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Major> for MajorResponse {
    fn from(major: Major) -> Self {
        Self {
            id: major.id,
            name: major.name,
            description: major.description,
            is_active: major.is_active,
            created_at: major.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct LevelResponse {
    pub id: Uuid,
    pub name: String,
    pub number: i32,
}

impl From<Level> for LevelResponse {
    fn from(level: Level) -> Self {
        Self {
            id: level.id,
            name: level.name,
            number: level.number,
        }
    }
}

#[derive(Serialize)]
pub struct SemesterResponse {
    pub id: Uuid,
    pub name: String,
    pub academic_year: String,
    pub number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

impl From<Semester> for SemesterResponse {
    fn from(semester: Semester) -> Self {
        Self {
            id: semester.id,
            name: semester.name,
            academic_year: semester.academic_year,
            number: semester.number,
            start_date: semester.start_date,
            end_date: semester.end_date,
            is_current: semester.is_current,
        }
    }
}

// ── Majors ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct MajorListQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list_majors(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<MajorListQuery>,
) -> Result<Json<Vec<MajorResponse>>, PortalError> {
    let usecase = ListMajorsUseCase {
        majors: state.major_repo(),
    };
    let majors = usecase.execute(query.active_only).await?;
    Ok(Json(majors.into_iter().map(MajorResponse::from).collect()))
}

#[derive(Deserialize)]
pub struct MajorRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl From<MajorRequest> for MajorInput {
    fn from(body: MajorRequest) -> Self {
        Self {
            name: body.name,
            description: body.description,
            is_active: body.is_active,
        }
    }
}

pub async fn create_major(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<MajorRequest>,
) -> Result<(StatusCode, Json<MajorResponse>), PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveMajorUseCase {
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let major = usecase.create(actor.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(major.into())))
}

pub async fn update_major(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MajorRequest>,
) -> Result<Json<MajorResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveMajorUseCase {
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let major = usecase.update(actor.user_id, id, body.into()).await?;
    Ok(Json(major.into()))
}

// ── Levels ───────────────────────────────────────────────────────────────────

pub async fn list_levels(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<LevelResponse>>, PortalError> {
    let usecase = ListLevelsUseCase {
        levels: state.level_repo(),
    };
    let levels = usecase.execute().await?;
    Ok(Json(levels.into_iter().map(LevelResponse::from).collect()))
}

#[derive(Deserialize)]
pub struct LevelRequest {
    pub name: String,
    pub number: i32,
}

pub async fn create_level(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<LevelRequest>,
) -> Result<(StatusCode, Json<LevelResponse>), PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = CreateLevelUseCase {
        levels: state.level_repo(),
        audit: state.audit_repo(),
    };
    let level = usecase
        .execute(actor.user_id, &body.name, body.number)
        .await?;
    Ok((StatusCode::CREATED, Json(level.into())))
}

// ── Semesters ────────────────────────────────────────────────────────────────

pub async fn list_semesters(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<SemesterResponse>>, PortalError> {
    require_admin(&identity)?;
    let usecase = ListSemestersUseCase {
        semesters: state.semester_repo(),
    };
    let semesters = usecase.execute().await?;
    Ok(Json(
        semesters.into_iter().map(SemesterResponse::from).collect(),
    ))
}

pub async fn get_current_semester(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<SemesterResponse>, PortalError> {
    let usecase = ListSemestersUseCase {
        semesters: state.semester_repo(),
    };
    Ok(Json(usecase.current().await?.into()))
}

#[derive(Deserialize)]
pub struct SemesterRequest {
    pub name: String,
    pub academic_year: String,
    pub number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_current: bool,
}

impl From<SemesterRequest> for SemesterInput {
    fn from(body: SemesterRequest) -> Self {
        Self {
            name: body.name,
            academic_year: body.academic_year,
            number: body.number,
            start_date: body.start_date,
            end_date: body.end_date,
            is_current: body.is_current,
        }
    }
}

pub async fn create_semester(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<SemesterRequest>,
) -> Result<(StatusCode, Json<SemesterResponse>), PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveSemesterUseCase {
        semesters: state.semester_repo(),
        audit: state.audit_repo(),
    };
    let semester = usecase.create(actor.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(semester.into())))
}

pub async fn update_semester(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SemesterRequest>,
) -> Result<Json<SemesterResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveSemesterUseCase {
        semesters: state.semester_repo(),
        audit: state.audit_repo(),
    };
    let semester = usecase.update(actor.user_id, id, body.into()).await?;
    Ok(Json(semester.into()))
}

pub async fn set_current_semester(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SemesterResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveSemesterUseCase {
        semesters: state.semester_repo(),
        audit: state.audit_repo(),
    };
    let semester = usecase.set_current(actor.user_id, id).await?;
    Ok(Json(semester.into()))
}
