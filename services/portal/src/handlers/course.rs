use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;
use sacm_domain::pagination::PageRequest;

use crate::domain::academic::{Course, CourseFilter, CourseInstructor};
use crate::domain::lecture_file::FileType;
use crate::error::PortalError;
use crate::handlers::lecture_file::LectureFileResponse;
use crate::handlers::{PageResponse, require_admin, require_instructor, require_student, require_user};
use crate::state::AppState;
use crate::usecase::course::{
    AssignInstructorUseCase, CourseDetailUseCase, CourseInput, InstructorCoursesUseCase,
    ListCoursesUseCase, SaveCourseUseCase, StudentCoursesUseCase,
};

#[derive(Serialize)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub level_id: Uuid,
    pub semester_id: Uuid,
    pub credit_hours: i32,
    pub is_active: bool,
    pub major_ids: Vec<Uuid>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            code: course.code,
            description: course.description,
            level_id: course.level_id,
            semester_id: course.semester_id,
            credit_hours: course.credit_hours,
            is_active: course.is_active,
            major_ids: course.major_ids,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

// ── GET /admin/courses ───────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CourseListQuery {
    pub level_id: Option<Uuid>,
    pub semester_id: Option<Uuid>,
    pub major_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_courses(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<PageResponse<CourseResponse>>, PortalError> {
    require_admin(&identity)?;
    let filter = CourseFilter {
        level_id: query.level_id,
        semester_id: query.semester_id,
        major_id: query.major_id,
        is_active: query.is_active,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let page = usecase
        .execute(filter, PageRequest::new(query.per_page, query.page))
        .await?;
    Ok(Json(PageResponse::from_page(page, CourseResponse::from)))
}

// ── POST /admin/courses, PUT /admin/courses/{id} ─────────────────────────────

#[derive(Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub level_id: Uuid,
    pub semester_id: Uuid,
    pub credit_hours: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub major_ids: Vec<Uuid>,
}

fn default_true() -> bool {
    true
}

impl From<CourseRequest> for CourseInput {
    fn from(body: CourseRequest) -> Self {
        Self {
            name: body.name,
            code: body.code,
            description: body.description,
            level_id: body.level_id,
            semester_id: body.semester_id,
            credit_hours: body.credit_hours,
            is_active: body.is_active,
            major_ids: body.major_ids,
        }
    }
}

pub async fn create_course(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveCourseUseCase {
        courses: state.course_repo(),
        levels: state.level_repo(),
        semesters: state.semester_repo(),
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let course = usecase.create(actor.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

pub async fn update_course(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = SaveCourseUseCase {
        courses: state.course_repo(),
        levels: state.level_repo(),
        semesters: state.semester_repo(),
        majors: state.major_repo(),
        audit: state.audit_repo(),
    };
    let course = usecase.update(actor.user_id, id, body.into()).await?;
    Ok(Json(course.into()))
}

// ── POST /admin/courses/{id}/instructors ─────────────────────────────────────

#[derive(Deserialize)]
pub struct AssignInstructorRequest {
    pub instructor_id: Uuid,
    #[serde(default)]
    pub is_primary: bool,
}

pub async fn assign_instructor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<AssignInstructorRequest>,
) -> Result<StatusCode, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = AssignInstructorUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        audit: state.audit_repo(),
    };
    usecase
        .assign(actor.user_id, course_id, body.instructor_id, body.is_primary)
        .await?;
    Ok(StatusCode::CREATED)
}

// ── DELETE /admin/courses/{id}/instructors/{instructor_id} ───────────────────

pub async fn unassign_instructor(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((course_id, instructor_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, PortalError> {
    let actor = require_admin(&identity)?;
    let usecase = AssignInstructorUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        audit: state.audit_repo(),
    };
    usecase
        .unassign(actor.user_id, course_id, instructor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /student/courses ─────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct StudentCoursesQuery {
    #[serde(default)]
    pub archived: bool,
}

pub async fn list_student_courses(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<StudentCoursesQuery>,
) -> Result<Json<Vec<CourseResponse>>, PortalError> {
    let actor = require_student(&identity)?;
    let usecase = StudentCoursesUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        levels: state.level_repo(),
        semesters: state.semester_repo(),
    };
    let courses = usecase.execute(actor.user_id, query.archived).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

// ── GET /instructor/courses ──────────────────────────────────────────────────

pub async fn list_instructor_courses(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = InstructorCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.execute(actor.user_id).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

// ── GET /courses/{id} ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InstructorResponse {
    pub instructor_id: Uuid,
    pub full_name: String,
    pub is_primary: bool,
}

impl From<CourseInstructor> for InstructorResponse {
    fn from(instructor: CourseInstructor) -> Self {
        Self {
            instructor_id: instructor.instructor_id,
            full_name: instructor.full_name,
            is_primary: instructor.is_primary,
        }
    }
}

#[derive(Serialize)]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    pub can_manage: bool,
    pub instructors: Vec<InstructorResponse>,
    pub files: BTreeMap<FileType, Vec<LectureFileResponse>>,
}

pub async fn get_course(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetailResponse>, PortalError> {
    let actor = require_user(&identity);
    let usecase = CourseDetailUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        files: state.lecture_file_repo(),
    };
    let detail = usecase.execute(&actor, course_id).await?;
    Ok(Json(CourseDetailResponse {
        course: detail.course.into(),
        can_manage: detail.access.can_manage(),
        instructors: detail
            .instructors
            .into_iter()
            .map(InstructorResponse::from)
            .collect(),
        files: detail
            .files
            .into_iter()
            .map(|(file_type, files)| {
                (
                    file_type,
                    files.into_iter().map(LectureFileResponse::from).collect(),
                )
            })
            .collect(),
    }))
}
