use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;

use crate::domain::lecture_file::{FileContent, FileType, LectureFile};
use crate::domain::repository::FileCounter;
use crate::error::PortalError;
use crate::handlers::{require_instructor, require_user};
use crate::state::AppState;
use crate::usecase::lecture_file::{
    FileMetadataInput, FileSource, ManageFileUseCase, OpenFileUseCase, UploadFileInput,
    UploadFileUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum ContentResponse {
    LocalFile {
        file_name: String,
        file_size: i64,
        extension: String,
        mime_type: String,
    },
    ExternalLink {
        url: String,
    },
}

impl From<FileContent> for ContentResponse {
    fn from(content: FileContent) -> Self {
        match content {
            FileContent::Local {
                file_name,
                file_size,
                extension,
                mime_type,
                ..
            } => Self::LocalFile {
                file_name,
                file_size,
                extension,
                mime_type,
            },
            FileContent::External { url } => Self::ExternalLink { url },
        }
    }
}

#[derive(Serialize)]
pub struct LectureFileResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub uploader_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
    #[serde(flatten)]
    pub content: ContentResponse,
    pub is_visible: bool,
    pub download_count: i32,
    pub view_count: i32,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms_opt")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<LectureFile> for LectureFileResponse {
    fn from(file: LectureFile) -> Self {
        Self {
            id: file.id,
            course_id: file.course_id,
            uploader_id: file.uploader_id,
            title: file.title,
            description: file.description,
            file_type: file.file_type,
            content: file.content.into(),
            is_visible: file.is_visible,
            download_count: file.download_count,
            view_count: file.view_count,
            deleted_at: file.deleted_at,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

// ── POST /courses/{id}/files ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum SourceRequest {
    LocalFile {
        file_name: String,
        file_size: i64,
        storage_path: String,
    },
    ExternalLink {
        url: String,
    },
}

impl From<SourceRequest> for FileSource {
    fn from(source: SourceRequest) -> Self {
        match source {
            SourceRequest::LocalFile {
                file_name,
                file_size,
                storage_path,
            } => Self::Local {
                file_name,
                file_size,
                storage_path,
            },
            SourceRequest::ExternalLink { url } => Self::External { url },
        }
    }
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(flatten)]
    pub source: SourceRequest,
}

fn default_true() -> bool {
    true
}

pub async fn upload_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<UploadRequest>,
) -> Result<(StatusCode, Json<LectureFileResponse>), PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = UploadFileUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    let file = usecase
        .execute(
            &actor,
            UploadFileInput {
                course_id,
                title: body.title,
                description: body.description,
                file_type: body.file_type,
                is_visible: body.is_visible,
                source: body.source.into(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(file.into())))
}

// ── PATCH /files/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateFileRequest {
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
}

pub async fn update_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    Json(body): Json<UpdateFileRequest>,
) -> Result<Json<LectureFileResponse>, PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = ManageFileUseCase {
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    let file = usecase
        .update(
            &actor,
            file_id,
            FileMetadataInput {
                title: body.title,
                description: body.description,
                file_type: body.file_type,
            },
        )
        .await?;
    Ok(Json(file.into()))
}

// ── PUT /files/{id}/visibility ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VisibilityRequest {
    pub is_visible: bool,
}

pub async fn set_visibility(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    Json(body): Json<VisibilityRequest>,
) -> Result<Json<LectureFileResponse>, PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = ManageFileUseCase {
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    let file = usecase
        .set_visibility(&actor, file_id, body.is_visible)
        .await?;
    Ok(Json(file.into()))
}

// ── DELETE /files/{id} ───────────────────────────────────────────────────────

pub async fn delete_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = ManageFileUseCase {
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    usecase.delete(&actor, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /files/{id}/restore ─────────────────────────────────────────────────

pub async fn restore_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<LectureFileResponse>, PortalError> {
    let actor = require_instructor(&identity)?;
    let usecase = ManageFileUseCase {
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    let file = usecase.restore(&actor, file_id).await?;
    Ok(Json(file.into()))
}

// ── GET /files/{id}/download, /view ──────────────────────────────────────────

#[derive(Serialize)]
pub struct OpenFileResponse {
    pub location: String,
    #[serde(flatten)]
    pub file: LectureFileResponse,
}

async fn open_file(
    identity: IdentityHeaders,
    state: AppState,
    file_id: Uuid,
    counter: FileCounter,
) -> Result<Json<OpenFileResponse>, PortalError> {
    let actor = require_user(&identity);
    let usecase = OpenFileUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        files: state.lecture_file_repo(),
        audit: state.audit_repo(),
    };
    let opened = usecase.execute(&actor, file_id, counter).await?;
    Ok(Json(OpenFileResponse {
        location: opened.location,
        file: opened.file.into(),
    }))
}

pub async fn download_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<OpenFileResponse>, PortalError> {
    open_file(identity, state, file_id, FileCounter::Download).await
}

pub async fn view_file(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<OpenFileResponse>, PortalError> {
    open_file(identity, state, file_id, FileCounter::View).await
}
