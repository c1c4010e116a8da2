use chrono::Utc;
use uuid::Uuid;

use crate::domain::lecture_file::{FileType, LectureFile, external_content, local_content};
use crate::domain::repository::{
    AuditRepository, CourseRepository, FileCounter, LectureFileRepository, UserRepository,
};
use crate::domain::types::{Activity, ActivityKind, Actor, AuditAction, AuditEntry};
use crate::error::PortalError;
use crate::usecase::course::course_access;

/// Where the uploaded material lives.
#[derive(Debug, Clone)]
pub enum FileSource {
    Local {
        file_name: String,
        file_size: i64,
        storage_path: String,
    },
    External {
        url: String,
    },
}

fn required_title(title: &str) -> Result<String, PortalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PortalError::Validation("title is required".into()));
    }
    Ok(title.to_owned())
}

// ── Upload ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UploadFileInput {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
    pub is_visible: bool,
    pub source: FileSource,
}

pub struct UploadFileUseCase<C, U, F, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    A: AuditRepository,
{
    pub courses: C,
    pub users: U,
    pub files: F,
    pub audit: A,
}

impl<C, U, F, A> UploadFileUseCase<C, U, F, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        input: UploadFileInput,
    ) -> Result<LectureFile, PortalError> {
        let course = self
            .courses
            .find_by_id(input.course_id)
            .await?
            .ok_or(PortalError::CourseNotFound)?;
        if !course_access(&self.courses, &self.users, actor, &course)
            .await?
            .can_manage()
        {
            return Err(PortalError::Forbidden);
        }

        let title = required_title(&input.title)?;
        let content = match input.source {
            FileSource::Local {
                file_name,
                file_size,
                storage_path,
            } => local_content(storage_path, file_name, file_size)?,
            FileSource::External { url } => external_content(url)?,
        };

        let now = Utc::now();
        let file = LectureFile {
            id: Uuid::now_v7(),
            course_id: course.id,
            uploader_id: Some(actor.user_id),
            title,
            description: input.description,
            file_type: input.file_type,
            content,
            is_visible: input.is_visible,
            download_count: 0,
            view_count: 0,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.files.create(&file).await?;
        self.audit
            .record_activity(
                &Activity::new(
                    actor.user_id,
                    ActivityKind::Upload,
                    format!("Uploaded {} to {}", file.title, course.code),
                )
                .with_file(file.id),
            )
            .await?;
        Ok(file)
    }
}

// ── Manage (uploader or admin) ────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileMetadataInput {
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
}

pub struct ManageFileUseCase<F: LectureFileRepository, A: AuditRepository> {
    pub files: F,
    pub audit: A,
}

impl<F: LectureFileRepository, A: AuditRepository> ManageFileUseCase<F, A> {
    async fn owned(&self, actor: &Actor, file_id: Uuid) -> Result<LectureFile, PortalError> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or(PortalError::FileNotFound)?;
        if !actor.is_admin() && file.uploader_id != Some(actor.user_id) {
            return Err(PortalError::Forbidden);
        }
        Ok(file)
    }

    async fn owned_live(&self, actor: &Actor, file_id: Uuid) -> Result<LectureFile, PortalError> {
        let file = self.owned(actor, file_id).await?;
        if file.is_deleted() {
            return Err(PortalError::FileNotFound);
        }
        Ok(file)
    }

    async fn persist(
        &self,
        actor: &Actor,
        file: &LectureFile,
        action: AuditAction,
        changes: serde_json::Value,
    ) -> Result<(), PortalError> {
        self.files.save(file).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor.user_id), action, "LectureFile")
                    .object(file.id, file.title.clone())
                    .changes(changes),
            )
            .await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        file_id: Uuid,
        input: FileMetadataInput,
    ) -> Result<LectureFile, PortalError> {
        let mut file = self.owned_live(actor, file_id).await?;
        file.title = required_title(&input.title)?;
        file.description = input.description;
        file.file_type = input.file_type;
        self.persist(
            actor,
            &file,
            AuditAction::Update,
            serde_json::json!({ "title": file.title, "file_type": file.file_type }),
        )
        .await?;
        Ok(file)
    }

    pub async fn set_visibility(
        &self,
        actor: &Actor,
        file_id: Uuid,
        is_visible: bool,
    ) -> Result<LectureFile, PortalError> {
        let mut file = self.owned_live(actor, file_id).await?;
        file.is_visible = is_visible;
        self.persist(
            actor,
            &file,
            AuditAction::Update,
            serde_json::json!({ "is_visible": is_visible }),
        )
        .await?;
        Ok(file)
    }

    /// Soft delete.
    pub async fn delete(&self, actor: &Actor, file_id: Uuid) -> Result<(), PortalError> {
        let mut file = self.owned_live(actor, file_id).await?;
        file.deleted_at = Some(Utc::now());
        self.persist(actor, &file, AuditAction::Delete, serde_json::json!({ "soft": true }))
            .await
    }

    pub async fn restore(&self, actor: &Actor, file_id: Uuid) -> Result<LectureFile, PortalError> {
        let mut file = self.owned(actor, file_id).await?;
        if !file.is_deleted() {
            return Ok(file);
        }
        file.deleted_at = None;
        self.persist(
            actor,
            &file,
            AuditAction::Update,
            serde_json::json!({ "restored": true }),
        )
        .await?;
        Ok(file)
    }
}

// ── Download / view ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct OpenedFile {
    pub file: LectureFile,
    /// Storage path or external link.
    pub location: String,
}

pub struct OpenFileUseCase<C, U, F, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    A: AuditRepository,
{
    pub courses: C,
    pub users: U,
    pub files: F,
    pub audit: A,
}

/// Load a live file the actor may read. Hidden files are only readable by managers.
pub async fn readable_file<C, U, F>(
    courses: &C,
    users: &U,
    files: &F,
    actor: &Actor,
    file_id: Uuid,
) -> Result<LectureFile, PortalError>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
{
    let file = files
        .find_by_id(file_id)
        .await?
        .filter(|f| !f.is_deleted())
        .ok_or(PortalError::FileNotFound)?;
    let course = courses
        .find_by_id(file.course_id)
        .await?
        .ok_or(PortalError::CourseNotFound)?;
    let access = course_access(courses, users, actor, &course).await?;
    if !file.is_visible && !access.can_manage() {
        return Err(PortalError::FileNotFound);
    }
    Ok(file)
}

impl<C, U, F, A> OpenFileUseCase<C, U, F, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        file_id: Uuid,
        counter: FileCounter,
    ) -> Result<OpenedFile, PortalError> {
        let file = readable_file(&self.courses, &self.users, &self.files, actor, file_id).await?;

        self.files.increment(file.id, counter).await?;
        let (kind, verb) = match counter {
            FileCounter::Download => (ActivityKind::Download, "Downloaded"),
            FileCounter::View => (ActivityKind::View, "Viewed"),
        };
        self.audit
            .record_activity(
                &Activity::new(actor.user_id, kind, format!("{verb} {}", file.title))
                    .with_file(file.id),
            )
            .await?;

        let location = file.content.location().to_owned();
        Ok(OpenedFile { file, location })
    }
}
