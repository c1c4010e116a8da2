use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use sacm_portal_schema::lecture_files;

use crate::domain::lecture_file::{CONTENT_EXTERNAL_LINK, FileContent, FileType, LectureFile};
use crate::domain::repository::{FileCounter, LectureFileRepository};
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbLectureFileRepository {
    pub db: DatabaseConnection,
}

impl LectureFileRepository for DbLectureFileRepository {
    async fn create(&self, file: &LectureFile) -> Result<(), PortalError> {
        let mut am = lecture_files::ActiveModel {
            id: Set(file.id),
            course_id: Set(file.course_id),
            uploader_id: Set(file.uploader_id),
            title: Set(file.title.clone()),
            description: Set(file.description.clone()),
            file_type: Set(file.file_type.as_str().to_owned()),
            content_type: Set(file.content.content_type().to_owned()),
            storage_path: Set(None),
            external_link: Set(None),
            file_name: Set(None),
            file_size: Set(0),
            file_extension: Set(None),
            mime_type: Set(None),
            is_visible: Set(file.is_visible),
            download_count: Set(file.download_count),
            view_count: Set(file.view_count),
            deleted_at: Set(file.deleted_at),
            created_at: Set(file.created_at),
            updated_at: Set(file.updated_at),
        };
        match &file.content {
            FileContent::Local {
                storage_path,
                file_name,
                file_size,
                extension,
                mime_type,
            } => {
                am.storage_path = Set(Some(storage_path.clone()));
                am.file_name = Set(Some(file_name.clone()));
                am.file_size = Set(*file_size);
                am.file_extension = Set(Some(extension.clone()));
                am.mime_type = Set(Some(mime_type.clone()));
            }
            FileContent::External { url } => {
                am.external_link = Set(Some(url.clone()));
            }
        }
        am.insert(&self.db).await.context("create lecture file")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LectureFile>, PortalError> {
        let model = lecture_files::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find lecture file by id")?;
        Ok(model.map(lecture_file_from_model))
    }

    async fn list_for_course(
        &self,
        course_id: Uuid,
        include_hidden: bool,
        file_type: Option<FileType>,
    ) -> Result<Vec<LectureFile>, PortalError> {
        let mut query = lecture_files::Entity::find()
            .filter(lecture_files::Column::CourseId.eq(course_id))
            .filter(lecture_files::Column::DeletedAt.is_null());
        if !include_hidden {
            query = query.filter(lecture_files::Column::IsVisible.eq(true));
        }
        if let Some(file_type) = file_type {
            query = query.filter(lecture_files::Column::FileType.eq(file_type.as_str()));
        }
        let models = query
            .order_by_desc(lecture_files::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list lecture files")?;
        Ok(models.into_iter().map(lecture_file_from_model).collect())
    }

    async fn save(&self, file: &LectureFile) -> Result<(), PortalError> {
        lecture_files::ActiveModel {
            id: Set(file.id),
            title: Set(file.title.clone()),
            description: Set(file.description.clone()),
            file_type: Set(file.file_type.as_str().to_owned()),
            is_visible: Set(file.is_visible),
            deleted_at: Set(file.deleted_at),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("save lecture file")?;
        Ok(())
    }

    async fn increment(&self, id: Uuid, counter: FileCounter) -> Result<(), PortalError> {
        let column = match counter {
            FileCounter::Download => lecture_files::Column::DownloadCount,
            FileCounter::View => lecture_files::Column::ViewCount,
        };
        lecture_files::Entity::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .filter(lecture_files::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("increment lecture file counter")?;
        Ok(())
    }
}

fn lecture_file_from_model(model: lecture_files::Model) -> LectureFile {
    let content = if model.content_type == CONTENT_EXTERNAL_LINK {
        FileContent::External {
            url: model.external_link.unwrap_or_default(),
        }
    } else {
        FileContent::Local {
            storage_path: model.storage_path.unwrap_or_default(),
            file_name: model.file_name.unwrap_or_default(),
            file_size: model.file_size,
            extension: model.file_extension.unwrap_or_default(),
            mime_type: model.mime_type.unwrap_or_default(),
        }
    };
    LectureFile {
        id: model.id,
        course_id: model.course_id,
        uploader_id: model.uploader_id,
        title: model.title,
        description: model.description,
        file_type: FileType::from_str_opt(&model.file_type).unwrap_or(FileType::Other),
        content,
        is_visible: model.is_visible,
        download_count: model.download_count,
        view_count: model.view_count,
        deleted_at: model.deleted_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
