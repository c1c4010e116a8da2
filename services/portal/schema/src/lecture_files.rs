use sea_orm::entity::prelude::*;

/// Course material: an uploaded file (`storage_path`) or an external link.
/// `deleted_at` set = soft-deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lecture_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub uploader_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub content_type: String,
    pub storage_path: Option<String>,
    pub external_link: Option<String>,
    pub file_name: Option<String>,
    pub file_size: i64,
    pub file_extension: Option<String>,
    pub mime_type: Option<String>,
    pub is_visible: bool,
    pub download_count: i32,
    pub view_count: i32,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploaderId",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Uploader,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
