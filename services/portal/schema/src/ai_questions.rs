use sea_orm::entity::prelude::*;

/// Generated question set. `questions` is a JSON array of question objects.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub question_type: String,
    pub questions: Json,
    pub model_used: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lecture_files::Entity",
        from = "Column::FileId",
        to = "super::lecture_files::Column::Id",
        on_delete = "Cascade"
    )]
    File,
}

impl Related<super::lecture_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
