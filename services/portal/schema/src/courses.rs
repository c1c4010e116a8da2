use sea_orm::entity::prelude::*;

/// Course offering, placed in one level and one semester.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_name: String,
    #[sea_orm(unique)]
    pub course_code: String,
    pub description: Option<String>,
    pub level_id: Uuid,
    pub semester_id: Uuid,
    pub credit_hours: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::levels::Entity",
        from = "Column::LevelId",
        to = "super::levels::Column::Id",
        on_delete = "Restrict"
    )]
    Level,
    #[sea_orm(
        belongs_to = "super::semesters::Entity",
        from = "Column::SemesterId",
        to = "super::semesters::Column::Id",
        on_delete = "Restrict"
    )]
    Semester,
    #[sea_orm(has_many = "super::course_majors::Entity")]
    CourseMajors,
    #[sea_orm(has_many = "super::instructor_courses::Entity")]
    InstructorCourses,
    #[sea_orm(has_many = "super::lecture_files::Entity")]
    LectureFiles,
}

impl Related<super::levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Level.def()
    }
}

impl Related<super::semesters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::course_majors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseMajors.def()
    }
}

impl Related<super::instructor_courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstructorCourses.def()
    }
}

impl Related<super::lecture_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LectureFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
