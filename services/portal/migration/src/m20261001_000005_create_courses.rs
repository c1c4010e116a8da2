use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::CourseName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Courses::CourseCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::Description).text())
                    .col(ColumnDef::new(Courses::LevelId).uuid().not_null())
                    .col(ColumnDef::new(Courses::SemesterId).uuid().not_null())
                    .col(
                        ColumnDef::new(Courses::CreditHours)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(Courses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::LevelId)
                            .to(Levels::Table, Levels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::SemesterId)
                            .to(Semesters::Table, Semesters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Courses::Table)
                    .col(Courses::LevelId)
                    .col(Courses::SemesterId)
                    .name("idx_courses_level_id_semester_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CourseMajors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CourseMajors::CourseId).uuid().not_null())
                    .col(ColumnDef::new(CourseMajors::MajorId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(CourseMajors::CourseId)
                            .col(CourseMajors::MajorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseMajors::Table, CourseMajors::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseMajors::Table, CourseMajors::MajorId)
                            .to(Majors::Table, Majors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(CourseMajors::Table)
                    .col(CourseMajors::MajorId)
                    .name("idx_course_majors_major_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InstructorCourses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InstructorCourses::InstructorId).uuid().not_null())
                    .col(ColumnDef::new(InstructorCourses::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(InstructorCourses::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InstructorCourses::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(InstructorCourses::InstructorId)
                            .col(InstructorCourses::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InstructorCourses::Table, InstructorCourses::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InstructorCourses::Table, InstructorCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(InstructorCourses::Table)
                    .col(InstructorCourses::CourseId)
                    .name("idx_instructor_courses_course_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstructorCourses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseMajors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    CourseName,
    CourseCode,
    Description,
    LevelId,
    SemesterId,
    CreditHours,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CourseMajors {
    Table,
    CourseId,
    MajorId,
}

#[derive(Iden)]
enum InstructorCourses {
    Table,
    InstructorId,
    CourseId,
    IsPrimary,
    AssignedAt,
}

#[derive(Iden)]
enum Levels {
    Table,
    Id,
}

#[derive(Iden)]
enum Semesters {
    Table,
    Id,
}

#[derive(Iden)]
enum Majors {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
