use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Majors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Majors::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Majors::MajorName)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Majors::Description).text())
                    .col(
                        ColumnDef::new(Majors::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Majors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Levels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Levels::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Levels::LevelName)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Levels::LevelNumber)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Semesters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Semesters::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Semesters::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Semesters::AcademicYear).string_len(20).not_null())
                    .col(ColumnDef::new(Semesters::SemesterNumber).integer().not_null())
                    .col(ColumnDef::new(Semesters::StartDate).date().not_null())
                    .col(ColumnDef::new(Semesters::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Semesters::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Semesters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one current semester.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_semesters_single_current \
                 ON semesters (is_current) WHERE is_current",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Semesters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Levels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Majors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Majors {
    Table,
    Id,
    MajorName,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Levels {
    Table,
    Id,
    LevelName,
    LevelNumber,
}

#[derive(Iden)]
enum Semesters {
    Table,
    Id,
    Name,
    AcademicYear,
    SemesterNumber,
    StartDate,
    EndDate,
    IsCurrent,
    CreatedAt,
}
