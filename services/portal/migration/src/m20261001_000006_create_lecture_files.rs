use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LectureFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LectureFiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LectureFiles::CourseId).uuid().not_null())
                    .col(ColumnDef::new(LectureFiles::UploaderId).uuid())
                    .col(ColumnDef::new(LectureFiles::Title).string_len(200).not_null())
                    .col(ColumnDef::new(LectureFiles::Description).text())
                    .col(ColumnDef::new(LectureFiles::FileType).string_len(20).not_null())
                    .col(ColumnDef::new(LectureFiles::ContentType).string_len(20).not_null())
                    .col(ColumnDef::new(LectureFiles::StoragePath).string())
                    .col(ColumnDef::new(LectureFiles::ExternalLink).string())
                    .col(ColumnDef::new(LectureFiles::FileName).string())
                    .col(
                        ColumnDef::new(LectureFiles::FileSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LectureFiles::FileExtension).string_len(10))
                    .col(ColumnDef::new(LectureFiles::MimeType).string_len(100))
                    .col(
                        ColumnDef::new(LectureFiles::IsVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(LectureFiles::DownloadCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LectureFiles::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LectureFiles::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LectureFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LectureFiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LectureFiles::Table, LectureFiles::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LectureFiles::Table, LectureFiles::UploaderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LectureFiles::Table)
                    .col(LectureFiles::CourseId)
                    .col(LectureFiles::FileType)
                    .name("idx_lecture_files_course_id_file_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LectureFiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LectureFiles {
    Table,
    Id,
    CourseId,
    UploaderId,
    Title,
    Description,
    FileType,
    ContentType,
    StoragePath,
    ExternalLink,
    FileName,
    FileSize,
    FileExtension,
    MimeType,
    IsVisible,
    DownloadCount,
    ViewCount,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
