use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiSummaries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiSummaries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiSummaries::FileId).uuid().not_null())
                    .col(ColumnDef::new(AiSummaries::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiSummaries::SummaryText).text().not_null())
                    .col(ColumnDef::new(AiSummaries::ModelUsed).string_len(50))
                    .col(
                        ColumnDef::new(AiSummaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiSummaries::Table, AiSummaries::FileId)
                            .to(LectureFiles::Table, LectureFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiSummaries::Table, AiSummaries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AiSummaries::Table)
                    .col(AiSummaries::FileId)
                    .col(AiSummaries::UserId)
                    .unique()
                    .name("uq_ai_summaries_file_id_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiQuestions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiQuestions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiQuestions::FileId).uuid().not_null())
                    .col(ColumnDef::new(AiQuestions::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiQuestions::QuestionType).string_len(20).not_null())
                    .col(ColumnDef::new(AiQuestions::Questions).json_binary().not_null())
                    .col(ColumnDef::new(AiQuestions::ModelUsed).string_len(50))
                    .col(
                        ColumnDef::new(AiQuestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiQuestions::Table, AiQuestions::FileId)
                            .to(LectureFiles::Table, LectureFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiQuestions::Table, AiQuestions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiChats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiChats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiChats::FileId).uuid().not_null())
                    .col(ColumnDef::new(AiChats::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiChats::Question).text().not_null())
                    .col(ColumnDef::new(AiChats::Answer).text().not_null())
                    .col(
                        ColumnDef::new(AiChats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiChats::Table, AiChats::FileId)
                            .to(LectureFiles::Table, LectureFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiChats::Table, AiChats::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiUsageLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiUsageLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiUsageLogs::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiUsageLogs::RequestType).string_len(20).not_null())
                    .col(ColumnDef::new(AiUsageLogs::FileId).uuid())
                    .col(
                        ColumnDef::new(AiUsageLogs::WasCached)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AiUsageLogs::Success)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(AiUsageLogs::ErrorMessage).text())
                    .col(
                        ColumnDef::new(AiUsageLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiUsageLogs::Table, AiUsageLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Quota lookups: non-cached requests per user within the last hour.
        manager
            .create_index(
                Index::create()
                    .table(AiUsageLogs::Table)
                    .col(AiUsageLogs::UserId)
                    .col(AiUsageLogs::CreatedAt)
                    .name("idx_ai_usage_logs_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiUsageLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiChats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AiSummaries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AiSummaries {
    Table,
    Id,
    FileId,
    UserId,
    SummaryText,
    ModelUsed,
    CreatedAt,
}

#[derive(Iden)]
enum AiQuestions {
    Table,
    Id,
    FileId,
    UserId,
    QuestionType,
    Questions,
    ModelUsed,
    CreatedAt,
}

#[derive(Iden)]
enum AiChats {
    Table,
    Id,
    FileId,
    UserId,
    Question,
    Answer,
    CreatedAt,
}

#[derive(Iden)]
enum AiUsageLogs {
    Table,
    Id,
    UserId,
    RequestType,
    FileId,
    WasCached,
    Success,
    ErrorMessage,
    CreatedAt,
}

#[derive(Iden)]
enum LectureFiles {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
