use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuditLogs::UserId).uuid())
                    .col(ColumnDef::new(AuditLogs::Action).string_len(20).not_null())
                    .col(ColumnDef::new(AuditLogs::ModelName).string_len(100).not_null())
                    .col(ColumnDef::new(AuditLogs::ObjectId).string_len(100))
                    .col(ColumnDef::new(AuditLogs::ObjectRepr).string_len(200))
                    .col(ColumnDef::new(AuditLogs::Changes).json_binary())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuditLogs::Table, AuditLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AuditLogs::Table)
                    .col(AuditLogs::CreatedAt)
                    .name("idx_audit_logs_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserActivities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserActivities::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserActivities::ActivityType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserActivities::Description).text().not_null())
                    .col(ColumnDef::new(UserActivities::FileId).uuid())
                    .col(
                        ColumnDef::new(UserActivities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserActivities::Table, UserActivities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserActivities::Table, UserActivities::FileId)
                            .to(LectureFiles::Table, LectureFiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserActivities::Table)
                    .col(UserActivities::UserId)
                    .col(UserActivities::CreatedAt)
                    .name("idx_user_activities_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Action,
    ModelName,
    ObjectId,
    ObjectRepr,
    Changes,
    CreatedAt,
}

#[derive(Iden)]
enum UserActivities {
    Table,
    Id,
    UserId,
    ActivityType,
    Description,
    FileId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum LectureFiles {
    Table,
    Id,
}
