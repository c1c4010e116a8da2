use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::SenderId).uuid())
                    .col(ColumnDef::new(Notifications::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Notifications::Body).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::CourseId).uuid())
                    .col(ColumnDef::new(Notifications::FileId).uuid())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::FileId)
                            .to(LectureFiles::Table, LectureFiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationRecipients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationRecipients::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationRecipients::NotificationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NotificationRecipients::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(NotificationRecipients::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(NotificationRecipients::ReadAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(NotificationRecipients::DeletedAt)
                            .timestamp_with_time_zone(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                NotificationRecipients::Table,
                                NotificationRecipients::NotificationId,
                            )
                            .to(Notifications::Table, Notifications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(NotificationRecipients::Table, NotificationRecipients::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(NotificationRecipients::Table)
                    .col(NotificationRecipients::NotificationId)
                    .col(NotificationRecipients::UserId)
                    .unique()
                    .name("uq_notification_recipients_notification_id_user_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(NotificationRecipients::Table)
                    .col(NotificationRecipients::UserId)
                    .col(NotificationRecipients::IsRead)
                    .name("idx_notification_recipients_user_id_is_read")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationRecipients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    SenderId,
    Title,
    Body,
    NotificationType,
    CourseId,
    FileId,
    CreatedAt,
}

#[derive(Iden)]
enum NotificationRecipients {
    Table,
    Id,
    NotificationId,
    UserId,
    IsRead,
    ReadAt,
    DeletedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
}

#[derive(Iden)]
enum LectureFiles {
    Table,
    Id,
}
