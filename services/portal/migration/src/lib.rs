use sea_orm_migration::prelude::*;

mod m20261001_000001_create_academic_structure;
mod m20261001_000002_create_users;
mod m20261001_000003_create_account_tokens;
mod m20261001_000004_create_outbox_events;
mod m20261001_000005_create_courses;
mod m20261001_000006_create_lecture_files;
mod m20261001_000007_create_audit_logs;
mod m20261001_000008_create_notifications;
mod m20261001_000009_create_study_aid;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_academic_structure::Migration),
            Box::new(m20261001_000002_create_users::Migration),
            Box::new(m20261001_000003_create_account_tokens::Migration),
            Box::new(m20261001_000004_create_outbox_events::Migration),
            Box::new(m20261001_000005_create_courses::Migration),
            Box::new(m20261001_000006_create_lecture_files::Migration),
            Box::new(m20261001_000007_create_audit_logs::Migration),
            Box::new(m20261001_000008_create_notifications::Migration),
            Box::new(m20261001_000009_create_study_aid::Migration),
        ]
    }
}
