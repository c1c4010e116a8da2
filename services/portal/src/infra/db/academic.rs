use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use sacm_portal_schema::{levels, majors, semesters};

use crate::domain::academic::{Level, Major, Semester};
use crate::domain::repository::{LevelRepository, MajorRepository, SemesterRepository};
use crate::error::PortalError;

// ── Major repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMajorRepository {
    pub db: DatabaseConnection,
}

impl MajorRepository for DbMajorRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Major>, PortalError> {
        let mut query = majors::Entity::find();
        if active_only {
            query = query.filter(majors::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(majors::Column::MajorName)
            .all(&self.db)
            .await
            .context("list majors")?;
        Ok(models.into_iter().map(major_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Major>, PortalError> {
        let model = majors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find major by id")?;
        Ok(model.map(major_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Major>, PortalError> {
        let model = majors::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(majors::Column::MajorName)))
                    .eq(name.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .context("find major by name")?;
        Ok(model.map(major_from_model))
    }

    async fn create(&self, major: &Major) -> Result<(), PortalError> {
        majors::ActiveModel {
            id: Set(major.id),
            major_name: Set(major.name.clone()),
            description: Set(major.description.clone()),
            is_active: Set(major.is_active),
            created_at: Set(major.created_at),
        }
        .insert(&self.db)
        .await
        .context("create major")?;
        Ok(())
    }

    async fn update(&self, major: &Major) -> Result<(), PortalError> {
        majors::ActiveModel {
            id: Set(major.id),
            major_name: Set(major.name.clone()),
            description: Set(major.description.clone()),
            is_active: Set(major.is_active),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update major")?;
        Ok(())
    }
}

fn major_from_model(model: majors::Model) -> Major {
    Major {
        id: model.id,
        name: model.major_name,
        description: model.description,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

// ── Level repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLevelRepository {
    pub db: DatabaseConnection,
}

impl LevelRepository for DbLevelRepository {
    async fn list(&self) -> Result<Vec<Level>, PortalError> {
        let models = levels::Entity::find()
            .order_by_asc(levels::Column::LevelNumber)
            .all(&self.db)
            .await
            .context("list levels")?;
        Ok(models.into_iter().map(level_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Level>, PortalError> {
        let model = levels::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find level by id")?;
        Ok(model.map(level_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Level>, PortalError> {
        let model = levels::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(levels::Column::LevelName)))
                    .eq(name.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .context("find level by name")?;
        Ok(model.map(level_from_model))
    }

    async fn find_by_number(&self, number: i32) -> Result<Option<Level>, PortalError> {
        let model = levels::Entity::find()
            .filter(levels::Column::LevelNumber.eq(number))
            .one(&self.db)
            .await
            .context("find level by number")?;
        Ok(model.map(level_from_model))
    }

    async fn create(&self, level: &Level) -> Result<(), PortalError> {
        levels::ActiveModel {
            id: Set(level.id),
            level_name: Set(level.name.clone()),
            level_number: Set(level.number),
        }
        .insert(&self.db)
        .await
        .context("create level")?;
        Ok(())
    }
}

fn level_from_model(model: levels::Model) -> Level {
    Level {
        id: model.id,
        name: model.level_name,
        number: model.level_number,
    }
}

// ── Semester repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSemesterRepository {
    pub db: DatabaseConnection,
}

async fn clear_current_except(txn: &DatabaseTransaction, id: Uuid) -> Result<(), sea_orm::DbErr> {
    semesters::Entity::update_many()
        .col_expr(semesters::Column::IsCurrent, Expr::value(false))
        .filter(semesters::Column::IsCurrent.eq(true))
        .filter(semesters::Column::Id.ne(id))
        .exec(txn)
        .await?;
    Ok(())
}

impl SemesterRepository for DbSemesterRepository {
    async fn list(&self) -> Result<Vec<Semester>, PortalError> {
        let models = semesters::Entity::find()
            .order_by_desc(semesters::Column::StartDate)
            .all(&self.db)
            .await
            .context("list semesters")?;
        Ok(models.into_iter().map(semester_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Semester>, PortalError> {
        let model = semesters::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find semester by id")?;
        Ok(model.map(semester_from_model))
    }

    async fn find_current(&self) -> Result<Option<Semester>, PortalError> {
        let model = semesters::Entity::find()
            .filter(semesters::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await
            .context("find current semester")?;
        Ok(model.map(semester_from_model))
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        let mut query = semesters::Entity::find().filter(semesters::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(semesters::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("check semester name taken")?;
        Ok(count > 0)
    }

    async fn create(&self, semester: &Semester) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let semester = semester.clone();
                Box::pin(async move {
                    if semester.is_current {
                        clear_current_except(txn, semester.id).await?;
                    }
                    semesters::ActiveModel {
                        id: Set(semester.id),
                        name: Set(semester.name),
                        academic_year: Set(semester.academic_year),
                        semester_number: Set(semester.number),
                        start_date: Set(semester.start_date),
                        end_date: Set(semester.end_date),
                        is_current: Set(semester.is_current),
                        created_at: Set(semester.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create semester")?;
        Ok(())
    }

    async fn update(&self, semester: &Semester) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let semester = semester.clone();
                Box::pin(async move {
                    if semester.is_current {
                        clear_current_except(txn, semester.id).await?;
                    }
                    semesters::ActiveModel {
                        id: Set(semester.id),
                        name: Set(semester.name),
                        academic_year: Set(semester.academic_year),
                        semester_number: Set(semester.number),
                        start_date: Set(semester.start_date),
                        end_date: Set(semester.end_date),
                        is_current: Set(semester.is_current),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("update semester")?;
        Ok(())
    }

    async fn set_current(&self, id: Uuid) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    clear_current_except(txn, id).await?;
                    semesters::ActiveModel {
                        id: Set(id),
                        is_current: Set(true),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("set current semester")?;
        Ok(())
    }
}

fn semester_from_model(model: semesters::Model) -> Semester {
    Semester {
        id: model.id,
        name: model.name,
        academic_year: model.academic_year,
        number: model.semester_number,
        start_date: model.start_date,
        end_date: model.end_date,
        is_current: model.is_current,
        created_at: model.created_at,
    }
}
