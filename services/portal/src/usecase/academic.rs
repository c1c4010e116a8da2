use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::academic::{Level, Major, Semester};
use crate::domain::repository::{
    AuditRepository, LevelRepository, MajorRepository, SemesterRepository,
};
use crate::domain::types::{AuditAction, AuditEntry};
use crate::error::PortalError;

fn required_name(value: &str) -> Result<String, PortalError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::Validation("name is required".into()));
    }
    Ok(value.to_owned())
}

// ── Majors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MajorInput {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

pub struct ListMajorsUseCase<M: MajorRepository> {
    pub majors: M,
}

impl<M: MajorRepository> ListMajorsUseCase<M> {
    pub async fn execute(&self, active_only: bool) -> Result<Vec<Major>, PortalError> {
        self.majors.list(active_only).await
    }
}

pub struct SaveMajorUseCase<M: MajorRepository, A: AuditRepository> {
    pub majors: M,
    pub audit: A,
}

impl<M: MajorRepository, A: AuditRepository> SaveMajorUseCase<M, A> {
    pub async fn create(&self, actor: Uuid, input: MajorInput) -> Result<Major, PortalError> {
        let name = required_name(&input.name)?;
        if self.majors.find_by_name(&name).await?.is_some() {
            return Err(PortalError::MajorNameTaken);
        }
        let major = Major {
            id: Uuid::now_v7(),
            name,
            description: input.description,
            is_active: input.is_active,
            created_at: Utc::now(),
        };
        self.majors.create(&major).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Create, "Major")
                    .object(major.id, major.name.clone()),
            )
            .await?;
        Ok(major)
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        input: MajorInput,
    ) -> Result<Major, PortalError> {
        let mut major = self
            .majors
            .find_by_id(id)
            .await?
            .ok_or(PortalError::MajorNotFound)?;
        let name = required_name(&input.name)?;
        if self
            .majors
            .find_by_name(&name)
            .await?
            .is_some_and(|other| other.id != id)
        {
            return Err(PortalError::MajorNameTaken);
        }

        major.name = name;
        major.description = input.description;
        major.is_active = input.is_active;
        self.majors.update(&major).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Major")
                    .object(major.id, major.name.clone()),
            )
            .await?;
        Ok(major)
    }
}

// ── Levels ────────────────────────────────────────────────────────────────────

pub struct ListLevelsUseCase<L: LevelRepository> {
    pub levels: L,
}

impl<L: LevelRepository> ListLevelsUseCase<L> {
    pub async fn execute(&self) -> Result<Vec<Level>, PortalError> {
        self.levels.list().await
    }
}

pub struct CreateLevelUseCase<L: LevelRepository, A: AuditRepository> {
    pub levels: L,
    pub audit: A,
}

impl<L: LevelRepository, A: AuditRepository> CreateLevelUseCase<L, A> {
    pub async fn execute(&self, actor: Uuid, name: &str, number: i32) -> Result<Level, PortalError> {
        let name = required_name(name)?;
        if number < 1 {
            return Err(PortalError::Validation(
                "level number must be positive".into(),
            ));
        }
        if self.levels.find_by_name(&name).await?.is_some()
            || self.levels.find_by_number(number).await?.is_some()
        {
            return Err(PortalError::LevelTaken);
        }
        let level = Level {
            id: Uuid::now_v7(),
            name,
            number,
        };
        self.levels.create(&level).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Create, "Level")
                    .object(level.id, level.name.clone()),
            )
            .await?;
        Ok(level)
    }
}

// ── Semesters ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SemesterInput {
    pub name: String,
    pub academic_year: String,
    pub number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

pub struct ListSemestersUseCase<S: SemesterRepository> {
    pub semesters: S,
}

impl<S: SemesterRepository> ListSemestersUseCase<S> {
    pub async fn execute(&self) -> Result<Vec<Semester>, PortalError> {
        self.semesters.list().await
    }

    pub async fn current(&self) -> Result<Semester, PortalError> {
        self.semesters
            .find_current()
            .await?
            .ok_or(PortalError::SemesterNotFound)
    }
}

pub struct SaveSemesterUseCase<S: SemesterRepository, A: AuditRepository> {
    pub semesters: S,
    pub audit: A,
}

impl<S: SemesterRepository, A: AuditRepository> SaveSemesterUseCase<S, A> {
    fn apply(semester: &mut Semester, input: SemesterInput) -> Result<(), PortalError> {
        semester.name = required_name(&input.name)?;
        semester.academic_year = input.academic_year.trim().to_owned();
        semester.number = input.number;
        semester.start_date = input.start_date;
        semester.end_date = input.end_date;
        semester.is_current = input.is_current;
        if !semester.has_valid_dates() {
            return Err(PortalError::Validation(
                "start_date must be before end_date".into(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, actor: Uuid, input: SemesterInput) -> Result<Semester, PortalError> {
        let mut semester = Semester {
            id: Uuid::now_v7(),
            name: String::new(),
            academic_year: String::new(),
            number: 0,
            start_date: input.start_date,
            end_date: input.end_date,
            is_current: false,
            created_at: Utc::now(),
        };
        Self::apply(&mut semester, input)?;
        if self.semesters.name_taken(&semester.name, None).await? {
            return Err(PortalError::SemesterNameTaken);
        }

        self.semesters.create(&semester).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Create, "Semester")
                    .object(semester.id, semester.name.clone()),
            )
            .await?;
        Ok(semester)
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        input: SemesterInput,
    ) -> Result<Semester, PortalError> {
        let mut semester = self
            .semesters
            .find_by_id(id)
            .await?
            .ok_or(PortalError::SemesterNotFound)?;
        Self::apply(&mut semester, input)?;
        if self.semesters.name_taken(&semester.name, Some(id)).await? {
            return Err(PortalError::SemesterNameTaken);
        }

        self.semesters.update(&semester).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Semester")
                    .object(semester.id, semester.name.clone()),
            )
            .await?;
        Ok(semester)
    }

    pub async fn set_current(&self, actor: Uuid, id: Uuid) -> Result<Semester, PortalError> {
        let mut semester = self
            .semesters
            .find_by_id(id)
            .await?
            .ok_or(PortalError::SemesterNotFound)?;

        self.semesters.set_current(id).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Semester")
                    .object(semester.id, semester.name.clone())
                    .changes(serde_json::json!({ "is_current": true })),
            )
            .await?;

        info!(semester = %semester.name, "current semester changed");
        semester.is_current = true;
        Ok(semester)
    }
}
