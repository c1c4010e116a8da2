use tracing::info;
use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::{AccountStatus, UserRole};

use crate::domain::academic::Semester;
use crate::domain::repository::{
    AuditRepository, LevelRepository, MajorRepository, SemesterRepository, UserRepository,
};
use crate::domain::types::{Activity, AuditAction, AuditEntry, User, UserFilter, UserStats};
use crate::error::PortalError;

fn required(value: &str, field: &str) -> Result<String, PortalError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::Validation(format!("{field} is required")));
    }
    Ok(value.to_owned())
}

// ── CreateUser ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub academic_id: String,
    pub id_card_number: String,
    pub full_name: String,
    pub role: UserRole,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
}

pub struct CreateUserUseCase<U, M, L, A>
where
    U: UserRepository,
    M: MajorRepository,
    L: LevelRepository,
    A: AuditRepository,
{
    pub users: U,
    pub majors: M,
    pub levels: L,
    pub audit: A,
}

impl<U, M, L, A> CreateUserUseCase<U, M, L, A>
where
    U: UserRepository,
    M: MajorRepository,
    L: LevelRepository,
    A: AuditRepository,
{
    pub async fn execute(&self, actor: Uuid, input: CreateUserInput) -> Result<User, PortalError> {
        let academic_id = required(&input.academic_id, "academic_id")?;
        let id_card_number = required(&input.id_card_number, "id_card_number")?;
        let full_name = required(&input.full_name, "full_name")?;

        if self.users.find_by_academic_id(&academic_id).await?.is_some() {
            return Err(PortalError::AcademicIdTaken);
        }
        if self.users.id_card_taken(&id_card_number).await? {
            return Err(PortalError::IdCardTaken);
        }
        if let Some(major_id) = input.major_id {
            self.majors
                .find_by_id(major_id)
                .await?
                .ok_or(PortalError::MajorNotFound)?;
        }
        if let Some(level_id) = input.level_id {
            self.levels
                .find_by_id(level_id)
                .await?
                .ok_or(PortalError::LevelNotFound)?;
        }

        let user = User::new_inactive(
            academic_id,
            id_card_number,
            full_name,
            input.role,
            input.major_id,
            input.level_id,
        );
        self.users.create(&user).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Create, "User")
                    .object(user.id, user.academic_id.clone())
                    .changes(serde_json::json!({ "role": user.role })),
            )
            .await?;

        Ok(user)
    }
}

// ── ListUsers ─────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, PortalError> {
        self.users.list(&filter, page).await
    }
}

// ── Suspend / Reactivate ──────────────────────────────────────────────────────

/// Status changes an administrator may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Suspend,
    Reactivate,
}

impl StatusChange {
    /// `from -> to` for this change; anything else is rejected.
    fn transition(self) -> (AccountStatus, AccountStatus) {
        match self {
            Self::Suspend => (AccountStatus::Active, AccountStatus::Suspended),
            Self::Reactivate => (AccountStatus::Suspended, AccountStatus::Active),
        }
    }
}

pub struct ChangeStatusUseCase<U: UserRepository, A: AuditRepository> {
    pub users: U,
    pub audit: A,
}

impl<U: UserRepository, A: AuditRepository> ChangeStatusUseCase<U, A> {
    pub async fn execute(
        &self,
        actor: Uuid,
        user_id: Uuid,
        change: StatusChange,
    ) -> Result<User, PortalError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)?;

        let (from, to) = change.transition();
        if user.status != from {
            return Err(PortalError::InvalidStatusTransition);
        }

        self.users.set_status(user.id, to).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "User")
                    .object(user.id, user.academic_id.clone())
                    .changes(serde_json::json!({
                        "account_status": { "from": from, "to": to },
                    })),
            )
            .await?;

        info!(user_id = %user.id, from = %from, to = %to, "account status changed");
        user.status = to;
        Ok(user)
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub const RECENT_ACTIVITY_LIMIT: u64 = 20;

#[derive(Debug)]
pub struct AdminDashboard {
    pub stats: UserStats,
    pub active_majors: u64,
    pub current_semester: Option<Semester>,
    pub recent_activities: Vec<Activity>,
}

pub struct AdminDashboardUseCase<U, M, S, A>
where
    U: UserRepository,
    M: MajorRepository,
    S: SemesterRepository,
    A: AuditRepository,
{
    pub users: U,
    pub majors: M,
    pub semesters: S,
    pub audit: A,
}

impl<U, M, S, A> AdminDashboardUseCase<U, M, S, A>
where
    U: UserRepository,
    M: MajorRepository,
    S: SemesterRepository,
    A: AuditRepository,
{
    pub async fn execute(&self) -> Result<AdminDashboard, PortalError> {
        let stats = self.users.stats().await?;
        let active_majors = self.majors.list(true).await?.len() as u64;
        let current_semester = self.semesters.find_current().await?;
        let recent_activities = self.audit.recent_activities(RECENT_ACTIVITY_LIMIT).await?;
        Ok(AdminDashboard {
            stats,
            active_majors,
            current_semester,
            recent_activities,
        })
    }
}
