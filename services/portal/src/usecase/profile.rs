use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AuditRepository, UserRepository};
use crate::domain::types::{Activity, ActivityKind, UserProfile, check_new_password};
use crate::error::PortalError;
use crate::infra::password::{hash_password, verify_password};
use crate::usecase::activation::normalize_email;

// ── GetProfile ────────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserProfile, PortalError> {
        self.users
            .profile(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)
    }
}

// ── UpdateProfile ─────────────────────────────────────────────────────────────

/// Full name, academic id, role, major and level are not editable here.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub email: Option<String>,
    /// Empty string clears the phone number.
    pub phone_number: Option<String>,
}

pub struct UpdateProfileUseCase<U: UserRepository, A: AuditRepository> {
    pub users: U,
    pub audit: A,
}

impl<U: UserRepository, A: AuditRepository> UpdateProfileUseCase<U, A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, PortalError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)?;

        let email = match input.email.as_deref() {
            Some(raw) => {
                let email = normalize_email(raw)?;
                if self.users.email_taken(&email, Some(user_id)).await? {
                    return Err(PortalError::EmailAlreadyUsed);
                }
                Some(email)
            }
            None => None,
        };
        let phone = input.phone_number.as_deref().map(str::trim);
        if phone.is_some_and(|p| p.chars().count() > 20) {
            return Err(PortalError::Validation("phone number is too long".into()));
        }

        self.users
            .update_contact(user_id, email.as_deref(), phone)
            .await?;
        self.audit
            .record_activity(&Activity::new(
                user_id,
                ActivityKind::ProfileUpdate,
                "Updated profile",
            ))
            .await?;

        self.users
            .profile(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)
    }
}

// ── ChangePassword ────────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub current_password: String,
    pub password1: String,
    pub password2: String,
}

pub struct ChangePasswordUseCase<U: UserRepository, A: AuditRepository> {
    pub users: U,
    pub audit: A,
}

impl<U: UserRepository, A: AuditRepository> ChangePasswordUseCase<U, A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), PortalError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)?;

        if !verify_password(&input.current_password, user.password_hash.as_deref()).await? {
            return Err(PortalError::InvalidCredentials);
        }
        check_new_password(&input.password1, &input.password2)?;

        let hash = hash_password(&input.password1).await?;
        self.users.set_password(user_id, &hash).await?;
        self.audit
            .record_activity(&Activity::new(
                user_id,
                ActivityKind::PasswordChange,
                "Changed password",
            ))
            .await
    }
}

// ── ListMyActivities ──────────────────────────────────────────────────────────

pub struct ListActivitiesUseCase<A: AuditRepository> {
    pub audit: A,
}

impl<A: AuditRepository> ListActivitiesUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Activity>, PortalError> {
        self.audit.list_activities(user_id, page).await
    }
}
