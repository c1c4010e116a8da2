pub mod academic;
pub mod activation;
pub mod admin;
pub mod audit;
pub mod course;
pub mod lecture_file;
pub mod notification;
pub mod password_reset;
pub mod profile;
pub mod promotion;
pub mod study_aid;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;
use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::{AccountStatus, UserRole};

use crate::domain::types::{Activity, ActivityKind, Actor, User};
use crate::error::PortalError;

// ── Role guards ──────────────────────────────────────────────────────────────

fn actor(identity: &IdentityHeaders) -> Actor {
    Actor {
        user_id: identity.user_id,
        role: identity.user_role,
    }
}

/// Any authenticated caller.
pub fn require_user(identity: &IdentityHeaders) -> Actor {
    actor(identity)
}

pub fn require_admin(identity: &IdentityHeaders) -> Result<Actor, PortalError> {
    if !identity.has_any_role(&[UserRole::Admin]) {
        return Err(PortalError::Forbidden);
    }
    Ok(actor(identity))
}

/// Instructors and admins.
pub fn require_instructor(identity: &IdentityHeaders) -> Result<Actor, PortalError> {
    if !identity.has_any_role(&[UserRole::Instructor, UserRole::Admin]) {
        return Err(PortalError::Forbidden);
    }
    Ok(actor(identity))
}

pub fn require_student(identity: &IdentityHeaders) -> Result<Actor, PortalError> {
    if !identity.has_any_role(&[UserRole::Student]) {
        return Err(PortalError::Forbidden);
    }
    Ok(actor(identity))
}

// ── Shared query / response types ────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PageQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.per_page, self.page)
    }
}

#[derive(Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PageResponse<T> {
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        let page = page.map(f);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub academic_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
    pub phone_number: Option<String>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub date_joined: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms_opt")]
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            academic_id: user.academic_id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            status: user.status,
            major_id: user.major_id,
            level_id: user.level_id,
            phone_number: user.phone_number,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub file_id: Option<Uuid>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            kind: activity.kind,
            description: activity.description,
            file_id: activity.file_id,
            created_at: activity.created_at,
        }
    }
}
