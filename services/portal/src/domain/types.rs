use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_domain::user::{AccountStatus, UserRole};

use crate::error::PortalError;

/// Portal account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub academic_id: String,
    pub id_card_number: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// New inactive account as created by an administrator.
    pub fn new_inactive(
        academic_id: String,
        id_card_number: String,
        full_name: String,
        role: UserRole,
        major_id: Option<Uuid>,
        level_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            academic_id,
            id_card_number,
            full_name,
            email: None,
            password_hash: None,
            role,
            status: AccountStatus::Inactive,
            major_id,
            level_id,
            phone_number: None,
            date_joined: Utc::now(),
            last_login: None,
        }
    }
}

/// Authenticated caller of a use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Both entries must match; at least 8 characters and not all digits.
pub fn check_new_password(password1: &str, password2: &str) -> Result<(), PortalError> {
    if password1 != password2 {
        return Err(PortalError::PasswordMismatch);
    }
    if password1.chars().count() < MIN_PASSWORD_LEN || password1.chars().all(|c| c.is_ascii_digit())
    {
        return Err(PortalError::WeakPassword);
    }
    Ok(())
}

/// Account plus the display names of its major and level.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub major_name: Option<String>,
    pub level_name: Option<String>,
}

/// Filters for the admin user list. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub major_id: Option<Uuid>,
    pub level_id: Option<Uuid>,
    pub status: Option<AccountStatus>,
    /// Case-insensitive substring of academic id, full name or e-mail.
    pub search: Option<String>,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_users: u64,
    pub active_users: u64,
    pub students: u64,
    pub instructors: u64,
}

// ── Activation ───────────────────────────────────────────────────────────────

/// E-mail ownership code issued during activation.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub email: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Unused, unexpired and below the attempt limit.
    pub fn is_valid(&self) -> bool {
        self.used_at.is_none()
            && self.expires_at > Utc::now()
            && self.attempts < MAX_VERIFICATION_ATTEMPTS
    }
}

/// Verification code length in digits.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Verification code time-to-live in seconds.
pub const VERIFICATION_CODE_TTL_SECS: i64 = 600;

/// Failed attempts after which a code is dead.
pub const MAX_VERIFICATION_ATTEMPTS: i32 = 5;

/// Multi-step activation state, stored server-side and keyed by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSession {
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp_verified: bool,
}

/// The step a client should show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStep {
    Identity,
    Email,
    Code,
    Password,
}

impl ActivationSession {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            otp_verified: false,
        }
    }

    pub fn step(&self) -> ActivationStep {
        match (&self.email, self.otp_verified) {
            (None, _) => ActivationStep::Email,
            (Some(_), false) => ActivationStep::Code,
            (Some(_), true) => ActivationStep::Password,
        }
    }
}

// ── Password reset ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_valid(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Reset token lifetime in seconds (1 hour).
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// Random bytes in a reset token before base64url encoding.
pub const RESET_TOKEN_BYTES: usize = 32;

// ── Outbox ───────────────────────────────────────────────────────────────────

/// Outbox event for async delivery (verification and reset e-mails).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

pub const OUTBOX_ACTIVATION_CODE_CREATED: &str = "activation_code_created";
pub const OUTBOX_PASSWORD_RESET_REQUESTED: &str = "password_reset_requested";

// ── Audit & activity ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Export,
    Import,
    Promote,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Export => "export",
            Self::Import => "import",
            Self::Promote => "promote",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "export" => Some(Self::Export),
            "import" => Some(Self::Import),
            "promote" => Some(Self::Promote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub model_name: String,
    pub object_id: Option<String>,
    pub object_repr: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor: Option<Uuid>, action: AuditAction, model_name: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: actor,
            action,
            model_name: model_name.to_owned(),
            object_id: None,
            object_repr: None,
            changes: None,
            created_at: Utc::now(),
        }
    }

    pub fn object(mut self, id: impl ToString, repr: impl Into<String>) -> Self {
        self.object_id = Some(id.to_string());
        self.object_repr = Some(repr.into());
        self
    }

    pub fn changes(mut self, changes: serde_json::Value) -> Self {
        self.changes = Some(changes);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Login,
    Logout,
    Upload,
    Download,
    View,
    AiSummary,
    AiQuestions,
    ProfileUpdate,
    PasswordChange,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::View => "view",
            Self::AiSummary => "ai_summary",
            Self::AiQuestions => "ai_questions",
            Self::ProfileUpdate => "profile_update",
            Self::PasswordChange => "password_change",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "upload" => Some(Self::Upload),
            "download" => Some(Self::Download),
            "view" => Some(Self::View),
            "ai_summary" => Some(Self::AiSummary),
            "ai_questions" => Some(Self::AiQuestions),
            "profile_update" => Some(Self::ProfileUpdate),
            "password_change" => Some(Self::PasswordChange),
            _ => None,
        }
    }
}

/// Entry in a user's own activity history.
#[derive(Debug, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(user_id: Uuid, kind: ActivityKind, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            kind,
            description: description.into(),
            file_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_file(mut self, file_id: Uuid) -> Self {
        self.file_id = Some(file_id);
        self
    }
}

// ── Notifications ────────────────────────────────────────────────────────────

/// A notification as seen by one recipient.
#[derive(Debug, Clone)]
pub struct InboxItem {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub notification_type: String,
    pub course_id: Option<Uuid>,
    pub file_id: Option<Uuid>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
