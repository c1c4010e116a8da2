#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::AccountStatus;

use crate::domain::academic::{Course, CourseFilter, CourseInstructor, Level, Major, Semester};
use crate::domain::lecture_file::{FileType, LectureFile};
use crate::domain::study_aid::{
    ChatExchange, SavedQuestions, SavedSummary, SavedTotals, UsageRecord,
};
use crate::domain::types::{
    Activity, ActivationSession, AuditAction, AuditEntry, InboxItem, OutboxEvent,
    PasswordResetToken, User, UserFilter, UserProfile, UserStats, VerificationCode,
};
use crate::error::PortalError;

/// Repository for portal accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError>;

    async fn find_by_academic_id(&self, academic_id: &str) -> Result<Option<User>, PortalError>;

    /// Both identifiers must belong to the same account.
    async fn find_by_identity(
        &self,
        academic_id: &str,
        id_card_number: &str,
    ) -> Result<Option<User>, PortalError>;

    /// Case-insensitive e-mail lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError>;

    /// Whether any account other than `except` uses this e-mail (case-insensitive).
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, PortalError>;

    async fn id_card_taken(&self, id_card_number: &str) -> Result<bool, PortalError>;

    async fn create(&self, user: &User) -> Result<(), PortalError>;

    /// Newest first (`date_joined` desc).
    async fn list(&self, filter: &UserFilter, page: PageRequest)
    -> Result<Page<User>, PortalError>;

    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, PortalError>;

    async fn update_contact(
        &self,
        id: Uuid,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<(), PortalError>;

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), PortalError>;

    /// Set e-mail, password and `active` in one statement, only while the account is inactive.
    /// Returns `false` if the account was no longer inactive.
    async fn activate(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, PortalError>;

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<(), PortalError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError>;

    /// Move active students at `from_level` (optionally one major) to `to_level`.
    /// Returns the number of students moved.
    async fn promote(
        &self,
        from_level: Uuid,
        to_level: Uuid,
        major_id: Option<Uuid>,
    ) -> Result<u64, PortalError>;

    /// Active students per level id.
    async fn count_active_students_by_level(&self) -> Result<Vec<(Uuid, u64)>, PortalError>;

    async fn stats(&self) -> Result<UserStats, PortalError>;
}

/// Repository for activation e-mail codes.
pub trait VerificationCodeRepository: Send + Sync {
    /// Insert a code and its outbox event in one transaction.
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), PortalError>;

    /// Most recently issued unused code for this user and e-mail.
    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<VerificationCode>, PortalError>;

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), PortalError>;

    /// Mark the code used, but only while it is still unused, unexpired and under the
    /// attempt limit. Returns `false` when a concurrent request changed it first.
    async fn claim(&self, id: Uuid) -> Result<bool, PortalError>;
}

/// Server-side store for activation sessions (short TTL).
pub trait ActivationStore: Send + Sync {
    async fn save(&self, session_id: &str, session: &ActivationSession)
    -> Result<(), PortalError>;

    async fn load(&self, session_id: &str) -> Result<Option<ActivationSession>, PortalError>;

    async fn clear(&self, session_id: &str) -> Result<(), PortalError>;
}

/// Repository for password reset tokens.
pub trait PasswordResetRepository: Send + Sync {
    /// Insert a token and its outbox event in one transaction.
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), PortalError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>, PortalError>;

    /// Mark the token used and store the new hash in one transaction.
    /// Returns `false` if the token was already used.
    async fn consume(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, PortalError>;
}

pub trait MajorRepository: Send + Sync {
    async fn list(&self, active_only: bool) -> Result<Vec<Major>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Major>, PortalError>;
    /// Case-insensitive.
    async fn find_by_name(&self, name: &str) -> Result<Option<Major>, PortalError>;
    async fn create(&self, major: &Major) -> Result<(), PortalError>;
    async fn update(&self, major: &Major) -> Result<(), PortalError>;
}

pub trait LevelRepository: Send + Sync {
    /// Ordered by rank.
    async fn list(&self) -> Result<Vec<Level>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Level>, PortalError>;
    /// Case-insensitive.
    async fn find_by_name(&self, name: &str) -> Result<Option<Level>, PortalError>;
    async fn find_by_number(&self, number: i32) -> Result<Option<Level>, PortalError>;
    async fn create(&self, level: &Level) -> Result<(), PortalError>;
}

/// Repository for semesters. Writes keep at most one semester current.
pub trait SemesterRepository: Send + Sync {
    /// Newest start date first.
    async fn list(&self) -> Result<Vec<Semester>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Semester>, PortalError>;
    async fn find_current(&self) -> Result<Option<Semester>, PortalError>;
    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> Result<bool, PortalError>;
    /// Insert; when `is_current`, clear the flag on all others in the same transaction.
    async fn create(&self, semester: &Semester) -> Result<(), PortalError>;
    /// Update; when `is_current`, clear the flag on all others in the same transaction.
    async fn update(&self, semester: &Semester) -> Result<(), PortalError>;
    async fn set_current(&self, id: Uuid) -> Result<(), PortalError>;
}

pub trait CourseRepository: Send + Sync {
    async fn list(
        &self,
        filter: &CourseFilter,
        page: PageRequest,
    ) -> Result<Page<Course>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, PortalError>;
    async fn code_taken(&self, code: &str, except: Option<Uuid>) -> Result<bool, PortalError>;
    /// Insert the course and its major links in one transaction.
    async fn create(&self, course: &Course) -> Result<(), PortalError>;
    /// Update the course and replace its major links in one transaction.
    async fn update(&self, course: &Course) -> Result<(), PortalError>;
    /// Active courses linked to the major.
    async fn list_active_for_major(&self, major_id: Uuid) -> Result<Vec<Course>, PortalError>;
    /// Active courses the instructor is assigned to.
    async fn list_for_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, PortalError>;
    async fn instructors(&self, course_id: Uuid) -> Result<Vec<CourseInstructor>, PortalError>;
    async fn is_assigned(&self, course_id: Uuid, instructor_id: Uuid)
    -> Result<bool, PortalError>;
    async fn assign(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
        is_primary: bool,
    ) -> Result<(), PortalError>;
    /// Returns `false` if there was no such assignment.
    async fn unassign(&self, course_id: Uuid, instructor_id: Uuid) -> Result<bool, PortalError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCounter {
    Download,
    View,
}

pub trait LectureFileRepository: Send + Sync {
    async fn create(&self, file: &LectureFile) -> Result<(), PortalError>;
    /// Includes soft-deleted files.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LectureFile>, PortalError>;
    /// Non-deleted files of a course, newest first; hidden ones only when asked.
    async fn list_for_course(
        &self,
        course_id: Uuid,
        include_hidden: bool,
        file_type: Option<FileType>,
    ) -> Result<Vec<LectureFile>, PortalError>;
    /// Persist title, description, type, visibility and `deleted_at`.
    async fn save(&self, file: &LectureFile) -> Result<(), PortalError>;
    async fn increment(&self, id: Uuid, counter: FileCounter) -> Result<(), PortalError>;
}

/// Audit trail and per-user activity history.
pub trait AuditRepository: Send + Sync {
    async fn record_audit(&self, entry: &AuditEntry) -> Result<(), PortalError>;
    async fn record_activity(&self, activity: &Activity) -> Result<(), PortalError>;
    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PortalError>;
    async fn list_activities(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Activity>, PortalError>;
    async fn recent_activities(&self, limit: u64) -> Result<Vec<Activity>, PortalError>;
}

/// Recipient side of notifications. Soft-deleted rows are invisible to every method.
pub trait NotificationRepository: Send + Sync {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<InboxItem>, PortalError>;
    async fn unread_count(&self, user_id: Uuid) -> Result<u64, PortalError>;
    /// Returns `false` if the user is not a recipient.
    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, PortalError>;
    /// Returns `false` if the user is not a recipient.
    async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError>;
}

pub trait StudyAidRepository: Send + Sync {
    async fn find_summary(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SavedSummary>, PortalError>;
    /// Insert or replace the (file, user) summary.
    async fn save_summary(&self, summary: &SavedSummary) -> Result<(), PortalError>;
    async fn save_questions(&self, questions: &SavedQuestions) -> Result<(), PortalError>;
    /// Earlier question sets for the (file, user) pair, newest first.
    async fn list_questions(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<SavedQuestions>, PortalError>;
    async fn save_chat(&self, exchange: &ChatExchange) -> Result<(), PortalError>;
    /// Chat history for the (file, user) pair, oldest first.
    async fn list_chats(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ChatExchange>, PortalError>;
    /// Delete the (file, user) chat history. Returns the number of exchanges removed.
    async fn clear_chats(&self, file_id: Uuid, user_id: Uuid) -> Result<u64, PortalError>;
    async fn saved_totals(&self, user_id: Uuid) -> Result<SavedTotals, PortalError>;
    /// All logged requests since `since`, cached or not.
    async fn count_usage_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError>;
    /// Non-cached requests since `since`.
    async fn count_uncached_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError>;
    async fn log_usage(&self, record: &UsageRecord) -> Result<(), PortalError>;
    /// Latest usage rows, newest first.
    async fn recent_usage(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<UsageRecord>, PortalError>;
}

/// Chat-completion style language model.
pub trait LanguageModel: Send + Sync {
    /// Model name, or `None` when no model is configured.
    fn model_name(&self) -> Option<&str>;

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, PortalError>;
}
