pub mod ai_chats;
pub mod ai_questions;
pub mod ai_summaries;
pub mod ai_usage_logs;
pub mod audit_logs;
pub mod course_majors;
pub mod courses;
pub mod instructor_courses;
pub mod lecture_files;
pub mod levels;
pub mod majors;
pub mod notification_recipients;
pub mod notifications;
pub mod outbox_events;
pub mod password_reset_tokens;
pub mod semesters;
pub mod user_activities;
pub mod users;
pub mod verification_codes;
