mod academic;
mod account_token;
mod audit;
mod course;
mod lecture_file;
mod notification;
mod study_aid;
mod user;

pub use academic::{DbLevelRepository, DbMajorRepository, DbSemesterRepository};
pub use account_token::{DbPasswordResetRepository, DbVerificationCodeRepository};
pub use audit::DbAuditRepository;
pub use course::DbCourseRepository;
pub use lecture_file::DbLectureFileRepository;
pub use notification::DbNotificationRepository;
pub use study_aid::DbStudyAidRepository;
pub use user::DbUserRepository;
