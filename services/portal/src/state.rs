use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::RedisActivationStore;
use crate::infra::db::{
    DbAuditRepository, DbCourseRepository, DbLectureFileRepository, DbLevelRepository,
    DbMajorRepository, DbNotificationRepository, DbPasswordResetRepository, DbSemesterRepository,
    DbStudyAidRepository, DbUserRepository, DbVerificationCodeRepository,
};
use crate::infra::language_model::HttpLanguageModel;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub jwt_secret: String,
    pub cookie_domain: String,
    pub password_reset_url: String,
    pub expose_verification_codes: bool,
    pub language_model: HttpLanguageModel,
    pub ai_rate_limit_per_hour: u32,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn password_reset_repo(&self) -> DbPasswordResetRepository {
        DbPasswordResetRepository {
            db: self.db.clone(),
        }
    }

    pub fn activation_store(&self) -> RedisActivationStore {
        RedisActivationStore {
            pool: self.redis.clone(),
        }
    }

    pub fn major_repo(&self) -> DbMajorRepository {
        DbMajorRepository {
            db: self.db.clone(),
        }
    }

    pub fn level_repo(&self) -> DbLevelRepository {
        DbLevelRepository {
            db: self.db.clone(),
        }
    }

    pub fn semester_repo(&self) -> DbSemesterRepository {
        DbSemesterRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn lecture_file_repo(&self) -> DbLectureFileRepository {
        DbLectureFileRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit_repo(&self) -> DbAuditRepository {
        DbAuditRepository {
            db: self.db.clone(),
        }
    }

    pub fn notification_repo(&self) -> DbNotificationRepository {
        DbNotificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn study_aid_repo(&self) -> DbStudyAidRepository {
        DbStudyAidRepository {
            db: self.db.clone(),
        }
    }
}
