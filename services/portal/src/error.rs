use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Portal service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    // ── lookups ──
    #[error("user not found")]
    UserNotFound,
    #[error("major not found")]
    MajorNotFound,
    #[error("level not found")]
    LevelNotFound,
    #[error("semester not found")]
    SemesterNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("file not found")]
    FileNotFound,
    #[error("notification not found")]
    NotificationNotFound,

    // ── activation / login ──
    #[error("academic id and id card number do not match any account")]
    InvalidIdentity,
    #[error("account is already active, use password reset instead")]
    AccountAlreadyActive,
    #[error("account is suspended")]
    AccountSuspended,
    #[error("account is not activated")]
    AccountInactive,
    #[error("email is already used by another account")]
    EmailAlreadyUsed,
    #[error("invalid or expired verification code")]
    InvalidVerificationCode,
    #[error("activation session missing or incomplete")]
    ActivationSessionRequired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("invalid or expired reset link")]
    InvalidResetToken,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least 8 characters and not entirely numeric")]
    WeakPassword,

    // ── administration ──
    #[error("academic id is already taken")]
    AcademicIdTaken,
    #[error("id card number is already taken")]
    IdCardTaken,
    #[error("course code is already taken")]
    CourseCodeTaken,
    #[error("major name is already taken")]
    MajorNameTaken,
    #[error("level name or number is already taken")]
    LevelTaken,
    #[error("semester name is already taken")]
    SemesterNameTaken,
    #[error("instructor is already assigned to this course")]
    AlreadyAssigned,
    #[error("account status transition not allowed")]
    InvalidStatusTransition,
    #[error("target level must be higher than source level")]
    InvalidPromotion,
    #[error("no next level")]
    NoNextLevel,

    // ── access ──
    #[error("forbidden")]
    Forbidden,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("{0}")]
    Validation(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MajorNotFound => "MAJOR_NOT_FOUND",
            Self::LevelNotFound => "LEVEL_NOT_FOUND",
            Self::SemesterNotFound => "SEMESTER_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::NotificationNotFound => "NOTIFICATION_NOT_FOUND",
            Self::InvalidIdentity => "INVALID_IDENTITY",
            Self::AccountAlreadyActive => "ACCOUNT_ALREADY_ACTIVE",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::EmailAlreadyUsed => "EMAIL_ALREADY_USED",
            Self::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
            Self::ActivationSessionRequired => "ACTIVATION_SESSION_REQUIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::AcademicIdTaken => "ACADEMIC_ID_TAKEN",
            Self::IdCardTaken => "ID_CARD_TAKEN",
            Self::CourseCodeTaken => "COURSE_CODE_TAKEN",
            Self::MajorNameTaken => "MAJOR_NAME_TAKEN",
            Self::LevelTaken => "LEVEL_TAKEN",
            Self::SemesterNameTaken => "SEMESTER_NAME_TAKEN",
            Self::AlreadyAssigned => "ALREADY_ASSIGNED",
            Self::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            Self::InvalidPromotion => "INVALID_PROMOTION",
            Self::NoNextLevel => "NO_NEXT_LEVEL",
            Self::Forbidden => "FORBIDDEN",
            Self::RateLimited => "RATE_LIMITED",
            Self::Validation(_) => "VALIDATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound
            | Self::MajorNotFound
            | Self::LevelNotFound
            | Self::SemesterNotFound
            | Self::CourseNotFound
            | Self::FileNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::AccountSuspended | Self::AccountInactive | Self::Forbidden => {
                StatusCode::FORBIDDEN
            }
            Self::ActivationSessionRequired => StatusCode::PRECONDITION_FAILED,
            Self::AccountAlreadyActive
            | Self::EmailAlreadyUsed
            | Self::AcademicIdTaken
            | Self::IdCardTaken
            | Self::CourseCodeTaken
            | Self::MajorNameTaken
            | Self::LevelTaken
            | Self::SemesterNameTaken
            | Self::AlreadyAssigned
            | Self::InvalidStatusTransition => StatusCode::CONFLICT,
            Self::InvalidIdentity
            | Self::InvalidVerificationCode
            | Self::InvalidResetToken
            | Self::PasswordMismatch
            | Self::WeakPassword
            | Self::InvalidPromotion
            | Self::NoNextLevel
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer records every request; only internal errors carry a chain worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
