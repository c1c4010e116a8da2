use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{PasswordResetRepository, UserRepository};
use crate::domain::types::{
    OUTBOX_PASSWORD_RESET_REQUESTED, OutboxEvent, PasswordResetToken, RESET_TOKEN_BYTES,
    RESET_TOKEN_TTL_SECS, check_new_password,
};
use crate::error::PortalError;
use crate::infra::password::hash_password;

/// 32 random bytes, base64url without padding.
pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

// ── RequestPasswordReset ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RequestResetOutput {
    /// Full reset link. Only echoed to the client in development.
    pub link: String,
}

pub struct RequestPasswordResetUseCase<U: UserRepository, R: PasswordResetRepository> {
    pub users: U,
    pub tokens: R,
    /// The token is appended to this prefix.
    pub reset_url: String,
}

impl<U: UserRepository, R: PasswordResetRepository> RequestPasswordResetUseCase<U, R> {
    pub async fn execute(&self, email: &str) -> Result<RequestResetOutput, PortalError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .filter(|u| u.status.is_active())
            .ok_or(PortalError::UserNotFound)?;

        let now = Utc::now();
        let token = PasswordResetToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            token: generate_reset_token(),
            expires_at: now + Duration::seconds(RESET_TOKEN_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        let link = format!("{}{}", self.reset_url, token.token);
        let event = OutboxEvent {
            id: Uuid::now_v7(),
            kind: OUTBOX_PASSWORD_RESET_REQUESTED.to_owned(),
            payload: serde_json::json!({
                "user_id": user.id,
                "email": user.email,
                "full_name": user.full_name,
                "link": link,
                "expires_at": token.expires_at,
            }),
            idempotency_key: format!("password-reset:{}", token.id),
        };
        self.tokens.create_with_outbox(&token, &event).await?;

        info!(user_id = %user.id, "password reset requested");
        Ok(RequestResetOutput { link })
    }
}

// ── CheckResetToken ───────────────────────────────────────────────────────────

pub struct CheckResetTokenUseCase<R: PasswordResetRepository> {
    pub tokens: R,
}

impl<R: PasswordResetRepository> CheckResetTokenUseCase<R> {
    pub async fn execute(&self, token: &str) -> Result<PasswordResetToken, PortalError> {
        self.tokens
            .find_by_token(token)
            .await?
            .filter(PasswordResetToken::is_valid)
            .ok_or(PortalError::InvalidResetToken)
    }
}

// ── ConfirmPasswordReset ──────────────────────────────────────────────────────

pub struct ConfirmResetInput {
    pub token: String,
    pub password1: String,
    pub password2: String,
}

pub struct ConfirmPasswordResetUseCase<R: PasswordResetRepository> {
    pub tokens: R,
}

impl<R: PasswordResetRepository> ConfirmPasswordResetUseCase<R> {
    pub async fn execute(&self, input: ConfirmResetInput) -> Result<(), PortalError> {
        let token = self
            .tokens
            .find_by_token(&input.token)
            .await?
            .filter(PasswordResetToken::is_valid)
            .ok_or(PortalError::InvalidResetToken)?;

        check_new_password(&input.password1, &input.password2)?;
        let hash = hash_password(&input.password1).await?;

        if !self.tokens.consume(token.id, token.user_id, &hash).await? {
            return Err(PortalError::InvalidResetToken);
        }

        info!(user_id = %token.user_id, "password reset completed");
        Ok(())
    }
}
