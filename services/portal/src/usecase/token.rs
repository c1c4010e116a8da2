use anyhow::anyhow;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use sacm_auth_types::cookie::{ACCESS_TOKEN_EXP, REFRESH_TOKEN_EXP};
use sacm_auth_types::token::{
    TokenKind, issue_token, validate_access_token, validate_refresh_token,
};
use sacm_domain::user::{AccountStatus, UserRole};

use crate::domain::repository::{AuditRepository, UserRepository};
use crate::domain::types::{Activity, ActivityKind, AuditAction, AuditEntry, User};
use crate::error::PortalError;
use crate::infra::password::verify_password;

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

fn sign(user: &User, kind: TokenKind, exp: u64, secret: &str) -> Result<String, PortalError> {
    issue_token(user.id, user.role, kind, exp, secret)
        .map_err(|e| PortalError::Internal(anyhow!("sign {kind:?} token: {e}")))
}

pub fn issue_access_token(user: &User, secret: &str) -> Result<(String, u64), PortalError> {
    let exp = now_secs() + ACCESS_TOKEN_EXP;
    Ok((sign(user, TokenKind::Access, exp, secret)?, exp))
}

pub fn issue_refresh_token(user: &User, secret: &str) -> Result<String, PortalError> {
    sign(
        user,
        TokenKind::Refresh,
        now_secs() + REFRESH_TOKEN_EXP,
        secret,
    )
}

fn ensure_active(user: &User) -> Result<(), PortalError> {
    match user.status {
        AccountStatus::Active => Ok(()),
        AccountStatus::Suspended => Err(PortalError::AccountSuspended),
        AccountStatus::Inactive => Err(PortalError::AccountInactive),
    }
}

// ── Login ─────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub academic_id: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct LoginUseCase<U: UserRepository, A: AuditRepository> {
    pub users: U,
    pub audit: A,
    pub jwt_secret: String,
}

impl<U: UserRepository, A: AuditRepository> LoginUseCase<U, A> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, PortalError> {
        // Unknown id and wrong password are indistinguishable to the caller.
        let user = self
            .users
            .find_by_academic_id(input.academic_id.trim())
            .await?
            .ok_or(PortalError::InvalidCredentials)?;

        if !verify_password(&input.password, user.password_hash.as_deref()).await? {
            return Err(PortalError::InvalidCredentials);
        }
        ensure_active(&user)?;

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(&user, &self.jwt_secret)?;

        self.users.record_login(user.id, Utc::now()).await?;
        self.audit
            .record_activity(&Activity::new(user.id, ActivityKind::Login, "Signed in"))
            .await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(user.id), AuditAction::Login, "User")
                    .object(user.id, user.academic_id.clone()),
            )
            .await?;

        info!(user_id = %user.id, role = %user.role, "user signed in");
        Ok(LoginOutput {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<RefreshTokenOutput, PortalError> {
        let info = validate_refresh_token(refresh_token_value, &self.jwt_secret)
            .map_err(|_| PortalError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .filter(|u| u.status.is_active())
            .ok_or(PortalError::InvalidRefreshToken)?;

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(&user, &self.jwt_secret)?;

        Ok(RefreshTokenOutput {
            user_id: user.id,
            user_role: user.role,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── CheckToken (forward auth) ────────────────────────────────────────────────

#[derive(Debug)]
pub struct CheckTokenOutput {
    pub user_id: Uuid,
    pub user_role: UserRole,
    pub access_token_exp: u64,
}

pub struct CheckTokenUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> CheckTokenUseCase<U> {
    /// Validate the access token and re-check that the account is still active.
    /// The role reported is the account's current role, not the one baked into the token.
    pub async fn execute(
        &self,
        access_token: Option<&str>,
        min_role: Option<UserRole>,
    ) -> Result<CheckTokenOutput, PortalError> {
        let token = access_token.ok_or(PortalError::InvalidToken)?;
        let info = validate_access_token(token, &self.jwt_secret)
            .map_err(|_| PortalError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .ok_or(PortalError::InvalidToken)?;
        ensure_active(&user)?;

        if min_role.is_some_and(|min| user.role < min) {
            return Err(PortalError::Forbidden);
        }

        Ok(CheckTokenOutput {
            user_id: user.id,
            user_role: user.role,
            access_token_exp: info.exp,
        })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<A: AuditRepository> {
    pub audit: A,
}

impl<A: AuditRepository> LogoutUseCase<A> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), PortalError> {
        self.audit
            .record_activity(&Activity::new(user_id, ActivityKind::Logout, "Signed out"))
            .await?;
        self.audit
            .record_audit(&AuditEntry::new(Some(user_id), AuditAction::Logout, "User"))
            .await
    }
}
