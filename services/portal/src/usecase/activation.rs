use chrono::{Duration, Utc};
use rand::RngExt;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use sacm_domain::user::AccountStatus;

use crate::domain::repository::{
    ActivationStore, AuditRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::types::{
    ActivationSession, ActivationStep, AuditAction, AuditEntry, OUTBOX_ACTIVATION_CODE_CREATED,
    OutboxEvent, VERIFICATION_CODE_TTL_SECS, VerificationCode, check_new_password,
};
use crate::error::PortalError;
use crate::infra::password::hash_password;

/// Six random digits, zero-padded.
pub fn generate_verification_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// Lowercase and trim an e-mail, then check its syntax.
pub fn normalize_email(email: &str) -> Result<String, PortalError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(PortalError::Validation(
            "enter a valid email address".into(),
        ));
    }
    Ok(email)
}

async fn load_session<'a, S: ActivationStore>(
    sessions: &S,
    session_id: Option<&'a str>,
) -> Result<(&'a str, ActivationSession), PortalError> {
    let session_id = session_id.ok_or(PortalError::ActivationSessionRequired)?;
    let session = sessions
        .load(session_id)
        .await?
        .ok_or(PortalError::ActivationSessionRequired)?;
    Ok((session_id, session))
}

// ── Step 1: identity ──────────────────────────────────────────────────────────

pub struct IdentityInput {
    pub academic_id: String,
    pub id_card_number: String,
}

#[derive(Debug)]
pub struct IdentityOutput {
    pub session_id: String,
    pub session: ActivationSession,
}

pub struct SubmitIdentityUseCase<U: UserRepository, S: ActivationStore> {
    pub users: U,
    pub sessions: S,
}

impl<U: UserRepository, S: ActivationStore> SubmitIdentityUseCase<U, S> {
    pub async fn execute(&self, input: IdentityInput) -> Result<IdentityOutput, PortalError> {
        let user = self
            .users
            .find_by_identity(input.academic_id.trim(), input.id_card_number.trim())
            .await?
            .ok_or(PortalError::InvalidIdentity)?;

        match user.status {
            AccountStatus::Inactive => {}
            AccountStatus::Active => return Err(PortalError::AccountAlreadyActive),
            AccountStatus::Suspended => return Err(PortalError::AccountSuspended),
        }

        let session_id = Uuid::new_v4().to_string();
        let session = ActivationSession::new(user.id);
        self.sessions.save(&session_id, &session).await?;

        Ok(IdentityOutput {
            session_id,
            session,
        })
    }
}

// ── Step 2: e-mail ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EmailOutput {
    /// The issued code. Only echoed to the client in development.
    pub code: String,
    pub session: ActivationSession,
}

pub struct SubmitEmailUseCase<U, S, V>
where
    U: UserRepository,
    S: ActivationStore,
    V: VerificationCodeRepository,
{
    pub users: U,
    pub sessions: S,
    pub codes: V,
}

impl<U, S, V> SubmitEmailUseCase<U, S, V>
where
    U: UserRepository,
    S: ActivationStore,
    V: VerificationCodeRepository,
{
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        email: &str,
    ) -> Result<EmailOutput, PortalError> {
        let (session_id, mut session) = load_session(&self.sessions, session_id).await?;
        let email = normalize_email(email)?;

        if self.users.email_taken(&email, None).await? {
            return Err(PortalError::EmailAlreadyUsed);
        }

        let now = Utc::now();
        let code = VerificationCode {
            id: Uuid::now_v7(),
            user_id: session.user_id,
            code: generate_verification_code(),
            email: email.clone(),
            attempts: 0,
            expires_at: now + Duration::seconds(VERIFICATION_CODE_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        let event = OutboxEvent {
            id: Uuid::now_v7(),
            kind: OUTBOX_ACTIVATION_CODE_CREATED.to_owned(),
            payload: serde_json::json!({
                "user_id": code.user_id,
                "email": code.email,
                "code": code.code,
                "expires_at": code.expires_at,
            }),
            idempotency_key: format!("activation-code:{}", code.id),
        };
        self.codes.create_with_outbox(&code, &event).await?;

        session.email = Some(email);
        session.otp_verified = false;
        self.sessions.save(session_id, &session).await?;

        Ok(EmailOutput {
            code: code.code,
            session,
        })
    }
}

// ── Step 3: code ──────────────────────────────────────────────────────────────

pub struct VerifyCodeUseCase<S: ActivationStore, V: VerificationCodeRepository> {
    pub sessions: S,
    pub codes: V,
}

impl<S: ActivationStore, V: VerificationCodeRepository> VerifyCodeUseCase<S, V> {
    /// Every failure is the same `InvalidVerificationCode`, whatever the cause.
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        submitted: &str,
    ) -> Result<ActivationSession, PortalError> {
        let (session_id, mut session) = load_session(&self.sessions, session_id).await?;
        let email = session
            .email
            .clone()
            .ok_or(PortalError::ActivationSessionRequired)?;

        let code = self
            .codes
            .find_latest_unused(session.user_id, &email)
            .await?
            .ok_or(PortalError::InvalidVerificationCode)?;

        if !code.is_valid() {
            return Err(PortalError::InvalidVerificationCode);
        }
        if code.code != submitted.trim() {
            self.codes.record_failed_attempt(code.id).await?;
            warn!(user_id = %session.user_id, attempts = code.attempts + 1, "verification code mismatch");
            return Err(PortalError::InvalidVerificationCode);
        }

        // The snapshot above may be stale; the claim re-checks it atomically.
        if !self.codes.claim(code.id).await? {
            warn!(user_id = %session.user_id, "verification code claimed or exhausted concurrently");
            return Err(PortalError::InvalidVerificationCode);
        }
        session.otp_verified = true;
        self.sessions.save(session_id, &session).await?;
        Ok(session)
    }
}

// ── Step 4: password ──────────────────────────────────────────────────────────

pub struct SetPasswordInput {
    pub password1: String,
    pub password2: String,
}

pub struct SetPasswordUseCase<U, S, A>
where
    U: UserRepository,
    S: ActivationStore,
    A: AuditRepository,
{
    pub users: U,
    pub sessions: S,
    pub audit: A,
}

impl<U, S, A> SetPasswordUseCase<U, S, A>
where
    U: UserRepository,
    S: ActivationStore,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        input: SetPasswordInput,
    ) -> Result<(), PortalError> {
        let (session_id, session) = load_session(&self.sessions, session_id).await?;
        let email = match (&session.email, session.otp_verified) {
            (Some(email), true) => email.clone(),
            _ => return Err(PortalError::ActivationSessionRequired),
        };

        check_new_password(&input.password1, &input.password2)?;

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(PortalError::ActivationSessionRequired)?;
        if self.users.email_taken(&email, Some(user.id)).await? {
            return Err(PortalError::EmailAlreadyUsed);
        }

        let hash = hash_password(&input.password1).await?;
        if !self.users.activate(user.id, &email, &hash).await? {
            // Activated or suspended since step 1.
            self.sessions.clear(session_id).await?;
            return Err(PortalError::ActivationSessionRequired);
        }

        self.audit
            .record_audit(
                &AuditEntry::new(Some(user.id), AuditAction::Create, "User")
                    .object(user.id, user.academic_id.clone())
                    .changes(serde_json::json!({ "action": "account_activated" })),
            )
            .await?;
        self.sessions.clear(session_id).await?;

        info!(user_id = %user.id, "account activated");
        Ok(())
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

pub struct ActivationStatusUseCase<S: ActivationStore> {
    pub sessions: S,
}

impl<S: ActivationStore> ActivationStatusUseCase<S> {
    pub async fn execute(&self, session_id: Option<&str>) -> Result<ActivationStep, PortalError> {
        let Some(session_id) = session_id else {
            return Ok(ActivationStep::Identity);
        };
        Ok(self
            .sessions
            .load(session_id)
            .await?
            .map_or(ActivationStep::Identity, |s| s.step()))
    }
}
