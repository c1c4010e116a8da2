use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use sacm_portal_schema::{outbox_events, password_reset_tokens, users, verification_codes};

use crate::domain::repository::{PasswordResetRepository, VerificationCodeRepository};
use crate::domain::types::{
    MAX_VERIFICATION_ATTEMPTS, OutboxEvent, PasswordResetToken, VerificationCode,
};
use crate::error::PortalError;

// ── VerificationCode repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                let event = event.clone();
                Box::pin(async move {
                    verification_codes::ActiveModel {
                        id: Set(code.id),
                        user_id: Set(code.user_id),
                        code: Set(code.code),
                        email: Set(code.email),
                        attempts: Set(code.attempts),
                        expires_at: Set(code.expires_at),
                        used_at: Set(None),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create verification code with outbox")?;
        Ok(())
    }

    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<VerificationCode>, PortalError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::Email.eq(email))
            .filter(verification_codes::Column::UsedAt.is_null())
            .order_by_desc(verification_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest verification code")?;
        Ok(model.map(verification_code_from_model))
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), PortalError> {
        verification_codes::Entity::update_many()
            .col_expr(
                verification_codes::Column::Attempts,
                Expr::col(verification_codes::Column::Attempts).add(1),
            )
            .filter(verification_codes::Column::Id.eq(id))
            .filter(verification_codes::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("record failed verification attempt")?;
        Ok(())
    }

    async fn claim(&self, id: Uuid) -> Result<bool, PortalError> {
        let now = Utc::now();
        let claimed = verification_codes::Entity::update_many()
            .col_expr(verification_codes::Column::UsedAt, Expr::value(now))
            .filter(verification_codes::Column::Id.eq(id))
            .filter(verification_codes::Column::UsedAt.is_null())
            .filter(verification_codes::Column::Attempts.lt(MAX_VERIFICATION_ATTEMPTS))
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("claim verification code")?;
        Ok(claimed.rows_affected == 1)
    }
}

fn verification_code_from_model(model: verification_codes::Model) -> VerificationCode {
    VerificationCode {
        id: model.id,
        user_id: model.user_id,
        code: model.code,
        email: model.email,
        attempts: model.attempts,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}

// ── PasswordReset repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPasswordResetRepository {
    pub db: DatabaseConnection,
}

impl PasswordResetRepository for DbPasswordResetRepository {
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let token = token.clone();
                let event = event.clone();
                Box::pin(async move {
                    password_reset_tokens::ActiveModel {
                        id: Set(token.id),
                        user_id: Set(token.user_id),
                        token: Set(token.token),
                        expires_at: Set(token.expires_at),
                        used_at: Set(None),
                        created_at: Set(token.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create reset token with outbox")?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>, PortalError> {
        let model = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .one(&self.db)
            .await
            .context("find reset token")?;
        Ok(model.map(|m| PasswordResetToken {
            id: m.id,
            user_id: m.user_id,
            token: m.token,
            expires_at: m.expires_at,
            used_at: m.used_at,
            created_at: m.created_at,
        }))
    }

    async fn consume(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, PortalError> {
        let password_hash = password_hash.to_owned();
        let consumed = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let claimed = password_reset_tokens::Entity::update_many()
                        .col_expr(
                            password_reset_tokens::Column::UsedAt,
                            Expr::value(Utc::now()),
                        )
                        .filter(password_reset_tokens::Column::Id.eq(token_id))
                        .filter(password_reset_tokens::Column::UsedAt.is_null())
                        .exec(txn)
                        .await?;
                    if claimed.rows_affected == 0 {
                        return Ok(false);
                    }
                    users::ActiveModel {
                        id: Set(user_id),
                        password_hash: Set(Some(password_hash)),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(true)
                })
            })
            .await
            .context("consume reset token")?;
        Ok(consumed)
    }
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}
