use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use sacm_auth_types::cookie::ACTIVATION_SESSION_EXP;

use crate::domain::repository::ActivationStore;
use crate::domain::types::ActivationSession;
use crate::error::PortalError;

#[derive(Clone)]
pub struct RedisActivationStore {
    pub pool: Pool,
}

fn session_key(session_id: &str) -> String {
    format!("activation:{session_id}")
}

impl ActivationStore for RedisActivationStore {
    async fn save(
        &self,
        session_id: &str,
        session: &ActivationSession,
    ) -> Result<(), PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let bytes = serde_json::to_vec(session).context("serialize activation session")?;
        let (): () = conn
            .set_ex(session_key(session_id), bytes, ACTIVATION_SESSION_EXP)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| PortalError::Internal(e.into()))?;
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<ActivationSession>, PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let value: Option<Vec<u8>> = conn
            .get(session_key(session_id))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| PortalError::Internal(e.into()))?;
        // A corrupt entry is treated as no session; the client restarts at step 1.
        Ok(value.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
    }

    async fn clear(&self, session_id: &str) -> Result<(), PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let (): () = conn
            .del(session_key(session_id))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| PortalError::Internal(e.into()))?;
        Ok(())
    }
}
