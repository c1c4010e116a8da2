use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::domain::academic::{Level, is_valid_promotion};
use crate::domain::repository::{AuditRepository, LevelRepository, MajorRepository, UserRepository};
use crate::domain::types::{AuditAction, AuditEntry};
use crate::error::PortalError;

#[derive(Debug)]
pub struct PromotionResult {
    pub from_level: Level,
    pub to_level: Level,
    pub promoted: u64,
}

pub struct PromoteStudentsUseCase<U, L, M, A>
where
    U: UserRepository,
    L: LevelRepository,
    M: MajorRepository,
    A: AuditRepository,
{
    pub users: U,
    pub levels: L,
    pub majors: M,
    pub audit: A,
}

impl<U, L, M, A> PromoteStudentsUseCase<U, L, M, A>
where
    U: UserRepository,
    L: LevelRepository,
    M: MajorRepository,
    A: AuditRepository,
{
    /// Move active students at `from` (optionally one major) to `to`. `to` must rank higher.
    pub async fn execute(
        &self,
        actor: Uuid,
        from_level_id: Uuid,
        to_level_id: Uuid,
        major_id: Option<Uuid>,
    ) -> Result<PromotionResult, PortalError> {
        let from_level = self
            .levels
            .find_by_id(from_level_id)
            .await?
            .ok_or(PortalError::LevelNotFound)?;
        let to_level = self
            .levels
            .find_by_id(to_level_id)
            .await?
            .ok_or(PortalError::LevelNotFound)?;
        self.promote(actor, from_level, to_level, major_id).await
    }

    /// Promote to the level ranked exactly one above `from`.
    pub async fn next(
        &self,
        actor: Uuid,
        from_level_id: Uuid,
        major_id: Option<Uuid>,
    ) -> Result<PromotionResult, PortalError> {
        let from_level = self
            .levels
            .find_by_id(from_level_id)
            .await?
            .ok_or(PortalError::LevelNotFound)?;
        let to_level = self
            .levels
            .find_by_number(from_level.number + 1)
            .await?
            .ok_or(PortalError::NoNextLevel)?;
        self.promote(actor, from_level, to_level, major_id).await
    }

    async fn promote(
        &self,
        actor: Uuid,
        from_level: Level,
        to_level: Level,
        major_id: Option<Uuid>,
    ) -> Result<PromotionResult, PortalError> {
        if !is_valid_promotion(&from_level, &to_level) {
            return Err(PortalError::InvalidPromotion);
        }
        let major_name = match major_id {
            Some(id) => Some(
                self.majors
                    .find_by_id(id)
                    .await?
                    .ok_or(PortalError::MajorNotFound)?
                    .name,
            ),
            None => None,
        };

        let promoted = self
            .users
            .promote(from_level.id, to_level.id, major_id)
            .await?;

        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Promote, "User").changes(
                    serde_json::json!({
                        "from_level": from_level.name,
                        "to_level": to_level.name,
                        "major": major_name.as_deref().unwrap_or("all"),
                        "count": promoted,
                    }),
                ),
            )
            .await?;

        info!(
            from = %from_level.name,
            to = %to_level.name,
            promoted,
            "students promoted"
        );
        Ok(PromotionResult {
            from_level,
            to_level,
            promoted,
        })
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LevelStats {
    pub level: Level,
    pub active_students: u64,
    pub next_level: Option<String>,
}

pub struct PromotionStatsUseCase<U: UserRepository, L: LevelRepository> {
    pub users: U,
    pub levels: L,
}

impl<U: UserRepository, L: LevelRepository> PromotionStatsUseCase<U, L> {
    pub async fn execute(&self) -> Result<Vec<LevelStats>, PortalError> {
        let levels = self.levels.list().await?;
        let counts: HashMap<Uuid, u64> = self
            .users
            .count_active_students_by_level()
            .await?
            .into_iter()
            .collect();
        let by_rank: HashMap<i32, String> =
            levels.iter().map(|l| (l.number, l.name.clone())).collect();

        Ok(levels
            .into_iter()
            .map(|level| LevelStats {
                active_students: counts.get(&level.id).copied().unwrap_or(0),
                next_level: by_rank.get(&(level.number + 1)).cloned(),
                level,
            })
            .collect())
    }
}
