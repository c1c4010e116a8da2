use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use sacm_core::sea_ext::OffsetPage;
use sacm_domain::pagination::{Page, PageRequest};
use sacm_portal_schema::{audit_logs, user_activities};

use crate::domain::repository::AuditRepository;
use crate::domain::types::{Activity, ActivityKind, AuditAction, AuditEntry};
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbAuditRepository {
    pub db: DatabaseConnection,
}

impl AuditRepository for DbAuditRepository {
    async fn record_audit(&self, entry: &AuditEntry) -> Result<(), PortalError> {
        audit_logs::ActiveModel {
            id: Set(entry.id),
            user_id: Set(entry.user_id),
            action: Set(entry.action.as_str().to_owned()),
            model_name: Set(entry.model_name.clone()),
            object_id: Set(entry.object_id.clone()),
            object_repr: Set(entry.object_repr.clone()),
            changes: Set(entry.changes.clone()),
            created_at: Set(entry.created_at),
        }
        .insert(&self.db)
        .await
        .context("record audit entry")?;
        Ok(())
    }

    async fn record_activity(&self, activity: &Activity) -> Result<(), PortalError> {
        user_activities::ActiveModel {
            id: Set(activity.id),
            user_id: Set(activity.user_id),
            activity_type: Set(activity.kind.as_str().to_owned()),
            description: Set(activity.description.clone()),
            file_id: Set(activity.file_id),
            created_at: Set(activity.created_at),
        }
        .insert(&self.db)
        .await
        .context("record user activity")?;
        Ok(())
    }

    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PortalError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut query = audit_logs::Entity::find();
        if let Some(action) = action {
            query = query.filter(audit_logs::Column::Action.eq(action.as_str()));
        }
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count audit entries")?;
        let models = query
            .order_by_desc(audit_logs::Column::CreatedAt)
            .offset_page(per_page, page)
            .all(&self.db)
            .await
            .context("list audit entries")?;
        Ok(Page {
            items: models.into_iter().filter_map(audit_from_model).collect(),
            total,
            page,
            per_page,
        })
    }

    async fn list_activities(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Activity>, PortalError> {
        let PageRequest { per_page, page } = page.clamped();
        let query =
            user_activities::Entity::find().filter(user_activities::Column::UserId.eq(user_id));
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count user activities")?;
        let models = query
            .order_by_desc(user_activities::Column::CreatedAt)
            .offset_page(per_page, page)
            .all(&self.db)
            .await
            .context("list user activities")?;
        Ok(Page {
            items: models.into_iter().filter_map(activity_from_model).collect(),
            total,
            page,
            per_page,
        })
    }

    async fn recent_activities(&self, limit: u64) -> Result<Vec<Activity>, PortalError> {
        let models = user_activities::Entity::find()
            .order_by_desc(user_activities::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent activities")?;
        Ok(models.into_iter().filter_map(activity_from_model).collect())
    }
}

// Rows with an action name this build doesn't know are skipped.
fn audit_from_model(model: audit_logs::Model) -> Option<AuditEntry> {
    Some(AuditEntry {
        id: model.id,
        user_id: model.user_id,
        action: AuditAction::from_str_opt(&model.action)?,
        model_name: model.model_name,
        object_id: model.object_id,
        object_repr: model.object_repr,
        changes: model.changes,
        created_at: model.created_at,
    })
}

fn activity_from_model(model: user_activities::Model) -> Option<Activity> {
    Some(Activity {
        id: model.id,
        user_id: model.user_id,
        kind: ActivityKind::from_str_opt(&model.activity_type)?,
        description: model.description,
        file_id: model.file_id,
        created_at: model.created_at,
    })
}
