use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, sea_query::Expr,
};
use uuid::Uuid;

use sacm_core::sea_ext::OffsetPage;
use sacm_domain::pagination::{Page, PageRequest};
use sacm_portal_schema::{notification_recipients, notifications};

use crate::domain::repository::NotificationRepository;
use crate::domain::types::InboxItem;
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbNotificationRepository {
    pub db: DatabaseConnection,
}

fn visible_to(user_id: Uuid) -> Select<notification_recipients::Entity> {
    notification_recipients::Entity::find()
        .filter(notification_recipients::Column::UserId.eq(user_id))
        .filter(notification_recipients::Column::DeletedAt.is_null())
}

impl NotificationRepository for DbNotificationRepository {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<InboxItem>, PortalError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut query = visible_to(user_id);
        if unread_only {
            query = query.filter(notification_recipients::Column::IsRead.eq(false));
        }
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count notifications")?;
        let rows = query
            .find_also_related(notifications::Entity)
            .order_by_desc(notifications::Column::CreatedAt)
            .offset_page(per_page, page)
            .all(&self.db)
            .await
            .context("list notifications")?;

        let items = rows
            .into_iter()
            .filter_map(|(recipient, notification)| {
                let n = notification?;
                Some(InboxItem {
                    notification_id: n.id,
                    user_id: recipient.user_id,
                    sender_id: n.sender_id,
                    title: n.title,
                    body: n.body,
                    notification_type: n.notification_type,
                    course_id: n.course_id,
                    file_id: n.file_id,
                    is_read: recipient.is_read,
                    read_at: recipient.read_at,
                    created_at: n.created_at,
                })
            })
            .collect();

        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, PortalError> {
        let count = visible_to(user_id)
            .filter(notification_recipients::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .context("count unread notifications")?;
        Ok(count)
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError> {
        let Some(recipient) = visible_to(user_id)
            .filter(notification_recipients::Column::NotificationId.eq(notification_id))
            .one(&self.db)
            .await
            .context("find notification recipient")?
        else {
            return Ok(false);
        };
        if recipient.is_read {
            return Ok(true);
        }
        notification_recipients::Entity::update_many()
            .col_expr(notification_recipients::Column::IsRead, Expr::value(true))
            .col_expr(notification_recipients::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notification_recipients::Column::Id.eq(recipient.id))
            .exec(&self.db)
            .await
            .context("mark notification read")?;
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, PortalError> {
        let result = notification_recipients::Entity::update_many()
            .col_expr(notification_recipients::Column::IsRead, Expr::value(true))
            .col_expr(notification_recipients::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notification_recipients::Column::UserId.eq(user_id))
            .filter(notification_recipients::Column::DeletedAt.is_null())
            .filter(notification_recipients::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .context("mark all notifications read")?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError> {
        let result = notification_recipients::Entity::update_many()
            .col_expr(
                notification_recipients::Column::DeletedAt,
                Expr::value(Utc::now()),
            )
            .filter(notification_recipients::Column::UserId.eq(user_id))
            .filter(notification_recipients::Column::NotificationId.eq(notification_id))
            .filter(notification_recipients::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .context("delete notification")?;
        Ok(result.rows_affected > 0)
    }
}
