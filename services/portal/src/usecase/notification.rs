use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::NotificationRepository;
use crate::domain::types::InboxItem;
use crate::error::PortalError;

/// Recipient-side inbox. Every operation is scoped to `user_id`.
pub struct InboxUseCase<N: NotificationRepository> {
    pub notifications: N,
}

impl<N: NotificationRepository> InboxUseCase<N> {
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<InboxItem>, PortalError> {
        self.notifications.list(user_id, unread_only, page).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, PortalError> {
        self.notifications.unread_count(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), PortalError> {
        if !self.notifications.mark_read(user_id, notification_id).await? {
            return Err(PortalError::NotificationNotFound);
        }
        Ok(())
    }

    /// Returns how many notifications changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, PortalError> {
        self.notifications.mark_all_read(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), PortalError> {
        if !self.notifications.delete(user_id, notification_id).await? {
            return Err(PortalError::NotificationNotFound);
        }
        Ok(())
    }
}
