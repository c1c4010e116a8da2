use uuid::Uuid;

use sacm_domain::pagination::PageRequest;

use sacm_portal::error::PortalError;
use sacm_portal::usecase::notification::InboxUseCase;

use crate::helpers::{MockNotificationRepo, test_inbox_item};

#[tokio::test]
async fn should_list_unread_only_when_asked() {
    let me = Uuid::new_v4();
    let usecase = InboxUseCase {
        notifications: MockNotificationRepo::new(vec![
            test_inbox_item(me, false),
            test_inbox_item(me, true),
            test_inbox_item(Uuid::new_v4(), false),
        ]),
    };

    let all = usecase.list(me, false, PageRequest::default()).await.unwrap();
    assert_eq!(all.total, 2);

    let unread = usecase.list(me, true, PageRequest::default()).await.unwrap();
    assert_eq!(unread.total, 1);
    assert!(!unread.items[0].is_read);

    assert_eq!(usecase.unread_count(me).await.unwrap(), 1);
}

#[tokio::test]
async fn should_mark_single_and_all_notifications_read() {
    let me = Uuid::new_v4();
    let first = test_inbox_item(me, false);
    let usecase = InboxUseCase {
        notifications: MockNotificationRepo::new(vec![
            first.clone(),
            test_inbox_item(me, false),
            test_inbox_item(me, false),
        ]),
    };

    usecase.mark_read(me, first.notification_id).await.unwrap();
    assert_eq!(usecase.unread_count(me).await.unwrap(), 2);

    assert_eq!(usecase.mark_all_read(me).await.unwrap(), 2);
    assert_eq!(usecase.unread_count(me).await.unwrap(), 0);
    assert_eq!(usecase.mark_all_read(me).await.unwrap(), 0);
}

#[tokio::test]
async fn should_not_touch_someone_elses_notification() {
    let owner = Uuid::new_v4();
    let item = test_inbox_item(owner, false);
    let notifications = MockNotificationRepo::new(vec![item.clone()]);
    let usecase = InboxUseCase {
        notifications: notifications.clone(),
    };
    let me = Uuid::new_v4();

    let result = usecase.mark_read(me, item.notification_id).await;
    assert!(
        matches!(result, Err(PortalError::NotificationNotFound)),
        "expected NotificationNotFound, got {result:?}"
    );

    let result = usecase.delete(me, item.notification_id).await;
    assert!(
        matches!(result, Err(PortalError::NotificationNotFound)),
        "expected NotificationNotFound, got {result:?}"
    );
    assert!(!notifications.items_handle().lock().unwrap()[0].is_read);
}

#[tokio::test]
async fn should_hide_deleted_notification() {
    let me = Uuid::new_v4();
    let item = test_inbox_item(me, false);
    let usecase = InboxUseCase {
        notifications: MockNotificationRepo::new(vec![item.clone()]),
    };

    usecase.delete(me, item.notification_id).await.unwrap();

    assert_eq!(usecase.unread_count(me).await.unwrap(), 0);
    assert_eq!(
        usecase.list(me, false, PageRequest::default()).await.unwrap().total,
        0
    );
}
