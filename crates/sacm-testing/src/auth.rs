//! Mock auth helpers for tests.
//!
//! Services behind the gateway receive `x-sacm-user-id` + `x-sacm-user-role` headers
//! injected by the gateway. `MockAuth` builds those headers directly so no gateway or JWT is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use sacm_auth_types::identity::{X_SACM_USER_ID, X_SACM_USER_ROLE};
use sacm_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Admin)
    }

    pub fn instructor() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Instructor)
    }

    pub fn student() -> Self {
        Self::new(Uuid::new_v4(), UserRole::Student)
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_SACM_USER_ID),
            HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_SACM_USER_ROLE),
            HeaderValue::from(u16::from(self.user_role.as_u8())),
        );
        map
    }
}
