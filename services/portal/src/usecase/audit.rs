use sacm_domain::pagination::{Page, PageRequest};

use crate::domain::repository::AuditRepository;
use crate::domain::types::{AuditAction, AuditEntry};
use crate::error::PortalError;

pub struct ListAuditLogUseCase<A: AuditRepository> {
    pub audit: A,
}

impl<A: AuditRepository> ListAuditLogUseCase<A> {
    pub async fn execute(
        &self,
        action: Option<AuditAction>,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PortalError> {
        self.audit.list_audit(action, page).await
    }
}
