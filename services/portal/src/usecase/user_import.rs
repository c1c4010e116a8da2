use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use sacm_domain::user::UserRole;

use crate::domain::repository::{AuditRepository, LevelRepository, MajorRepository, UserRepository};
use crate::domain::types::{AuditAction, AuditEntry, User};
use crate::error::PortalError;

/// One spreadsheet row. Missing optional columns read as empty.
#[derive(Debug, Deserialize)]
struct ImportRow {
    academic_id: String,
    id_card_number: String,
    full_name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    major: String,
    #[serde(default)]
    level: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: u64,
    /// `row N: reason`, N being the spreadsheet line number (header is line 1).
    pub errors: Vec<String>,
}

pub struct ImportUsersUseCase<U, M, L, A>
where
    U: UserRepository,
    M: MajorRepository,
    L: LevelRepository,
    A: AuditRepository,
{
    pub users: U,
    pub majors: M,
    pub levels: L,
    pub audit: A,
}

struct Lookup {
    majors: HashMap<String, Uuid>,
    levels: HashMap<String, Uuid>,
}

impl<U, M, L, A> ImportUsersUseCase<U, M, L, A>
where
    U: UserRepository,
    M: MajorRepository,
    L: LevelRepository,
    A: AuditRepository,
{
    pub async fn execute(&self, actor: Uuid, csv_text: &str) -> Result<ImportReport, PortalError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| PortalError::Validation(format!("unreadable CSV header: {e}")))?
            .clone();
        for column in ["academic_id", "id_card_number", "full_name"] {
            if !headers.iter().any(|h| h == column) {
                return Err(PortalError::Validation(format!(
                    "CSV header is missing column {column}"
                )));
            }
        }

        let lookup = Lookup {
            majors: self
                .majors
                .list(false)
                .await?
                .into_iter()
                .map(|m| (m.name.to_lowercase(), m.id))
                .collect(),
            levels: self
                .levels
                .list()
                .await?
                .into_iter()
                .map(|l| (l.name.to_lowercase(), l.id))
                .collect(),
        };

        let mut report = ImportReport::default();
        for record in reader.records() {
            // Physical line the record starts on; quoted fields may span lines.
            let line = match &record {
                Ok(record) => record.position(),
                Err(e) => e.position(),
            }
            .map_or(0, csv::Position::line);
            let outcome = match record.and_then(|r| r.deserialize::<ImportRow>(Some(&headers))) {
                Ok(row) => self.import_row(row, &lookup).await,
                Err(e) => Err(PortalError::Validation(e.to_string())),
            };
            match outcome {
                Ok(()) => report.created += 1,
                Err(PortalError::Internal(e)) => return Err(PortalError::Internal(e)),
                Err(e) => report.errors.push(format!("row {line}: {e}")),
            }
        }

        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Import, "User").changes(
                    serde_json::json!({
                        "created": report.created,
                        "errors": report.errors.len(),
                    }),
                ),
            )
            .await?;

        info!(
            created = report.created,
            errors = report.errors.len(),
            "user import finished"
        );
        Ok(report)
    }

    async fn import_row(&self, row: ImportRow, lookup: &Lookup) -> Result<(), PortalError> {
        if row.academic_id.is_empty() || row.id_card_number.is_empty() || row.full_name.is_empty()
        {
            return Err(PortalError::Validation(
                "academic_id, id_card_number and full_name are required".into(),
            ));
        }

        let role = if row.role.is_empty() {
            UserRole::Student
        } else {
            row.role
                .parse::<UserRole>()
                .map_err(|_| PortalError::Validation(format!("unknown role {}", row.role)))?
        };
        let major_id = if row.major.is_empty() {
            None
        } else {
            Some(
                *lookup
                    .majors
                    .get(&row.major.to_lowercase())
                    .ok_or_else(|| PortalError::Validation(format!("unknown major {}", row.major)))?,
            )
        };
        let level_id = if row.level.is_empty() {
            None
        } else {
            Some(
                *lookup
                    .levels
                    .get(&row.level.to_lowercase())
                    .ok_or_else(|| PortalError::Validation(format!("unknown level {}", row.level)))?,
            )
        };

        if self.users.find_by_academic_id(&row.academic_id).await?.is_some() {
            return Err(PortalError::AcademicIdTaken);
        }
        if self.users.id_card_taken(&row.id_card_number).await? {
            return Err(PortalError::IdCardTaken);
        }

        let user = User::new_inactive(
            row.academic_id,
            row.id_card_number,
            row.full_name,
            role,
            major_id,
            level_id,
        );
        self.users.create(&user).await
    }
}
