use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::OnConflict,
};
use uuid::Uuid;

use sacm_portal_schema::{ai_chats, ai_questions, ai_summaries, ai_usage_logs};

use crate::domain::repository::StudyAidRepository;
use crate::domain::study_aid::{
    ChatExchange, QuestionType, SavedQuestions, SavedSummary, SavedTotals, StudyAidRequest,
    UsageRecord,
};
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbStudyAidRepository {
    pub db: DatabaseConnection,
}

impl StudyAidRepository for DbStudyAidRepository {
    async fn find_summary(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SavedSummary>, PortalError> {
        let model = ai_summaries::Entity::find()
            .filter(ai_summaries::Column::FileId.eq(file_id))
            .filter(ai_summaries::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find summary")?;
        Ok(model.map(|m| SavedSummary {
            file_id: m.file_id,
            user_id: m.user_id,
            text: m.summary_text,
            model_used: m.model_used,
            created_at: m.created_at,
        }))
    }

    async fn save_summary(&self, summary: &SavedSummary) -> Result<(), PortalError> {
        let model = ai_summaries::ActiveModel {
            id: Set(Uuid::now_v7()),
            file_id: Set(summary.file_id),
            user_id: Set(summary.user_id),
            summary_text: Set(summary.text.clone()),
            model_used: Set(summary.model_used.clone()),
            created_at: Set(summary.created_at),
        };
        ai_summaries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([ai_summaries::Column::FileId, ai_summaries::Column::UserId])
                    .update_columns([
                        ai_summaries::Column::SummaryText,
                        ai_summaries::Column::ModelUsed,
                        ai_summaries::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert summary")?;
        Ok(())
    }

    async fn save_questions(&self, questions: &SavedQuestions) -> Result<(), PortalError> {
        let payload =
            serde_json::to_value(&questions.questions).context("serialize questions")?;
        ai_questions::ActiveModel {
            id: Set(questions.id),
            file_id: Set(questions.file_id),
            user_id: Set(questions.user_id),
            question_type: Set(questions.question_type.as_str().to_owned()),
            questions: Set(payload),
            model_used: Set(questions.model_used.clone()),
            created_at: Set(questions.created_at),
        }
        .insert(&self.db)
        .await
        .context("save questions")?;
        Ok(())
    }

    async fn list_questions(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<SavedQuestions>, PortalError> {
        let models = ai_questions::Entity::find()
            .filter(ai_questions::Column::FileId.eq(file_id))
            .filter(ai_questions::Column::UserId.eq(user_id))
            .order_by_desc(ai_questions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list questions")?;
        Ok(models.into_iter().filter_map(questions_from_model).collect())
    }

    async fn save_chat(&self, exchange: &ChatExchange) -> Result<(), PortalError> {
        ai_chats::ActiveModel {
            id: Set(exchange.id),
            file_id: Set(exchange.file_id),
            user_id: Set(exchange.user_id),
            question: Set(exchange.question.clone()),
            answer: Set(exchange.answer.clone()),
            created_at: Set(exchange.created_at),
        }
        .insert(&self.db)
        .await
        .context("save chat exchange")?;
        Ok(())
    }

    async fn list_chats(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ChatExchange>, PortalError> {
        let models = ai_chats::Entity::find()
            .filter(ai_chats::Column::FileId.eq(file_id))
            .filter(ai_chats::Column::UserId.eq(user_id))
            .order_by_asc(ai_chats::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list chat history")?;
        Ok(models
            .into_iter()
            .map(|m| ChatExchange {
                id: m.id,
                file_id: m.file_id,
                user_id: m.user_id,
                question: m.question,
                answer: m.answer,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn clear_chats(&self, file_id: Uuid, user_id: Uuid) -> Result<u64, PortalError> {
        let result = ai_chats::Entity::delete_many()
            .filter(ai_chats::Column::FileId.eq(file_id))
            .filter(ai_chats::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("clear chat history")?;
        Ok(result.rows_affected)
    }

    async fn saved_totals(&self, user_id: Uuid) -> Result<SavedTotals, PortalError> {
        let summaries = ai_summaries::Entity::find()
            .filter(ai_summaries::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count summaries")?;
        let questions = ai_questions::Entity::find()
            .filter(ai_questions::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count question sets")?;
        let chats = ai_chats::Entity::find()
            .filter(ai_chats::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count chat exchanges")?;
        Ok(SavedTotals {
            summaries,
            questions,
            chats,
        })
    }

    async fn count_usage_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError> {
        let count = ai_usage_logs::Entity::find()
            .filter(ai_usage_logs::Column::UserId.eq(user_id))
            .filter(ai_usage_logs::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count study aid requests")?;
        Ok(count)
    }

    async fn count_uncached_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError> {
        let count = ai_usage_logs::Entity::find()
            .filter(ai_usage_logs::Column::UserId.eq(user_id))
            .filter(ai_usage_logs::Column::WasCached.eq(false))
            .filter(ai_usage_logs::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count study aid usage")?;
        Ok(count)
    }

    async fn log_usage(&self, record: &UsageRecord) -> Result<(), PortalError> {
        ai_usage_logs::ActiveModel {
            id: Set(record.id),
            user_id: Set(record.user_id),
            request_type: Set(record.request.as_str().to_owned()),
            file_id: Set(record.file_id),
            was_cached: Set(record.was_cached),
            success: Set(record.success),
            error_message: Set(record.error_message.clone()),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("log study aid usage")?;
        Ok(())
    }

    async fn recent_usage(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<UsageRecord>, PortalError> {
        let models = ai_usage_logs::Entity::find()
            .filter(ai_usage_logs::Column::UserId.eq(user_id))
            .order_by_desc(ai_usage_logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recent study aid usage")?;
        Ok(models.into_iter().filter_map(usage_from_model).collect())
    }
}

// Rows whose stored payload or type this build can't read are skipped.
fn questions_from_model(model: ai_questions::Model) -> Option<SavedQuestions> {
    Some(SavedQuestions {
        id: model.id,
        file_id: model.file_id,
        user_id: model.user_id,
        question_type: QuestionType::from_str_opt(&model.question_type)?,
        questions: serde_json::from_value(model.questions).ok()?,
        model_used: model.model_used,
        created_at: model.created_at,
    })
}

fn usage_from_model(model: ai_usage_logs::Model) -> Option<UsageRecord> {
    Some(UsageRecord {
        id: model.id,
        user_id: model.user_id,
        request: StudyAidRequest::from_str_opt(&model.request_type)?,
        file_id: model.file_id,
        was_cached: model.was_cached,
        success: model.success,
        error_message: model.error_message,
        created_at: model.created_at,
    })
}
