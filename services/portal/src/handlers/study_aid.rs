use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sacm_auth_types::identity::IdentityHeaders;

use crate::domain::study_aid::{
    ChatExchange, Question, QuestionType, SavedQuestions, StudyAidRequest, UsageRecord,
};
use crate::error::PortalError;
use crate::handlers::require_user;
use crate::infra::db::{
    DbAuditRepository, DbCourseRepository, DbLectureFileRepository, DbStudyAidRepository,
    DbUserRepository,
};
use crate::infra::language_model::HttpLanguageModel;
use crate::state::AppState;
use crate::usecase::study_aid::StudyAidUseCase;

type PortalStudyAid = StudyAidUseCase<
    DbCourseRepository,
    DbUserRepository,
    DbLectureFileRepository,
    DbStudyAidRepository,
    HttpLanguageModel,
    DbAuditRepository,
>;

fn study_aid(state: &AppState) -> PortalStudyAid {
    StudyAidUseCase {
        courses: state.course_repo(),
        users: state.user_repo(),
        files: state.lecture_file_repo(),
        aids: state.study_aid_repo(),
        model: state.language_model.clone(),
        audit: state.audit_repo(),
        rate_limit: state.ai_rate_limit_per_hour,
    }
}

// ── POST /files/{id}/summary ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub text: String,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub cached: bool,
    pub model_used: Option<String>,
}

pub async fn summarize(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    Json(body): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, PortalError> {
    let actor = require_user(&identity);
    let out = study_aid(&state)
        .summary(&actor, file_id, &body.text, body.refresh)
        .await?;
    Ok(Json(SummaryResponse {
        summary: out.summary,
        cached: out.cached,
        model_used: out.model_used,
    }))
}

// ── POST /files/{id}/questions ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct QuestionsRequest {
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    pub count: Option<u32>,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

pub async fn generate_questions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    Json(body): Json<QuestionsRequest>,
) -> Result<Json<QuestionsResponse>, PortalError> {
    let actor = require_user(&identity);
    let questions = study_aid(&state)
        .questions(&actor, file_id, &body.text, body.question_type, body.count)
        .await?;
    Ok(Json(QuestionsResponse { questions }))
}

// ── GET /files/{id}/questions ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct QuestionSetResponse {
    pub id: Uuid,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
    pub model_used: Option<String>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SavedQuestions> for QuestionSetResponse {
    fn from(set: SavedQuestions) -> Self {
        Self {
            id: set.id,
            question_type: set.question_type,
            questions: set.questions,
            model_used: set.model_used,
            created_at: set.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct QuestionHistoryResponse {
    pub question_sets: Vec<QuestionSetResponse>,
}

pub async fn question_history(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<QuestionHistoryResponse>, PortalError> {
    let actor = require_user(&identity);
    let sets = study_aid(&state).question_history(&actor, file_id).await?;
    Ok(Json(QuestionHistoryResponse {
        question_sets: sets.into_iter().map(Into::into).collect(),
    }))
}

// ── POST /files/{id}/ask ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AskRequest {
    pub text: String,
    pub question: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
}

pub async fn ask(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    Json(body): Json<AskRequest>,
) -> Result<Json<AskResponse>, PortalError> {
    let actor = require_user(&identity);
    let answer = study_aid(&state)
        .ask(&actor, file_id, &body.text, &body.question)
        .await?;
    Ok(Json(AskResponse { answer }))
}

// ── GET /files/{id}/ask ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ChatExchangeResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ChatExchange> for ChatExchangeResponse {
    fn from(exchange: ChatExchange) -> Self {
        Self {
            id: exchange.id,
            question: exchange.question,
            answer: exchange.answer,
            created_at: exchange.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub exchanges: Vec<ChatExchangeResponse>,
}

pub async fn chat_history(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ChatHistoryResponse>, PortalError> {
    let actor = require_user(&identity);
    let exchanges = study_aid(&state).chat_history(&actor, file_id).await?;
    Ok(Json(ChatHistoryResponse {
        exchanges: exchanges.into_iter().map(Into::into).collect(),
    }))
}

// ── DELETE /files/{id}/ask ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ClearChatResponse {
    pub removed: u64,
}

pub async fn clear_chat_history(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ClearChatResponse>, PortalError> {
    let actor = require_user(&identity);
    let removed = study_aid(&state).clear_chat_history(&actor, file_id).await?;
    Ok(Json(ClearChatResponse { removed }))
}

// ── GET /users/@me/study-aid/quota ───────────────────────────────────────────

#[derive(Serialize)]
pub struct QuotaResponse {
    pub limit: u32,
    pub remaining: u32,
}

pub async fn get_quota(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<QuotaResponse>, PortalError> {
    let quota = study_aid(&state).quota(identity.user_id).await?;
    Ok(Json(QuotaResponse {
        limit: quota.limit,
        remaining: quota.remaining,
    }))
}

// ── GET /users/@me/study-aid/usage ───────────────────────────────────────────

#[derive(Serialize)]
pub struct UsageRecordResponse {
    pub request_type: StudyAidRequest,
    pub file_id: Option<Uuid>,
    pub was_cached: bool,
    pub success: bool,
    pub error_message: Option<String>,
    #[serde(serialize_with = "sacm_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UsageRecord> for UsageRecordResponse {
    fn from(record: UsageRecord) -> Self {
        Self {
            request_type: record.request,
            file_id: record.file_id,
            was_cached: record.was_cached,
            success: record.success,
            error_message: record.error_message,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct UsageResponse {
    pub rate_limit: u32,
    pub remaining: u32,
    pub last_hour: u64,
    pub today: u64,
    pub total_summaries: u64,
    pub total_question_sets: u64,
    pub total_chats: u64,
    pub recent: Vec<UsageRecordResponse>,
}

pub async fn get_usage(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UsageResponse>, PortalError> {
    let stats = study_aid(&state).usage(identity.user_id).await?;
    Ok(Json(UsageResponse {
        rate_limit: stats.quota.limit,
        remaining: stats.quota.remaining,
        last_hour: stats.last_hour,
        today: stats.today,
        total_summaries: stats.totals.summaries,
        total_question_sets: stats.totals.questions,
        total_chats: stats.totals.chats,
        recent: stats.recent.into_iter().map(Into::into).collect(),
    }))
}
