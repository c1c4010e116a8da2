use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::lecture_file::LectureFile;
use crate::domain::repository::{
    AuditRepository, CourseRepository, LanguageModel, LectureFileRepository, StudyAidRepository,
    UserRepository,
};
use crate::domain::study_aid::{
    ASK_UNAVAILABLE, ChatExchange, DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT, Question,
    QuestionType, SavedQuestions, SavedSummary, SavedTotals, StudyAidRequest, UsageRecord,
    fallback_questions, fallback_summary, parse_questions,
};
use crate::domain::types::{Activity, ActivityKind, Actor};
use crate::error::PortalError;
use crate::usecase::lecture_file::readable_file;

const SUMMARY_SYSTEM: &str = "You summarize university lecture material for students. \
Answer in the language of the material, in a few short paragraphs.";
const QUESTIONS_SYSTEM: &str = "You write study questions about university lecture material. \
Answer with a JSON array only. Each element has the keys type, question, options (multiple \
choice only), answer and explanation.";
const ASK_SYSTEM: &str = "You answer student questions using only the given lecture material. \
Say so when the material does not contain the answer.";

const SUMMARY_MAX_TOKENS: u32 = 1024;
const QUESTIONS_MAX_TOKENS: u32 = 2048;
const ASK_MAX_TOKENS: u32 = 1024;

const RECENT_USAGE_LIMIT: u64 = 10;

#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub summary: String,
    pub cached: bool,
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
}

/// Request counts and saved output for one user. `today` starts at UTC midnight.
#[derive(Debug, Clone)]
pub struct UsageStats {
    pub quota: Quota,
    pub last_hour: u64,
    pub today: u64,
    pub totals: SavedTotals,
    pub recent: Vec<UsageRecord>,
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Summaries, quiz questions and Q&A over a lecture file's text.
pub struct StudyAidUseCase<C, U, F, S, M, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    S: StudyAidRepository,
    M: LanguageModel,
    A: AuditRepository,
{
    pub courses: C,
    pub users: U,
    pub files: F,
    pub aids: S,
    pub model: M,
    pub audit: A,
    /// Non-cached requests per user per rolling hour.
    pub rate_limit: u32,
}

fn required_text(text: &str) -> Result<&str, PortalError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PortalError::Validation("text is required".into()));
    }
    Ok(text)
}

impl<C, U, F, S, M, A> StudyAidUseCase<C, U, F, S, M, A>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
    S: StudyAidRepository,
    M: LanguageModel,
    A: AuditRepository,
{
    async fn file(&self, actor: &Actor, file_id: Uuid) -> Result<LectureFile, PortalError> {
        readable_file(&self.courses, &self.users, &self.files, actor, file_id).await
    }

    pub async fn quota(&self, user_id: Uuid) -> Result<Quota, PortalError> {
        let used = self
            .aids
            .count_uncached_since(user_id, Utc::now() - Duration::hours(1))
            .await?;
        let used = u32::try_from(used).unwrap_or(u32::MAX);
        Ok(Quota {
            limit: self.rate_limit,
            remaining: self.rate_limit.saturating_sub(used),
        })
    }

    pub async fn usage(&self, user_id: Uuid) -> Result<UsageStats, PortalError> {
        let now = Utc::now();
        let last_hour = self
            .aids
            .count_usage_since(user_id, now - Duration::hours(1))
            .await?;
        let today = self
            .aids
            .count_usage_since(user_id, start_of_day(now))
            .await?;
        Ok(UsageStats {
            quota: self.quota(user_id).await?,
            last_hour,
            today,
            totals: self.aids.saved_totals(user_id).await?,
            recent: self.aids.recent_usage(user_id, RECENT_USAGE_LIMIT).await?,
        })
    }

    async fn check_rate(&self, user_id: Uuid) -> Result<(), PortalError> {
        if self.quota(user_id).await?.remaining == 0 {
            return Err(PortalError::RateLimited);
        }
        Ok(())
    }

    async fn log(
        &self,
        user_id: Uuid,
        request: StudyAidRequest,
        file_id: Uuid,
        was_cached: bool,
        error: Option<&PortalError>,
    ) -> Result<(), PortalError> {
        self.aids
            .log_usage(&UsageRecord {
                id: Uuid::now_v7(),
                user_id,
                request,
                file_id: Some(file_id),
                was_cached,
                success: error.is_none(),
                error_message: error.map(|e| format!("{e:#}")),
                created_at: Utc::now(),
            })
            .await
    }

    // ── Summary ──

    pub async fn summary(
        &self,
        actor: &Actor,
        file_id: Uuid,
        text: &str,
        refresh: bool,
    ) -> Result<SummaryOutput, PortalError> {
        let file = self.file(actor, file_id).await?;

        if !refresh {
            if let Some(saved) = self.aids.find_summary(file.id, actor.user_id).await? {
                self.log(actor.user_id, StudyAidRequest::Summary, file.id, true, None)
                    .await?;
                return Ok(SummaryOutput {
                    summary: saved.text,
                    cached: true,
                    model_used: saved.model_used,
                });
            }
        }

        let text = required_text(text)?;
        self.check_rate(actor.user_id).await?;

        let prompt = format!("Summarize the following material titled \"{}\":\n\n{text}", file.title);
        let (summary, model_used, failure) = match self
            .model
            .complete(SUMMARY_SYSTEM, &prompt, SUMMARY_MAX_TOKENS)
            .await
        {
            Ok(answer) => (answer, self.model.model_name().map(str::to_owned), None),
            Err(e) => {
                warn!(file_id = %file.id, error = %e, "summary falling back to local extract");
                (fallback_summary(text), None, Some(e))
            }
        };

        self.aids
            .save_summary(&SavedSummary {
                file_id: file.id,
                user_id: actor.user_id,
                text: summary.clone(),
                model_used: model_used.clone(),
                created_at: Utc::now(),
            })
            .await?;
        self.log(
            actor.user_id,
            StudyAidRequest::Summary,
            file.id,
            false,
            failure.as_ref(),
        )
        .await?;
        self.audit
            .record_activity(
                &Activity::new(
                    actor.user_id,
                    ActivityKind::AiSummary,
                    format!("Summarized {}", file.title),
                )
                .with_file(file.id),
            )
            .await?;

        Ok(SummaryOutput {
            summary,
            cached: false,
            model_used,
        })
    }

    // ── Questions ──

    pub async fn questions(
        &self,
        actor: &Actor,
        file_id: Uuid,
        text: &str,
        question_type: QuestionType,
        count: Option<u32>,
    ) -> Result<Vec<Question>, PortalError> {
        let count = count.unwrap_or(DEFAULT_QUESTION_COUNT);
        if !(1..=MAX_QUESTION_COUNT).contains(&count) {
            return Err(PortalError::Validation(format!(
                "count must be between 1 and {MAX_QUESTION_COUNT}"
            )));
        }
        let file = self.file(actor, file_id).await?;
        let text = required_text(text)?;
        self.check_rate(actor.user_id).await?;

        let prompt = format!(
            "Write {count} questions of type {} about the following material:\n\n{text}",
            question_type.as_str()
        );
        let answer = self
            .model
            .complete(QUESTIONS_SYSTEM, &prompt, QUESTIONS_MAX_TOKENS)
            .await;
        let (questions, model_used, failure) = match answer {
            Ok(raw) => match parse_questions(&raw) {
                Some(questions) => (questions, self.model.model_name().map(str::to_owned), None),
                None => {
                    warn!(file_id = %file.id, "model answer is not a question list");
                    (
                        fallback_questions(),
                        None,
                        Some(PortalError::Validation("unparseable question list".into())),
                    )
                }
            },
            Err(e) => {
                warn!(file_id = %file.id, error = %e, "questions falling back to placeholder");
                (fallback_questions(), None, Some(e))
            }
        };

        self.aids
            .save_questions(&SavedQuestions {
                id: Uuid::now_v7(),
                file_id: file.id,
                user_id: actor.user_id,
                question_type,
                questions: questions.clone(),
                model_used,
                created_at: Utc::now(),
            })
            .await?;
        self.log(
            actor.user_id,
            StudyAidRequest::Questions,
            file.id,
            false,
            failure.as_ref(),
        )
        .await?;
        self.audit
            .record_activity(
                &Activity::new(
                    actor.user_id,
                    ActivityKind::AiQuestions,
                    format!("Generated {} questions for {}", questions.len(), file.title),
                )
                .with_file(file.id),
            )
            .await?;

        Ok(questions)
    }

    /// Earlier question sets for the file, newest first.
    pub async fn question_history(
        &self,
        actor: &Actor,
        file_id: Uuid,
    ) -> Result<Vec<SavedQuestions>, PortalError> {
        let file = self.file(actor, file_id).await?;
        self.aids.list_questions(file.id, actor.user_id).await
    }

    // ── Ask ──

    /// The actor's chat history for the file, oldest first.
    pub async fn chat_history(
        &self,
        actor: &Actor,
        file_id: Uuid,
    ) -> Result<Vec<ChatExchange>, PortalError> {
        let file = self.file(actor, file_id).await?;
        self.aids.list_chats(file.id, actor.user_id).await
    }

    pub async fn clear_chat_history(
        &self,
        actor: &Actor,
        file_id: Uuid,
    ) -> Result<u64, PortalError> {
        let file = self.file(actor, file_id).await?;
        let removed = self.aids.clear_chats(file.id, actor.user_id).await?;
        info!(file_id = %file.id, user_id = %actor.user_id, removed, "chat history cleared");
        Ok(removed)
    }

    pub async fn ask(
        &self,
        actor: &Actor,
        file_id: Uuid,
        text: &str,
        question: &str,
    ) -> Result<String, PortalError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PortalError::Validation("question is required".into()));
        }
        let file = self.file(actor, file_id).await?;
        let text = required_text(text)?;
        self.check_rate(actor.user_id).await?;

        let prompt = format!("Material:\n{text}\n\nQuestion: {question}");
        let (answer, failure) = match self.model.complete(ASK_SYSTEM, &prompt, ASK_MAX_TOKENS).await
        {
            Ok(answer) => (answer, None),
            Err(e) => {
                warn!(file_id = %file.id, error = %e, "study assistant unavailable");
                (ASK_UNAVAILABLE.to_owned(), Some(e))
            }
        };

        self.aids
            .save_chat(&ChatExchange {
                id: Uuid::now_v7(),
                file_id: file.id,
                user_id: actor.user_id,
                question: question.to_owned(),
                answer: answer.clone(),
                created_at: Utc::now(),
            })
            .await?;
        self.log(
            actor.user_id,
            StudyAidRequest::Ask,
            file.id,
            false,
            failure.as_ref(),
        )
        .await?;
        Ok(answer)
    }
}
