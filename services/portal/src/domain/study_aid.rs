use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Character budget for the local fallback summary.
pub const FALLBACK_SUMMARY_LEN: usize = 500;

/// Answer returned by `ask` when no language model is reachable.
pub const ASK_UNAVAILABLE: &str =
    "Sorry, the study assistant is currently unavailable. Please try again later.";

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
    ShortAnswer,
    #[default]
    Mixed,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
            Self::Mixed => "mixed",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(Self::Mcq),
            "true_false" => Some(Self::TrueFalse),
            "short_answer" => Some(Self::ShortAnswer),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// One generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyAidRequest {
    Summary,
    Questions,
    Ask,
}

impl StudyAidRequest {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Questions => "questions",
            Self::Ask => "ask",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(Self::Summary),
            "questions" => Some(Self::Questions),
            "ask" => Some(Self::Ask),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedSummary {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub model_used: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SavedQuestions {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
    pub model_used: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the usage log. Non-cached rows count toward the hourly quota.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request: StudyAidRequest,
    pub file_id: Option<Uuid>,
    pub was_cached: bool,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Saved study-aid output per kind for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedTotals {
    pub summaries: u64,
    pub questions: u64,
    pub chats: u64,
}

/// Naive summary: leading sentences while they fit, else a hard cut.
pub fn fallback_summary(text: &str) -> String {
    let mut summary = String::new();
    for sentence in text.split('.') {
        if summary.chars().count() + sentence.chars().count() >= FALLBACK_SUMMARY_LEN {
            break;
        }
        let trimmed = sentence.trim();
        if trimmed.is_empty() {
            continue;
        }
        summary.push_str(trimmed);
        summary.push_str(". ");
    }
    let summary = summary.trim_end();
    if summary.is_empty() {
        let head: String = text.chars().take(FALLBACK_SUMMARY_LEN).collect();
        format!("{head}...")
    } else {
        summary.to_owned()
    }
}

/// Placeholder quiz when generation is unavailable.
pub fn fallback_questions() -> Vec<Question> {
    vec![Question {
        kind: QuestionType::ShortAnswer.as_str().to_owned(),
        question: "What is the main idea of this text?".to_owned(),
        options: None,
        answer: "Review the text to answer.".to_owned(),
        explanation: Some("Automatically generated question.".to_owned()),
    }]
}

/// Strip a surrounding markdown code fence (```json ... ``` or ``` ... ```).
pub fn strip_code_fence(raw: &str) -> &str {
    let raw = raw.trim();
    let body = if let Some((_, rest)) = raw.split_once("```json") {
        rest
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest
    } else {
        return raw;
    };
    body.split("```").next().unwrap_or(body).trim()
}

/// Parse a model answer into questions. `None` if it is not a JSON array of questions.
pub fn parse_questions(raw: &str) -> Option<Vec<Question>> {
    let questions: Vec<Question> = serde_json::from_str(strip_code_fence(raw)).ok()?;
    (!questions.is_empty()).then_some(questions)
}
