use chrono::{Duration, Utc};
use uuid::Uuid;

use sacm_domain::user::{AccountStatus, UserRole};

use sacm_portal::domain::study_aid::{
    ASK_UNAVAILABLE, ChatExchange, QuestionType, SavedQuestions, StudyAidRequest, UsageRecord,
    fallback_questions,
};
use sacm_portal::domain::types::{ActivityKind, Actor, User};
use sacm_portal::error::PortalError;
use sacm_portal::usecase::study_aid::StudyAidUseCase;

use crate::helpers::{
    MockAuditRepo, MockCourseRepo, MockLanguageModel, MockLectureFileRepo, MockStudyAidRepo,
    MockUserRepo, test_course, test_file, test_major, test_student, test_user,
};

const MATERIAL: &str = "Ownership moves values. Borrowing lends them. Lifetimes bound borrows.";

type StudyAid = StudyAidUseCase<
    MockCourseRepo,
    MockUserRepo,
    MockLectureFileRepo,
    MockStudyAidRepo,
    MockLanguageModel,
    MockAuditRepo,
>;

struct Fixture {
    student: User,
    file_id: Uuid,
    aids: MockStudyAidRepo,
    audit: MockAuditRepo,
    usecase: StudyAid,
}

fn fixture(model: MockLanguageModel, rate_limit: u32) -> Fixture {
    let major = test_major("Computer Science");
    let level_id = Uuid::new_v4();
    let course = test_course("CS201", level_id, Uuid::new_v4(), vec![major.id]);
    let instructor = test_user(UserRole::Instructor, AccountStatus::Active);
    let student = test_student(major.id, level_id);
    let file = test_file(course.id, instructor.id, true);
    let aids = MockStudyAidRepo::empty();
    let audit = MockAuditRepo::empty();
    Fixture {
        file_id: file.id,
        aids: aids.clone(),
        audit: audit.clone(),
        usecase: StudyAidUseCase {
            courses: MockCourseRepo::new(vec![course]),
            users: MockUserRepo::new(vec![student.clone(), instructor]),
            files: MockLectureFileRepo::new(vec![file]),
            aids,
            model,
            audit,
            rate_limit,
        },
        student,
    }
}

fn actor_of(user: &User) -> Actor {
    Actor {
        user_id: user.id,
        role: user.role,
    }
}

fn used_request(user_id: Uuid, was_cached: bool) -> UsageRecord {
    UsageRecord {
        id: Uuid::new_v4(),
        user_id,
        request: StudyAidRequest::Summary,
        file_id: None,
        was_cached,
        success: true,
        error_message: None,
        created_at: Utc::now(),
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_summarise_with_model_then_serve_from_cache() {
    let f = fixture(MockLanguageModel::answering("Rust manages memory."), 10);
    let actor = actor_of(&f.student);

    let first = f
        .usecase
        .summary(&actor, f.file_id, MATERIAL, false)
        .await
        .unwrap();
    assert_eq!(first.summary, "Rust manages memory.");
    assert!(!first.cached);
    assert_eq!(first.model_used.as_deref(), Some("mock-model"));

    let second = f.usecase.summary(&actor, f.file_id, "", false).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.summary, first.summary);

    let usage = f.aids.usage_handle().lock().unwrap().clone();
    assert_eq!(usage.len(), 2);
    assert!(!usage[0].was_cached);
    assert!(usage[1].was_cached);
    assert_eq!(f.usecase.quota(f.student.id).await.unwrap().remaining, 9);
    assert_eq!(
        f.audit.activities_handle().lock().unwrap()[0].kind,
        ActivityKind::AiSummary
    );
}

#[tokio::test]
async fn should_fall_back_to_local_extract_when_model_fails() {
    let f = fixture(MockLanguageModel::unavailable(), 10);

    let output = f
        .usecase
        .summary(&actor_of(&f.student), f.file_id, MATERIAL, false)
        .await
        .unwrap();

    assert_eq!(output.summary, MATERIAL);
    assert_eq!(output.model_used, None);
    let usage = f.aids.usage_handle().lock().unwrap()[0].clone();
    assert!(!usage.success);
    assert!(usage.error_message.is_some());
}

#[tokio::test]
async fn should_regenerate_summary_on_refresh() {
    let model = MockLanguageModel::answering("Fresh summary.");
    let prompts = model.prompts_handle();
    let f = fixture(model, 10);
    let actor = actor_of(&f.student);
    f.usecase
        .summary(&actor, f.file_id, MATERIAL, false)
        .await
        .unwrap();

    let output = f
        .usecase
        .summary(&actor, f.file_id, MATERIAL, true)
        .await
        .unwrap();

    assert!(!output.cached);
    assert_eq!(prompts.lock().unwrap().len(), 2);
    assert_eq!(f.aids.summaries_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_require_text_for_uncached_summary() {
    let f = fixture(MockLanguageModel::answering("x"), 10);

    let result = f
        .usecase
        .summary(&actor_of(&f.student), f.file_id, "   ", false)
        .await;

    assert!(
        matches!(result, Err(PortalError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

// ── Rate limit ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_rate_limit_after_hourly_quota_is_used() {
    let model = MockLanguageModel::answering("answer");
    let prompts = model.prompts_handle();
    let f = fixture(model, 2);
    f.aids.usage_handle().lock().unwrap().extend([
        used_request(f.student.id, false),
        used_request(f.student.id, false),
        used_request(f.student.id, true),
    ]);

    let result = f
        .usecase
        .ask(&actor_of(&f.student), f.file_id, MATERIAL, "What moves?")
        .await;

    assert!(
        matches!(result, Err(PortalError::RateLimited)),
        "expected RateLimited, got {result:?}"
    );
    assert!(prompts.lock().unwrap().is_empty());
    assert_eq!(f.usecase.quota(f.student.id).await.unwrap().remaining, 0);
}

#[tokio::test]
async fn should_ignore_usage_older_than_an_hour() {
    let f = fixture(MockLanguageModel::answering("answer"), 1);
    let mut old = used_request(f.student.id, false);
    old.created_at = Utc::now() - chrono::Duration::minutes(61);
    f.aids.usage_handle().lock().unwrap().push(old);

    let quota = f.usecase.quota(f.student.id).await.unwrap();

    assert_eq!(quota.limit, 1);
    assert_eq!(quota.remaining, 1);
}

// ── Questions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_parse_fenced_question_list() {
    let raw = "```json\n[{\"type\":\"mcq\",\"question\":\"What moves?\",\"options\":[\"values\",\"types\"],\"answer\":\"values\"}]\n```";
    let f = fixture(MockLanguageModel::answering(raw), 10);

    let questions = f
        .usecase
        .questions(&actor_of(&f.student), f.file_id, MATERIAL, QuestionType::Mcq, Some(1))
        .await
        .unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].kind, "mcq");
    assert_eq!(questions[0].options.as_ref().map(Vec::len), Some(2));
    assert!(f.aids.usage_handle().lock().unwrap()[0].success);
}

#[tokio::test]
async fn should_fall_back_to_placeholder_question_on_garbage_answer() {
    let f = fixture(MockLanguageModel::answering("I'd rather not."), 10);

    let questions = f
        .usecase
        .questions(&actor_of(&f.student), f.file_id, MATERIAL, QuestionType::Mixed, None)
        .await
        .unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].kind, "short_answer");
    assert!(!f.aids.usage_handle().lock().unwrap()[0].success);
}

#[tokio::test]
async fn should_reject_question_count_out_of_range() {
    let f = fixture(MockLanguageModel::answering("[]"), 10);

    for count in [0, 21] {
        let result = f
            .usecase
            .questions(
                &actor_of(&f.student),
                f.file_id,
                MATERIAL,
                QuestionType::TrueFalse,
                Some(count),
            )
            .await;
        assert!(
            matches!(result, Err(PortalError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_list_earlier_question_sets_newest_first() {
    let f = fixture(MockLanguageModel::answering("not json"), 10);
    let now = Utc::now();
    let saved = |user_id: Uuid, question_type: QuestionType, age_minutes: i64| SavedQuestions {
        id: Uuid::new_v4(),
        file_id: f.file_id,
        user_id,
        question_type,
        questions: fallback_questions(),
        model_used: None,
        created_at: now - Duration::minutes(age_minutes),
    };
    {
        let handle = f.aids.questions_handle();
        let mut sets = handle.lock().unwrap();
        sets.push(saved(f.student.id, QuestionType::Mcq, 30));
        sets.push(saved(f.student.id, QuestionType::TrueFalse, 5));
        sets.push(saved(Uuid::new_v4(), QuestionType::Mixed, 1));
    }

    let history = f
        .usecase
        .question_history(&actor_of(&f.student), f.file_id)
        .await
        .unwrap();

    let types: Vec<_> = history.iter().map(|s| s.question_type).collect();
    assert_eq!(types, vec![QuestionType::TrueFalse, QuestionType::Mcq]);
    assert!(history.iter().all(|s| s.user_id == f.student.id));
}

#[tokio::test]
async fn should_keep_generated_questions_in_history() {
    let f = fixture(MockLanguageModel::unavailable(), 10);
    let actor = actor_of(&f.student);

    f.usecase
        .questions(&actor, f.file_id, MATERIAL, QuestionType::ShortAnswer, Some(3))
        .await
        .unwrap();

    let history = f.usecase.question_history(&actor, f.file_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question_type, QuestionType::ShortAnswer);
    assert_eq!(history[0].questions, fallback_questions());
}

// ── Ask ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_question_and_keep_history() {
    let f = fixture(MockLanguageModel::answering("Values move."), 10);

    let answer = f
        .usecase
        .ask(&actor_of(&f.student), f.file_id, MATERIAL, " What moves? ")
        .await
        .unwrap();

    assert_eq!(answer, "Values move.");
    let chats = f.aids.chats_handle().lock().unwrap().clone();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].question, "What moves?");
}

#[tokio::test]
async fn should_apologise_when_assistant_is_unavailable() {
    let f = fixture(MockLanguageModel::unavailable(), 10);

    let answer = f
        .usecase
        .ask(&actor_of(&f.student), f.file_id, MATERIAL, "What moves?")
        .await
        .unwrap();

    assert_eq!(answer, ASK_UNAVAILABLE);
}

#[tokio::test]
async fn should_refuse_study_aid_on_unreadable_file() {
    let f = fixture(MockLanguageModel::answering("x"), 10);
    let outsider = Actor {
        user_id: Uuid::new_v4(),
        role: UserRole::Instructor,
    };

    let result = f.usecase.ask(&outsider, f.file_id, MATERIAL, "Why?").await;
    assert!(
        matches!(result, Err(PortalError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );

    let result = f
        .usecase
        .ask(&actor_of(&f.student), Uuid::new_v4(), MATERIAL, "Why?")
        .await;
    assert!(
        matches!(result, Err(PortalError::FileNotFound)),
        "expected FileNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_chat_history_oldest_first_and_clear_only_own() {
    let f = fixture(MockLanguageModel::answering("Because."), 10);
    let actor = actor_of(&f.student);
    let classmate = ChatExchange {
        id: Uuid::new_v4(),
        file_id: f.file_id,
        user_id: Uuid::new_v4(),
        question: "Mine?".to_owned(),
        answer: "Yours.".to_owned(),
        created_at: Utc::now() - Duration::minutes(10),
    };
    f.aids.chats_handle().lock().unwrap().push(classmate.clone());

    for question in ["First?", "Second?"] {
        f.usecase
            .ask(&actor, f.file_id, MATERIAL, question)
            .await
            .unwrap();
    }

    let history = f.usecase.chat_history(&actor, f.file_id).await.unwrap();
    let questions: Vec<_> = history.iter().map(|c| c.question.as_str()).collect();
    assert_eq!(questions, vec!["First?", "Second?"]);

    let removed = f
        .usecase
        .clear_chat_history(&actor, f.file_id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(f.usecase.chat_history(&actor, f.file_id).await.unwrap().is_empty());

    let remaining = f.aids.chats_handle().lock().unwrap().clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, classmate.id);
}

#[tokio::test]
async fn should_refuse_history_on_unreadable_file() {
    let f = fixture(MockLanguageModel::answering("x"), 10);
    let outsider = Actor {
        user_id: Uuid::new_v4(),
        role: UserRole::Instructor,
    };

    let result = f.usecase.chat_history(&outsider, f.file_id).await;
    assert!(
        matches!(result, Err(PortalError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
    let result = f.usecase.clear_chat_history(&outsider, f.file_id).await;
    assert!(
        matches!(result, Err(PortalError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
    let result = f
        .usecase
        .question_history(&actor_of(&f.student), Uuid::new_v4())
        .await;
    assert!(
        matches!(result, Err(PortalError::FileNotFound)),
        "expected FileNotFound, got {result:?}"
    );
}

// ── Usage ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_usage_counts_totals_and_recent_rows() {
    let f = fixture(MockLanguageModel::answering("Answer."), 20);
    let actor = actor_of(&f.student);
    let now = Utc::now();
    {
        let handle = f.aids.usage_handle();
        let mut usage = handle.lock().unwrap();
        for i in 0..10 {
            usage.push(UsageRecord {
                created_at: now - Duration::seconds(i + 1),
                ..used_request(f.student.id, i % 2 == 0)
            });
        }
        usage.push(UsageRecord {
            created_at: now - Duration::days(3),
            ..used_request(f.student.id, false)
        });
        usage.push(used_request(Uuid::new_v4(), false));
    }

    f.usecase
        .summary(&actor, f.file_id, MATERIAL, false)
        .await
        .unwrap();
    f.usecase
        .ask(&actor, f.file_id, MATERIAL, "Why?")
        .await
        .unwrap();

    let stats = f.usecase.usage(f.student.id).await.unwrap();
    assert_eq!(stats.last_hour, 12);
    assert_eq!(stats.today, 12);
    assert_eq!(stats.quota.limit, 20);
    assert_eq!(stats.quota.remaining, 20 - 7);
    assert_eq!(stats.totals.summaries, 1);
    assert_eq!(stats.totals.questions, 0);
    assert_eq!(stats.totals.chats, 1);
    assert_eq!(stats.recent.len(), 10);
    assert_eq!(stats.recent[0].request, StudyAidRequest::Ask);
    assert_eq!(stats.recent[1].request, StudyAidRequest::Summary);
    assert!(stats.recent.iter().all(|r| r.user_id == f.student.id));
    assert!(
        stats
            .recent
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at)
    );
}
