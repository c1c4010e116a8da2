use sacm_domain::user::{AccountStatus, UserRole};

use sacm_portal::domain::types::{ActivationSession, ActivationStep, AuditAction};
use sacm_portal::error::PortalError;
use sacm_portal::usecase::activation::{
    ActivationStatusUseCase, IdentityInput, SetPasswordInput, SetPasswordUseCase,
    SubmitEmailUseCase, SubmitIdentityUseCase, VerifyCodeUseCase,
};
use sacm_portal::usecase::token::{LoginInput, LoginUseCase};

use crate::helpers::{
    MockActivationStore, MockAuditRepo, MockUserRepo, MockVerificationCodeRepo, TEST_JWT_SECRET,
    test_user,
};

fn identity_of(user: &sacm_portal::domain::types::User) -> IdentityInput {
    IdentityInput {
        academic_id: user.academic_id.clone(),
        id_card_number: user.id_card_number.clone(),
    }
}

fn passwords(p1: &str, p2: &str) -> SetPasswordInput {
    SetPasswordInput {
        password1: p1.to_owned(),
        password2: p2.to_owned(),
    }
}

// ── Step 1 ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_open_session_for_inactive_account() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let sessions = MockActivationStore::empty();
    let usecase = SubmitIdentityUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        sessions: sessions.clone(),
    };

    let output = usecase.execute(identity_of(&user)).await.unwrap();

    assert_eq!(output.session.user_id, user.id);
    assert_eq!(output.session.step(), ActivationStep::Email);
    assert!(sessions.sessions_handle().lock().unwrap().contains_key(&output.session_id));
}

#[tokio::test]
async fn should_reject_mismatched_identity() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let usecase = SubmitIdentityUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        sessions: MockActivationStore::empty(),
    };

    let result = usecase
        .execute(IdentityInput {
            academic_id: user.academic_id.clone(),
            id_card_number: "wrong".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(PortalError::InvalidIdentity)),
        "expected InvalidIdentity, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_identity_of_active_or_suspended_account() {
    let active = test_user(UserRole::Student, AccountStatus::Active);
    let suspended = test_user(UserRole::Student, AccountStatus::Suspended);
    let usecase = SubmitIdentityUseCase {
        users: MockUserRepo::new(vec![active.clone(), suspended.clone()]),
        sessions: MockActivationStore::empty(),
    };

    let result = usecase.execute(identity_of(&active)).await;
    assert!(
        matches!(result, Err(PortalError::AccountAlreadyActive)),
        "expected AccountAlreadyActive, got {result:?}"
    );

    let result = usecase.execute(identity_of(&suspended)).await;
    assert!(
        matches!(result, Err(PortalError::AccountSuspended)),
        "expected AccountSuspended, got {result:?}"
    );
}

// ── Step 2 ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_code_and_outbox_event_for_new_email() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let sessions = MockActivationStore::with_session("s1", ActivationSession::new(user.id));
    let codes = MockVerificationCodeRepo::empty();
    let usecase = SubmitEmailUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        sessions: sessions.clone(),
        codes: codes.clone(),
    };

    let output = usecase
        .execute(Some("s1"), "  New.Student@Uni.Example ")
        .await
        .unwrap();

    assert_eq!(output.session.step(), ActivationStep::Code);
    assert_eq!(output.session.email.as_deref(), Some("new.student@uni.example"));

    let stored = codes.codes_handle().lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].code, output.code);
    assert_eq!(stored[0].email, "new.student@uni.example");
    assert_eq!(codes.events_handle().lock().unwrap().len(), 1);

    let saved = sessions.sessions_handle().lock().unwrap()["s1"].clone();
    assert_eq!(saved.email.as_deref(), Some("new.student@uni.example"));
}

#[tokio::test]
async fn should_reject_email_used_by_another_account() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let other = test_user(UserRole::Student, AccountStatus::Active);
    let taken = other.email.clone().unwrap().to_uppercase();
    let usecase = SubmitEmailUseCase {
        users: MockUserRepo::new(vec![user.clone(), other]),
        sessions: MockActivationStore::with_session("s1", ActivationSession::new(user.id)),
        codes: MockVerificationCodeRepo::empty(),
    };

    let result = usecase.execute(Some("s1"), &taken).await;

    assert!(
        matches!(result, Err(PortalError::EmailAlreadyUsed)),
        "expected EmailAlreadyUsed, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_session_for_email_step() {
    let usecase = SubmitEmailUseCase {
        users: MockUserRepo::empty(),
        sessions: MockActivationStore::empty(),
        codes: MockVerificationCodeRepo::empty(),
    };

    let result = usecase.execute(None, "a@uni.example").await;
    assert!(
        matches!(result, Err(PortalError::ActivationSessionRequired)),
        "expected ActivationSessionRequired, got {result:?}"
    );

    let result = usecase.execute(Some("unknown"), "a@uni.example").await;
    assert!(
        matches!(result, Err(PortalError::ActivationSessionRequired)),
        "expected ActivationSessionRequired, got {result:?}"
    );
}

// ── Step 3 ───────────────────────────────────────────────────────────────────

async fn session_with_code(
    user_id: uuid::Uuid,
) -> (MockActivationStore, MockVerificationCodeRepo, String) {
    let sessions = MockActivationStore::with_session("s1", ActivationSession::new(user_id));
    let codes = MockVerificationCodeRepo::empty();
    let output = SubmitEmailUseCase {
        users: MockUserRepo::empty(),
        sessions: sessions.clone(),
        codes: codes.clone(),
    }
    .execute(Some("s1"), "fresh@uni.example")
    .await
    .unwrap();
    (sessions, codes, output.code)
}

fn wrong_code(code: &str) -> String {
    if code == "000000" { "111111" } else { "000000" }.to_owned()
}

#[tokio::test]
async fn should_verify_correct_code_and_mark_it_used() {
    let user_id = uuid::Uuid::new_v4();
    let (sessions, codes, code) = session_with_code(user_id).await;
    let usecase = VerifyCodeUseCase {
        sessions: sessions.clone(),
        codes: codes.clone(),
    };

    let session = usecase.execute(Some("s1"), &code).await.unwrap();

    assert!(session.otp_verified);
    assert_eq!(session.step(), ActivationStep::Password);
    assert!(codes.codes_handle().lock().unwrap()[0].used_at.is_some());
    assert!(sessions.sessions_handle().lock().unwrap()["s1"].otp_verified);
}

#[tokio::test]
async fn should_count_failed_attempts_on_mismatch() {
    let (sessions, codes, code) = session_with_code(uuid::Uuid::new_v4()).await;
    let usecase = VerifyCodeUseCase {
        sessions,
        codes: codes.clone(),
    };

    let result = usecase.execute(Some("s1"), &wrong_code(&code)).await;

    assert!(
        matches!(result, Err(PortalError::InvalidVerificationCode)),
        "expected InvalidVerificationCode, got {result:?}"
    );
    assert_eq!(codes.codes_handle().lock().unwrap()[0].attempts, 1);
}

#[tokio::test]
async fn should_reject_correct_code_after_five_failures() {
    let (sessions, codes, code) = session_with_code(uuid::Uuid::new_v4()).await;
    let usecase = VerifyCodeUseCase {
        sessions,
        codes: codes.clone(),
    };

    for _ in 0..5 {
        let _ = usecase.execute(Some("s1"), &wrong_code(&code)).await;
    }
    let result = usecase.execute(Some("s1"), &code).await;

    assert!(
        matches!(result, Err(PortalError::InvalidVerificationCode)),
        "expected InvalidVerificationCode, got {result:?}"
    );
    let stored = codes.codes_handle().lock().unwrap()[0].clone();
    assert_eq!(stored.attempts, 5);
    assert!(stored.used_at.is_none());
}

#[tokio::test]
async fn should_reject_correct_code_exhausted_by_concurrent_guesses() {
    let (sessions, codes, code) = session_with_code(uuid::Uuid::new_v4()).await;
    codes.codes_handle().lock().unwrap()[0].attempts = 4;
    codes.interleave_failures(1);
    let usecase = VerifyCodeUseCase {
        sessions: sessions.clone(),
        codes: codes.clone(),
    };

    let result = usecase.execute(Some("s1"), &code).await;

    assert!(
        matches!(result, Err(PortalError::InvalidVerificationCode)),
        "expected InvalidVerificationCode, got {result:?}"
    );
    let stored = codes.codes_handle().lock().unwrap()[0].clone();
    assert_eq!(stored.attempts, 5);
    assert!(stored.used_at.is_none());
    assert!(!sessions.sessions_handle().lock().unwrap()["s1"].otp_verified);
}

#[tokio::test]
async fn should_accept_a_code_only_once_under_concurrent_submissions() {
    let (sessions, codes, code) = session_with_code(uuid::Uuid::new_v4()).await;
    codes.interleave_claim();
    let usecase = VerifyCodeUseCase {
        sessions: sessions.clone(),
        codes: codes.clone(),
    };

    let result = usecase.execute(Some("s1"), &code).await;

    assert!(
        matches!(result, Err(PortalError::InvalidVerificationCode)),
        "expected InvalidVerificationCode, got {result:?}"
    );
    assert!(!sessions.sessions_handle().lock().unwrap()["s1"].otp_verified);
}

#[tokio::test]
async fn should_require_email_before_code() {
    let usecase = VerifyCodeUseCase {
        sessions: MockActivationStore::with_session(
            "s1",
            ActivationSession::new(uuid::Uuid::new_v4()),
        ),
        codes: MockVerificationCodeRepo::empty(),
    };

    let result = usecase.execute(Some("s1"), "123456").await;

    assert!(
        matches!(result, Err(PortalError::ActivationSessionRequired)),
        "expected ActivationSessionRequired, got {result:?}"
    );
}

// ── Step 4 ───────────────────────────────────────────────────────────────────

fn verified_session(user_id: uuid::Uuid, email: &str) -> ActivationSession {
    ActivationSession {
        user_id,
        email: Some(email.to_owned()),
        otp_verified: true,
    }
}

#[tokio::test]
async fn should_activate_account_and_clear_session() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let users = MockUserRepo::new(vec![user.clone()]);
    let sessions =
        MockActivationStore::with_session("s1", verified_session(user.id, "me@uni.example"));
    let audit = MockAuditRepo::empty();
    let usecase = SetPasswordUseCase {
        users: users.clone(),
        sessions: sessions.clone(),
        audit: audit.clone(),
    };

    usecase
        .execute(Some("s1"), passwords("brand new pass", "brand new pass"))
        .await
        .unwrap();

    let stored = users.get(user.id);
    assert_eq!(stored.status, AccountStatus::Active);
    assert_eq!(stored.email.as_deref(), Some("me@uni.example"));
    assert!(sessions.sessions_handle().lock().unwrap().is_empty());
    assert_eq!(
        audit.entries_handle().lock().unwrap()[0].action,
        AuditAction::Create
    );

    let login = LoginUseCase {
        users,
        audit,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let output = login
        .execute(LoginInput {
            academic_id: user.academic_id.clone(),
            password: "brand new pass".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(output.user.id, user.id);
}

#[tokio::test]
async fn should_refuse_password_before_code_is_verified() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let mut session = verified_session(user.id, "me@uni.example");
    session.otp_verified = false;
    let usecase = SetPasswordUseCase {
        users: MockUserRepo::new(vec![user]),
        sessions: MockActivationStore::with_session("s1", session),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .execute(Some("s1"), passwords("brand new pass", "brand new pass"))
        .await;

    assert!(
        matches!(result, Err(PortalError::ActivationSessionRequired)),
        "expected ActivationSessionRequired, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_mismatched_or_weak_password() {
    let user = test_user(UserRole::Student, AccountStatus::Inactive);
    let usecase = SetPasswordUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        sessions: MockActivationStore::with_session(
            "s1",
            verified_session(user.id, "me@uni.example"),
        ),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .execute(Some("s1"), passwords("brand new pass", "brand new pas"))
        .await;
    assert!(
        matches!(result, Err(PortalError::PasswordMismatch)),
        "expected PasswordMismatch, got {result:?}"
    );

    let result = usecase
        .execute(Some("s1"), passwords("12345678", "12345678"))
        .await;
    assert!(
        matches!(result, Err(PortalError::WeakPassword)),
        "expected WeakPassword, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_activate_account_that_is_no_longer_inactive() {
    let user = test_user(UserRole::Student, AccountStatus::Suspended);
    let sessions =
        MockActivationStore::with_session("s1", verified_session(user.id, "me@uni.example"));
    let usecase = SetPasswordUseCase {
        users: MockUserRepo::new(vec![user]),
        sessions: sessions.clone(),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .execute(Some("s1"), passwords("brand new pass", "brand new pass"))
        .await;

    assert!(
        matches!(result, Err(PortalError::ActivationSessionRequired)),
        "expected ActivationSessionRequired, got {result:?}"
    );
    assert!(sessions.sessions_handle().lock().unwrap().is_empty());
}

// ── Status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_identity_step_without_session() {
    let usecase = ActivationStatusUseCase {
        sessions: MockActivationStore::empty(),
    };

    assert_eq!(usecase.execute(None).await.unwrap(), ActivationStep::Identity);
    assert_eq!(
        usecase.execute(Some("expired")).await.unwrap(),
        ActivationStep::Identity
    );
}
