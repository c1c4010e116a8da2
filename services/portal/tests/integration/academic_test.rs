use chrono::NaiveDate;
use uuid::Uuid;

use sacm_portal::error::PortalError;
use sacm_portal::usecase::academic::{
    CreateLevelUseCase, ListMajorsUseCase, ListSemestersUseCase, MajorInput, SaveMajorUseCase,
    SaveSemesterUseCase, SemesterInput,
};

use crate::helpers::{
    MockAuditRepo, MockLevelRepo, MockMajorRepo, MockSemesterRepo, test_level, test_major,
    test_semester,
};

fn major_input(name: &str, is_active: bool) -> MajorInput {
    MajorInput {
        name: name.to_owned(),
        description: None,
        is_active,
    }
}

fn semester_input(name: &str, is_current: bool) -> SemesterInput {
    SemesterInput {
        name: name.to_owned(),
        academic_year: "2026/2027".to_owned(),
        number: 1,
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2027, 1, 31).unwrap(),
        is_current,
    }
}

fn current_ids(semesters: &MockSemesterRepo) -> Vec<Uuid> {
    semesters
        .semesters_handle()
        .lock()
        .unwrap()
        .iter()
        .filter(|s| s.is_current)
        .map(|s| s.id)
        .collect()
}

// ── Majors ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_major_name_differing_only_in_case() {
    let usecase = SaveMajorUseCase {
        majors: MockMajorRepo::new(vec![test_major("Computer Science")]),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .create(Uuid::new_v4(), major_input("computer science", true))
        .await;

    assert!(
        matches!(result, Err(PortalError::MajorNameTaken)),
        "expected MajorNameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_rename_major_and_hide_it_from_active_list() {
    let major = test_major("Information Systems");
    let majors = MockMajorRepo::new(vec![major.clone()]);
    let usecase = SaveMajorUseCase {
        majors: majors.clone(),
        audit: MockAuditRepo::empty(),
    };

    let updated = usecase
        .update(Uuid::new_v4(), major.id, major_input("Info Systems", false))
        .await
        .unwrap();
    assert_eq!(updated.name, "Info Systems");

    let list = ListMajorsUseCase { majors };
    assert!(list.execute(true).await.unwrap().is_empty());
    assert_eq!(list.execute(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_own_name_on_major_update() {
    let major = test_major("Networks");
    let usecase = SaveMajorUseCase {
        majors: MockMajorRepo::new(vec![major.clone()]),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .update(Uuid::new_v4(), major.id, major_input("Networks", true))
        .await;

    assert!(result.is_ok(), "expected update to succeed, got {result:?}");
}

// ── Levels ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_duplicate_level_number_or_name() {
    let usecase = CreateLevelUseCase {
        levels: MockLevelRepo::new(vec![test_level(1)]),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase.execute(Uuid::new_v4(), "First", 1).await;
    assert!(
        matches!(result, Err(PortalError::LevelTaken)),
        "expected LevelTaken, got {result:?}"
    );

    let result = usecase.execute(Uuid::new_v4(), "level 1", 9).await;
    assert!(
        matches!(result, Err(PortalError::LevelTaken)),
        "expected LevelTaken, got {result:?}"
    );

    let result = usecase.execute(Uuid::new_v4(), "Zero", 0).await;
    assert!(
        matches!(result, Err(PortalError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

// ── Semesters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_single_current_semester_on_create() {
    let old = test_semester("Fall 2025", true);
    let semesters = MockSemesterRepo::new(vec![old]);
    let usecase = SaveSemesterUseCase {
        semesters: semesters.clone(),
        audit: MockAuditRepo::empty(),
    };

    let created = usecase
        .create(Uuid::new_v4(), semester_input("Fall 2026", true))
        .await
        .unwrap();

    assert_eq!(current_ids(&semesters), vec![created.id]);
}

#[tokio::test]
async fn should_switch_current_semester() {
    let fall = test_semester("Fall 2025", true);
    let spring = test_semester("Spring 2026", false);
    let semesters = MockSemesterRepo::new(vec![fall, spring.clone()]);
    let usecase = SaveSemesterUseCase {
        semesters: semesters.clone(),
        audit: MockAuditRepo::empty(),
    };

    let current = usecase.set_current(Uuid::new_v4(), spring.id).await.unwrap();

    assert!(current.is_current);
    assert_eq!(current_ids(&semesters), vec![spring.id]);
    let list = ListSemestersUseCase { semesters };
    assert_eq!(list.current().await.unwrap().id, spring.id);
}

#[tokio::test]
async fn should_reject_semester_ending_before_it_starts() {
    let usecase = SaveSemesterUseCase {
        semesters: MockSemesterRepo::default(),
        audit: MockAuditRepo::empty(),
    };
    let mut input = semester_input("Backwards", false);
    std::mem::swap(&mut input.start_date, &mut input.end_date);

    let result = usecase.create(Uuid::new_v4(), input).await;

    assert!(
        matches!(result, Err(PortalError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_duplicate_semester_name() {
    let usecase = SaveSemesterUseCase {
        semesters: MockSemesterRepo::new(vec![test_semester("Fall 2026", false)]),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .create(Uuid::new_v4(), semester_input("Fall 2026", false))
        .await;

    assert!(
        matches!(result, Err(PortalError::SemesterNameTaken)),
        "expected SemesterNameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_missing_current_semester() {
    let usecase = ListSemestersUseCase {
        semesters: MockSemesterRepo::new(vec![test_semester("Fall 2025", false)]),
    };

    let result = usecase.current().await;

    assert!(
        matches!(result, Err(PortalError::SemesterNotFound)),
        "expected SemesterNotFound, got {result:?}"
    );
}
