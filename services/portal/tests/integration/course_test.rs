use uuid::Uuid;

use sacm_domain::user::{AccountStatus, UserRole};

use sacm_portal::domain::lecture_file::FileType;
use sacm_portal::domain::types::Actor;
use sacm_portal::error::PortalError;
use sacm_portal::usecase::course::{
    AssignInstructorUseCase, CourseAccess, CourseDetailUseCase, CourseInput,
    InstructorCoursesUseCase, SaveCourseUseCase, StudentCoursesUseCase,
};

use crate::helpers::{
    MockAuditRepo, MockCourseRepo, MockLectureFileRepo, MockLevelRepo, MockMajorRepo,
    MockSemesterRepo, MockUserRepo, test_course, test_file, test_level, test_major,
    test_semester, test_student, test_user,
};

fn actor_of(user: &sacm_portal::domain::types::User) -> Actor {
    Actor {
        user_id: user.id,
        role: user.role,
    }
}

// ── Student course lists ─────────────────────────────────────────────────────

struct Catalogue {
    student: sacm_portal::domain::types::User,
    usecase: StudentCoursesUseCase<MockCourseRepo, MockUserRepo, MockLevelRepo, MockSemesterRepo>,
    current_same_level: Uuid,
    past_lower_level: Uuid,
}

fn catalogue(with_current_semester: bool) -> Catalogue {
    let (l1, l2, l3) = (test_level(1), test_level(2), test_level(3));
    let cs = test_major("Computer Science");
    let is = test_major("Information Systems");
    let now = test_semester("Fall 2026", with_current_semester);
    let past = test_semester("Fall 2025", false);
    let student = test_student(cs.id, l3.id);

    let current_same_level = test_course("CS301", l3.id, now.id, vec![cs.id]);
    let past_lower_level = test_course("CS201", l2.id, past.id, vec![cs.id, is.id]);
    let lower_level_this_semester = test_course("CS202", l2.id, now.id, vec![cs.id]);
    let same_level_past = test_course("CS302", l3.id, past.id, vec![cs.id]);
    let other_major = test_course("IS301", l3.id, now.id, vec![is.id]);
    let mut inactive = test_course("CS101", l1.id, past.id, vec![cs.id]);
    inactive.is_active = false;

    Catalogue {
        student: student.clone(),
        current_same_level: current_same_level.id,
        past_lower_level: past_lower_level.id,
        usecase: StudentCoursesUseCase {
            courses: MockCourseRepo::new(vec![
                current_same_level,
                past_lower_level,
                lower_level_this_semester,
                same_level_past,
                other_major,
                inactive,
            ]),
            users: MockUserRepo::new(vec![student]),
            levels: MockLevelRepo::new(vec![l1, l2, l3]),
            semesters: MockSemesterRepo::new(vec![now, past]),
        },
    }
}

#[tokio::test]
async fn should_list_current_courses_at_student_level() {
    let c = catalogue(true);

    let courses = c.usecase.execute(c.student.id, false).await.unwrap();

    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c.current_same_level]);
}

#[tokio::test]
async fn should_archive_only_lower_level_courses_from_past_semesters() {
    let c = catalogue(true);

    let courses = c.usecase.execute(c.student.id, true).await.unwrap();

    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c.past_lower_level]);
}

#[tokio::test]
async fn should_show_nothing_without_current_semester() {
    let c = catalogue(false);

    assert!(c.usecase.execute(c.student.id, false).await.unwrap().is_empty());
    assert!(c.usecase.execute(c.student.id, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_show_nothing_to_student_without_placement() {
    let student = test_user(UserRole::Student, AccountStatus::Active);
    let usecase = StudentCoursesUseCase {
        courses: MockCourseRepo::default(),
        users: MockUserRepo::new(vec![student.clone()]),
        levels: MockLevelRepo::default(),
        semesters: MockSemesterRepo::default(),
    };

    assert!(usecase.execute(student.id, false).await.unwrap().is_empty());
}

// ── Instructor course list ───────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_assigned_active_courses_for_instructor() {
    let (level, semester) = (test_level(1), test_semester("Fall 2026", true));
    let assigned = test_course("CS101", level.id, semester.id, vec![]);
    let unassigned = test_course("CS102", level.id, semester.id, vec![]);
    let instructor = Uuid::new_v4();
    let usecase = InstructorCoursesUseCase {
        courses: MockCourseRepo::new(vec![assigned.clone(), unassigned])
            .with_assignment(assigned.id, instructor),
    };

    let courses = usecase.execute(instructor).await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, assigned.id);
}

// ── Course detail and access ─────────────────────────────────────────────────

struct DetailFixture {
    course_id: Uuid,
    instructor: sacm_portal::domain::types::User,
    student: sacm_portal::domain::types::User,
    outsider: sacm_portal::domain::types::User,
    usecase: CourseDetailUseCase<MockCourseRepo, MockUserRepo, MockLectureFileRepo>,
}

fn detail_fixture() -> DetailFixture {
    let level = test_level(2);
    let semester = test_semester("Fall 2026", true);
    let cs = test_major("Computer Science");
    let course = test_course("CS201", level.id, semester.id, vec![cs.id]);
    let instructor = test_user(UserRole::Instructor, AccountStatus::Active);
    let student = test_student(cs.id, level.id);
    let outsider = test_student(Uuid::new_v4(), level.id);

    let visible = test_file(course.id, instructor.id, true);
    let hidden = test_file(course.id, instructor.id, false);
    let mut exam = test_file(course.id, instructor.id, true);
    exam.file_type = FileType::Exam;

    DetailFixture {
        course_id: course.id,
        usecase: CourseDetailUseCase {
            courses: MockCourseRepo::new(vec![course.clone()])
                .with_assignment(course.id, instructor.id),
            users: MockUserRepo::new(vec![
                instructor.clone(),
                student.clone(),
                outsider.clone(),
            ]),
            files: MockLectureFileRepo::new(vec![visible, hidden, exam]),
        },
        instructor,
        student,
        outsider,
    }
}

#[tokio::test]
async fn should_give_assigned_instructor_manage_access_with_hidden_files() {
    let f = detail_fixture();

    let detail = f
        .usecase
        .execute(&actor_of(&f.instructor), f.course_id)
        .await
        .unwrap();

    assert_eq!(detail.access, CourseAccess::Manage);
    assert_eq!(detail.files[&FileType::Lecture].len(), 2);
    assert_eq!(detail.files[&FileType::Exam].len(), 1);
    assert_eq!(detail.instructors.len(), 1);
}

#[tokio::test]
async fn should_give_student_of_linked_major_visible_files_only() {
    let f = detail_fixture();

    let detail = f
        .usecase
        .execute(&actor_of(&f.student), f.course_id)
        .await
        .unwrap();

    assert_eq!(detail.access, CourseAccess::Read);
    assert_eq!(detail.files[&FileType::Lecture].len(), 1);
    assert!(detail.files.values().flatten().all(|file| file.is_visible));
}

#[tokio::test]
async fn should_forbid_unlinked_student_and_unassigned_instructor() {
    let f = detail_fixture();

    let result = f.usecase.execute(&actor_of(&f.outsider), f.course_id).await;
    assert!(
        matches!(result, Err(PortalError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );

    let stranger = Actor {
        user_id: Uuid::new_v4(),
        role: UserRole::Instructor,
    };
    let result = f.usecase.execute(&stranger, f.course_id).await;
    assert!(
        matches!(result, Err(PortalError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_let_admin_manage_any_course() {
    let f = detail_fixture();
    let admin = Actor {
        user_id: Uuid::new_v4(),
        role: UserRole::Admin,
    };

    let detail = f.usecase.execute(&admin, f.course_id).await.unwrap();

    assert!(detail.access.can_manage());
}

// ── Admin: save course ───────────────────────────────────────────────────────

struct SaveFixture {
    level_id: Uuid,
    semester_id: Uuid,
    major_id: Uuid,
    courses: MockCourseRepo,
    usecase: SaveCourseUseCase<
        MockCourseRepo,
        MockLevelRepo,
        MockSemesterRepo,
        MockMajorRepo,
        MockAuditRepo,
    >,
}

fn save_fixture() -> SaveFixture {
    let level = test_level(1);
    let semester = test_semester("Fall 2026", true);
    let major = test_major("Computer Science");
    let courses = MockCourseRepo::default();
    SaveFixture {
        level_id: level.id,
        semester_id: semester.id,
        major_id: major.id,
        courses: courses.clone(),
        usecase: SaveCourseUseCase {
            courses,
            levels: MockLevelRepo::new(vec![level]),
            semesters: MockSemesterRepo::new(vec![semester]),
            majors: MockMajorRepo::new(vec![major]),
            audit: MockAuditRepo::empty(),
        },
    }
}

fn course_input(f: &SaveFixture, code: &str) -> CourseInput {
    CourseInput {
        name: "Data Structures".to_owned(),
        code: code.to_owned(),
        description: None,
        level_id: f.level_id,
        semester_id: f.semester_id,
        credit_hours: None,
        is_active: true,
        major_ids: vec![f.major_id, f.major_id],
    }
}

#[tokio::test]
async fn should_create_course_with_normalised_code_and_defaults() {
    let f = save_fixture();

    let course = f
        .usecase
        .create(Uuid::new_v4(), course_input(&f, " cs201 "))
        .await
        .unwrap();

    assert_eq!(course.code, "CS201");
    assert_eq!(course.credit_hours, 3);
    assert_eq!(course.major_ids, vec![f.major_id]);
    assert_eq!(f.courses.courses_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_duplicate_course_code_ignoring_case() {
    let f = save_fixture();
    f.usecase
        .create(Uuid::new_v4(), course_input(&f, "CS201"))
        .await
        .unwrap();

    let result = f
        .usecase
        .create(Uuid::new_v4(), course_input(&f, "cs201"))
        .await;

    assert!(
        matches!(result, Err(PortalError::CourseCodeTaken)),
        "expected CourseCodeTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_references_and_bad_credit_hours() {
    let f = save_fixture();

    let mut input = course_input(&f, "CS301");
    input.semester_id = Uuid::new_v4();
    let result = f.usecase.create(Uuid::new_v4(), input).await;
    assert!(
        matches!(result, Err(PortalError::SemesterNotFound)),
        "expected SemesterNotFound, got {result:?}"
    );

    let mut input = course_input(&f, "CS301");
    input.major_ids = vec![Uuid::new_v4()];
    let result = f.usecase.create(Uuid::new_v4(), input).await;
    assert!(
        matches!(result, Err(PortalError::MajorNotFound)),
        "expected MajorNotFound, got {result:?}"
    );

    let mut input = course_input(&f, "CS301");
    input.credit_hours = Some(0);
    let result = f.usecase.create(Uuid::new_v4(), input).await;
    assert!(
        matches!(result, Err(PortalError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

// ── Admin: instructor assignment ─────────────────────────────────────────────

#[tokio::test]
async fn should_assign_instructor_once() {
    let course = test_course("CS101", Uuid::new_v4(), Uuid::new_v4(), vec![]);
    let instructor = test_user(UserRole::Instructor, AccountStatus::Active);
    let courses = MockCourseRepo::new(vec![course.clone()]);
    let usecase = AssignInstructorUseCase {
        courses: courses.clone(),
        users: MockUserRepo::new(vec![instructor.clone()]),
        audit: MockAuditRepo::empty(),
    };

    usecase
        .assign(Uuid::new_v4(), course.id, instructor.id, true)
        .await
        .unwrap();
    assert_eq!(
        courses.assignments_handle().lock().unwrap().clone(),
        vec![(course.id, instructor.id, true)]
    );

    let result = usecase
        .assign(Uuid::new_v4(), course.id, instructor.id, false)
        .await;
    assert!(
        matches!(result, Err(PortalError::AlreadyAssigned)),
        "expected AlreadyAssigned, got {result:?}"
    );

    usecase
        .unassign(Uuid::new_v4(), course.id, instructor.id)
        .await
        .unwrap();
    assert!(courses.assignments_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_only_assign_instructors() {
    let course = test_course("CS101", Uuid::new_v4(), Uuid::new_v4(), vec![]);
    let student = test_user(UserRole::Student, AccountStatus::Active);
    let usecase = AssignInstructorUseCase {
        courses: MockCourseRepo::new(vec![course.clone()]),
        users: MockUserRepo::new(vec![student.clone()]),
        audit: MockAuditRepo::empty(),
    };

    let result = usecase
        .assign(Uuid::new_v4(), course.id, student.id, false)
        .await;
    assert!(
        matches!(result, Err(PortalError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );

    let result = usecase
        .unassign(Uuid::new_v4(), course.id, student.id)
        .await;
    assert!(
        matches!(result, Err(PortalError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}
