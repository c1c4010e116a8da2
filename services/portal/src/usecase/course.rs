use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::UserRole;

use crate::domain::academic::{
    Course, CourseBucket, CourseFilter, CourseInstructor, CoursePlacement, DEFAULT_CREDIT_HOURS,
    StudentPlacement, classify_course,
};
use crate::domain::lecture_file::{FileType, LectureFile};
use crate::domain::repository::{
    AuditRepository, CourseRepository, LectureFileRepository, LevelRepository, MajorRepository,
    SemesterRepository, UserRepository,
};
use crate::domain::types::{Actor, AuditAction, AuditEntry};
use crate::error::PortalError;

/// What a caller may do with a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAccess {
    /// Admin, or an instructor assigned to the course.
    Manage,
    /// Student whose major is linked to the course.
    Read,
}

impl CourseAccess {
    pub fn can_manage(self) -> bool {
        self == Self::Manage
    }
}

pub async fn course_access<C: CourseRepository, U: UserRepository>(
    courses: &C,
    users: &U,
    actor: &Actor,
    course: &Course,
) -> Result<CourseAccess, PortalError> {
    match actor.role {
        UserRole::Admin => Ok(CourseAccess::Manage),
        UserRole::Instructor => {
            if courses.is_assigned(course.id, actor.user_id).await? {
                Ok(CourseAccess::Manage)
            } else {
                Err(PortalError::Forbidden)
            }
        }
        UserRole::Student => {
            let user = users
                .find_by_id(actor.user_id)
                .await?
                .ok_or(PortalError::UserNotFound)?;
            if user
                .major_id
                .is_some_and(|major| course.major_ids.contains(&major))
            {
                Ok(CourseAccess::Read)
            } else {
                Err(PortalError::Forbidden)
            }
        }
    }
}

// ── Admin: list / create / update ─────────────────────────────────────────────

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn execute(
        &self,
        filter: CourseFilter,
        page: PageRequest,
    ) -> Result<Page<Course>, PortalError> {
        self.courses.list(&filter, page).await
    }
}

#[derive(Debug, Clone)]
pub struct CourseInput {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub level_id: Uuid,
    pub semester_id: Uuid,
    /// Defaults to 3.
    pub credit_hours: Option<i32>,
    pub is_active: bool,
    pub major_ids: Vec<Uuid>,
}

pub struct SaveCourseUseCase<C, L, S, M, A>
where
    C: CourseRepository,
    L: LevelRepository,
    S: SemesterRepository,
    M: MajorRepository,
    A: AuditRepository,
{
    pub courses: C,
    pub levels: L,
    pub semesters: S,
    pub majors: M,
    pub audit: A,
}

impl<C, L, S, M, A> SaveCourseUseCase<C, L, S, M, A>
where
    C: CourseRepository,
    L: LevelRepository,
    S: SemesterRepository,
    M: MajorRepository,
    A: AuditRepository,
{
    async fn validate(&self, input: &mut CourseInput) -> Result<(), PortalError> {
        input.name = input.name.trim().to_owned();
        input.code = input.code.trim().to_uppercase();
        if input.name.is_empty() || input.code.is_empty() {
            return Err(PortalError::Validation(
                "course name and code are required".into(),
            ));
        }
        if input.credit_hours.is_some_and(|h| !(1..=12).contains(&h)) {
            return Err(PortalError::Validation(
                "credit hours must be between 1 and 12".into(),
            ));
        }
        self.levels
            .find_by_id(input.level_id)
            .await?
            .ok_or(PortalError::LevelNotFound)?;
        self.semesters
            .find_by_id(input.semester_id)
            .await?
            .ok_or(PortalError::SemesterNotFound)?;

        input.major_ids.sort_unstable();
        input.major_ids.dedup();
        for major_id in &input.major_ids {
            self.majors
                .find_by_id(*major_id)
                .await?
                .ok_or(PortalError::MajorNotFound)?;
        }
        Ok(())
    }

    pub async fn create(&self, actor: Uuid, mut input: CourseInput) -> Result<Course, PortalError> {
        self.validate(&mut input).await?;
        if self.courses.code_taken(&input.code, None).await? {
            return Err(PortalError::CourseCodeTaken);
        }

        let now = Utc::now();
        let course = Course {
            id: Uuid::now_v7(),
            name: input.name,
            code: input.code,
            description: input.description,
            level_id: input.level_id,
            semester_id: input.semester_id,
            credit_hours: input.credit_hours.unwrap_or(DEFAULT_CREDIT_HOURS),
            is_active: input.is_active,
            major_ids: input.major_ids,
            created_at: now,
            updated_at: now,
        };
        self.courses.create(&course).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Create, "Course")
                    .object(course.id, course.code.clone()),
            )
            .await?;
        Ok(course)
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        mut input: CourseInput,
    ) -> Result<Course, PortalError> {
        let mut course = self
            .courses
            .find_by_id(id)
            .await?
            .ok_or(PortalError::CourseNotFound)?;
        self.validate(&mut input).await?;
        if self.courses.code_taken(&input.code, Some(id)).await? {
            return Err(PortalError::CourseCodeTaken);
        }

        course.name = input.name;
        course.code = input.code;
        course.description = input.description;
        course.level_id = input.level_id;
        course.semester_id = input.semester_id;
        course.credit_hours = input.credit_hours.unwrap_or(course.credit_hours);
        course.is_active = input.is_active;
        course.major_ids = input.major_ids;
        course.updated_at = Utc::now();

        self.courses.update(&course).await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Course")
                    .object(course.id, course.code.clone()),
            )
            .await?;
        Ok(course)
    }
}

// ── Admin: instructor assignment ──────────────────────────────────────────────

pub struct AssignInstructorUseCase<C: CourseRepository, U: UserRepository, A: AuditRepository> {
    pub courses: C,
    pub users: U,
    pub audit: A,
}

impl<C: CourseRepository, U: UserRepository, A: AuditRepository> AssignInstructorUseCase<C, U, A> {
    pub async fn assign(
        &self,
        actor: Uuid,
        course_id: Uuid,
        instructor_id: Uuid,
        is_primary: bool,
    ) -> Result<(), PortalError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(PortalError::CourseNotFound)?;
        self.users
            .find_by_id(instructor_id)
            .await?
            .filter(|u| u.role == UserRole::Instructor)
            .ok_or(PortalError::UserNotFound)?;
        if self.courses.is_assigned(course_id, instructor_id).await? {
            return Err(PortalError::AlreadyAssigned);
        }

        self.courses
            .assign(course_id, instructor_id, is_primary)
            .await?;
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Course")
                    .object(course.id, course.code)
                    .changes(serde_json::json!({
                        "assigned_instructor": instructor_id,
                        "is_primary": is_primary,
                    })),
            )
            .await
    }

    pub async fn unassign(
        &self,
        actor: Uuid,
        course_id: Uuid,
        instructor_id: Uuid,
    ) -> Result<(), PortalError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(PortalError::CourseNotFound)?;
        if !self.courses.unassign(course_id, instructor_id).await? {
            return Err(PortalError::UserNotFound);
        }
        self.audit
            .record_audit(
                &AuditEntry::new(Some(actor), AuditAction::Update, "Course")
                    .object(course.id, course.code)
                    .changes(serde_json::json!({ "unassigned_instructor": instructor_id })),
            )
            .await
    }
}

// ── Student: current / archived courses ───────────────────────────────────────

pub struct StudentCoursesUseCase<C, U, L, S>
where
    C: CourseRepository,
    U: UserRepository,
    L: LevelRepository,
    S: SemesterRepository,
{
    pub courses: C,
    pub users: U,
    pub levels: L,
    pub semesters: S,
}

impl<C, U, L, S> StudentCoursesUseCase<C, U, L, S>
where
    C: CourseRepository,
    U: UserRepository,
    L: LevelRepository,
    S: SemesterRepository,
{
    pub async fn execute(&self, student_id: Uuid, archived: bool) -> Result<Vec<Course>, PortalError> {
        let user = self
            .users
            .find_by_id(student_id)
            .await?
            .ok_or(PortalError::UserNotFound)?;
        let (Some(major_id), Some(level_id)) = (user.major_id, user.level_id) else {
            return Ok(Vec::new());
        };

        let ranks: HashMap<Uuid, i32> = self
            .levels
            .list()
            .await?
            .into_iter()
            .map(|l| (l.id, l.number))
            .collect();
        let Some(&level_rank) = ranks.get(&level_id) else {
            return Ok(Vec::new());
        };
        let student = StudentPlacement {
            major_id,
            level_rank,
        };

        let current = self.semesters.find_current().await?;
        let current_id = current.as_ref().map(|s| s.id);
        let wanted = if archived {
            CourseBucket::Archived
        } else {
            CourseBucket::Current
        };

        let courses = self.courses.list_active_for_major(major_id).await?;
        Ok(courses
            .into_iter()
            .filter(|course| {
                let Some(&course_rank) = ranks.get(&course.level_id) else {
                    return false;
                };
                let placement = CoursePlacement {
                    is_active: course.is_active,
                    level_rank: course_rank,
                    semester_is_current: current_id == Some(course.semester_id),
                    linked_to_major: course.major_ids.contains(&student.major_id),
                };
                classify_course(&placement, &student, current.is_some()) == Some(wanted)
            })
            .collect())
    }
}

// ── Instructor: assigned courses ──────────────────────────────────────────────

pub struct InstructorCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> InstructorCoursesUseCase<C> {
    pub async fn execute(&self, instructor_id: Uuid) -> Result<Vec<Course>, PortalError> {
        self.courses.list_for_instructor(instructor_id).await
    }
}

// ── Course detail ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CourseDetail {
    pub course: Course,
    pub access: CourseAccess,
    pub instructors: Vec<CourseInstructor>,
    pub files: BTreeMap<FileType, Vec<LectureFile>>,
}

pub struct CourseDetailUseCase<C, U, F>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
{
    pub courses: C,
    pub users: U,
    pub files: F,
}

impl<C, U, F> CourseDetailUseCase<C, U, F>
where
    C: CourseRepository,
    U: UserRepository,
    F: LectureFileRepository,
{
    pub async fn execute(&self, actor: &Actor, course_id: Uuid) -> Result<CourseDetail, PortalError> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or(PortalError::CourseNotFound)?;
        let access = course_access(&self.courses, &self.users, actor, &course).await?;

        let instructors = self.courses.instructors(course.id).await?;
        let mut files: BTreeMap<FileType, Vec<LectureFile>> = BTreeMap::new();
        for file in self
            .files
            .list_for_course(course.id, access.can_manage(), None)
            .await?
        {
            files.entry(file.file_type).or_default().push(file);
        }

        Ok(CourseDetail {
            course,
            access,
            instructors,
            files,
        })
    }
}
