#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::{AccountStatus, UserRole};

use sacm_portal::domain::academic::{Course, CourseFilter, CourseInstructor, Level, Major, Semester};
use sacm_portal::domain::lecture_file::{FileContent, FileType, LectureFile};
use sacm_portal::domain::repository::{
    ActivationStore, AuditRepository, CourseRepository, FileCounter, LanguageModel,
    LectureFileRepository, LevelRepository, MajorRepository, NotificationRepository,
    PasswordResetRepository, SemesterRepository, StudyAidRepository, UserRepository,
    VerificationCodeRepository,
};
use sacm_portal::domain::study_aid::{
    ChatExchange, SavedQuestions, SavedSummary, SavedTotals, UsageRecord,
};
use sacm_portal::domain::types::{
    Activity, ActivationSession, AuditAction, AuditEntry, InboxItem, OutboxEvent,
    PasswordResetToken, User, UserFilter, UserProfile, UserStats, VerificationCode,
};
use sacm_portal::error::PortalError;
use sacm_portal::infra::password::hash_password_blocking;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
pub const TEST_PASSWORD: &str = "correct horse battery";

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let page = page.clamped();
    let total = items.len() as u64;
    let skip = ((page.page - 1) * page.per_page) as usize;
    Page {
        items: items
            .into_iter()
            .skip(skip)
            .take(page.per_page as usize)
            .collect(),
        total,
        page: page.page,
        per_page: page.per_page,
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    pub fn get(&self, id: Uuid) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .unwrap()
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut User)) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            f(user);
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_academic_id(&self, academic_id: &str) -> Result<Option<User>, PortalError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.academic_id == academic_id)
            .cloned())
    }

    async fn find_by_identity(
        &self,
        academic_id: &str,
        id_card_number: &str,
    ) -> Result<Option<User>, PortalError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.academic_id == academic_id && u.id_card_number == id_card_number)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        Ok(self.users.lock().unwrap().iter().any(|u| {
            Some(u.id) != except
                && u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn id_card_taken(&self, id_card_number: &str) -> Result<bool, PortalError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.id_card_number == id_card_number))
    }

    async fn create(&self, user: &User) -> Result<(), PortalError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, PortalError> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter.role.is_none_or(|r| u.role == r))
            .filter(|u| filter.status.is_none_or(|s| u.status == s))
            .filter(|u| filter.major_id.is_none_or(|m| u.major_id == Some(m)))
            .filter(|u| filter.level_id.is_none_or(|l| u.level_id == Some(l)))
            .filter(|u| {
                filter.search.as_deref().is_none_or(|needle| {
                    let needle = needle.to_lowercase();
                    u.academic_id.to_lowercase().contains(&needle)
                        || u.full_name.to_lowercase().contains(&needle)
                        || u.email
                            .as_deref()
                            .is_some_and(|e| e.to_lowercase().contains(&needle))
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
        Ok(paginate(users, page))
    }

    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, PortalError> {
        Ok(self.find_by_id(id).await?.map(|user| UserProfile {
            user,
            major_name: None,
            level_name: None,
        }))
    }

    async fn update_contact(
        &self,
        id: Uuid,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<(), PortalError> {
        self.update(id, |u| {
            if let Some(email) = email {
                u.email = Some(email.to_owned());
            }
            if let Some(phone) = phone_number {
                u.phone_number = (!phone.is_empty()).then(|| phone.to_owned());
            }
        });
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), PortalError> {
        self.update(id, |u| u.password_hash = Some(password_hash.to_owned()));
        Ok(())
    }

    async fn activate(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, PortalError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users
            .iter_mut()
            .find(|u| u.id == id && u.status == AccountStatus::Inactive)
        else {
            return Ok(false);
        };
        user.email = Some(email.to_owned());
        user.password_hash = Some(password_hash.to_owned());
        user.status = AccountStatus::Active;
        Ok(true)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<(), PortalError> {
        self.update(id, |u| u.status = status);
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError> {
        self.update(id, |u| u.last_login = Some(at));
        Ok(())
    }

    async fn promote(
        &self,
        from_level: Uuid,
        to_level: Uuid,
        major_id: Option<Uuid>,
    ) -> Result<u64, PortalError> {
        let mut moved = 0;
        for user in self.users.lock().unwrap().iter_mut() {
            if user.role == UserRole::Student
                && user.status == AccountStatus::Active
                && user.level_id == Some(from_level)
                && major_id.is_none_or(|m| user.major_id == Some(m))
            {
                user.level_id = Some(to_level);
                moved += 1;
            }
        }
        Ok(moved)
    }

    async fn count_active_students_by_level(&self) -> Result<Vec<(Uuid, u64)>, PortalError> {
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for user in self.users.lock().unwrap().iter() {
            if user.role != UserRole::Student || user.status != AccountStatus::Active {
                continue;
            }
            if let Some(level) = user.level_id {
                *counts.entry(level).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn stats(&self) -> Result<UserStats, PortalError> {
        let users = self.users.lock().unwrap();
        Ok(UserStats {
            total_users: users.len() as u64,
            active_users: users.iter().filter(|u| u.status.is_active()).count() as u64,
            students: users.iter().filter(|u| u.role == UserRole::Student).count() as u64,
            instructors: users
                .iter()
                .filter(|u| u.role == UserRole::Instructor)
                .count() as u64,
        })
    }
}

// ── MockVerificationCodeRepo ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockVerificationCodeRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    /// Failed attempts other requests land between this request's read and its claim.
    pub interleaved_failures: Arc<Mutex<i32>>,
    /// Another request claims the code between this request's read and its claim.
    pub interleaved_claim: Arc<Mutex<bool>>,
}

impl MockVerificationCodeRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn interleave_failures(&self, count: i32) {
        *self.interleaved_failures.lock().unwrap() = count;
    }

    pub fn interleave_claim(&self) {
        *self.interleaved_claim.lock().unwrap() = true;
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<VerificationCode>>> {
        Arc::clone(&self.codes)
    }

    pub fn events_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.events)
    }
}

impl VerificationCodeRepository for MockVerificationCodeRepo {
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), PortalError> {
        self.codes.lock().unwrap().push(code.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<VerificationCode>, PortalError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.user_id == user_id && c.email == email && c.used_at.is_none())
            .cloned())
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), PortalError> {
        if let Some(c) = self.codes.lock().unwrap().iter_mut().find(|c| c.id == id) {
            c.attempts += 1;
        }
        Ok(())
    }

    async fn claim(&self, id: Uuid) -> Result<bool, PortalError> {
        let mut codes = self.codes.lock().unwrap();
        let Some(c) = codes.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        c.attempts += std::mem::take(&mut *self.interleaved_failures.lock().unwrap());
        if std::mem::take(&mut *self.interleaved_claim.lock().unwrap()) {
            c.used_at = Some(Utc::now());
        }
        if !c.is_valid() {
            return Ok(false);
        }
        c.used_at = Some(Utc::now());
        Ok(true)
    }
}

// ── MockActivationStore ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockActivationStore {
    pub sessions: Arc<Mutex<HashMap<String, ActivationSession>>>,
}

impl MockActivationStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_session(session_id: &str, session: ActivationSession) -> Self {
        let store = Self::default();
        store
            .sessions
            .lock()
            .unwrap()
            .insert(session_id.to_owned(), session);
        store
    }

    pub fn sessions_handle(&self) -> Arc<Mutex<HashMap<String, ActivationSession>>> {
        Arc::clone(&self.sessions)
    }
}

impl ActivationStore for MockActivationStore {
    async fn save(
        &self,
        session_id: &str,
        session: &ActivationSession,
    ) -> Result<(), PortalError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_owned(), session.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<ActivationSession>, PortalError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn clear(&self, session_id: &str) -> Result<(), PortalError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

// ── MockPasswordResetRepo ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPasswordResetRepo {
    pub tokens: Arc<Mutex<Vec<PasswordResetToken>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    /// `(user_id, new password hash)` per successful consume.
    pub consumed: Arc<Mutex<Vec<(Uuid, String)>>>,
}

impl MockPasswordResetRepo {
    pub fn new(tokens: Vec<PasswordResetToken>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tokens_handle(&self) -> Arc<Mutex<Vec<PasswordResetToken>>> {
        Arc::clone(&self.tokens)
    }

    pub fn events_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn consumed_handle(&self) -> Arc<Mutex<Vec<(Uuid, String)>>> {
        Arc::clone(&self.consumed)
    }
}

impl PasswordResetRepository for MockPasswordResetRepo {
    async fn create_with_outbox(
        &self,
        token: &PasswordResetToken,
        event: &OutboxEvent,
    ) -> Result<(), PortalError> {
        self.tokens.lock().unwrap().push(token.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>, PortalError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn consume(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, PortalError> {
        let mut tokens = self.tokens.lock().unwrap();
        let Some(token) = tokens
            .iter_mut()
            .find(|t| t.id == token_id && t.used_at.is_none())
        else {
            return Ok(false);
        };
        token.used_at = Some(Utc::now());
        self.consumed
            .lock()
            .unwrap()
            .push((user_id, password_hash.to_owned()));
        Ok(true)
    }
}

// ── MockMajorRepo / MockLevelRepo / MockSemesterRepo ─────────────────────────

#[derive(Clone, Default)]
pub struct MockMajorRepo {
    pub majors: Arc<Mutex<Vec<Major>>>,
}

impl MockMajorRepo {
    pub fn new(majors: Vec<Major>) -> Self {
        Self {
            majors: Arc::new(Mutex::new(majors)),
        }
    }

    pub fn majors_handle(&self) -> Arc<Mutex<Vec<Major>>> {
        Arc::clone(&self.majors)
    }
}

impl MajorRepository for MockMajorRepo {
    async fn list(&self, active_only: bool) -> Result<Vec<Major>, PortalError> {
        Ok(self
            .majors
            .lock()
            .unwrap()
            .iter()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Major>, PortalError> {
        Ok(self.majors.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Major>, PortalError> {
        Ok(self
            .majors
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create(&self, major: &Major) -> Result<(), PortalError> {
        self.majors.lock().unwrap().push(major.clone());
        Ok(())
    }

    async fn update(&self, major: &Major) -> Result<(), PortalError> {
        let mut majors = self.majors.lock().unwrap();
        if let Some(m) = majors.iter_mut().find(|m| m.id == major.id) {
            *m = major.clone();
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockLevelRepo {
    pub levels: Arc<Mutex<Vec<Level>>>,
}

impl MockLevelRepo {
    pub fn new(levels: Vec<Level>) -> Self {
        Self {
            levels: Arc::new(Mutex::new(levels)),
        }
    }
}

impl LevelRepository for MockLevelRepo {
    async fn list(&self) -> Result<Vec<Level>, PortalError> {
        let mut levels = self.levels.lock().unwrap().clone();
        levels.sort_by_key(|l| l.number);
        Ok(levels)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Level>, PortalError> {
        Ok(self.levels.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Level>, PortalError> {
        Ok(self
            .levels
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_by_number(&self, number: i32) -> Result<Option<Level>, PortalError> {
        Ok(self
            .levels
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.number == number)
            .cloned())
    }

    async fn create(&self, level: &Level) -> Result<(), PortalError> {
        self.levels.lock().unwrap().push(level.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockSemesterRepo {
    pub semesters: Arc<Mutex<Vec<Semester>>>,
}

impl MockSemesterRepo {
    pub fn new(semesters: Vec<Semester>) -> Self {
        Self {
            semesters: Arc::new(Mutex::new(semesters)),
        }
    }

    pub fn semesters_handle(&self) -> Arc<Mutex<Vec<Semester>>> {
        Arc::clone(&self.semesters)
    }

    fn clear_current_except(semesters: &mut [Semester], id: Uuid) {
        for s in semesters.iter_mut().filter(|s| s.id != id) {
            s.is_current = false;
        }
    }
}

impl SemesterRepository for MockSemesterRepo {
    async fn list(&self) -> Result<Vec<Semester>, PortalError> {
        let mut semesters = self.semesters.lock().unwrap().clone();
        semesters.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(semesters)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Semester>, PortalError> {
        Ok(self
            .semesters
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_current(&self) -> Result<Option<Semester>, PortalError> {
        Ok(self
            .semesters
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.is_current)
            .cloned())
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        Ok(self
            .semesters
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.name == name && Some(s.id) != except))
    }

    async fn create(&self, semester: &Semester) -> Result<(), PortalError> {
        let mut semesters = self.semesters.lock().unwrap();
        if semester.is_current {
            Self::clear_current_except(&mut semesters, semester.id);
        }
        semesters.push(semester.clone());
        Ok(())
    }

    async fn update(&self, semester: &Semester) -> Result<(), PortalError> {
        let mut semesters = self.semesters.lock().unwrap();
        if semester.is_current {
            Self::clear_current_except(&mut semesters, semester.id);
        }
        if let Some(s) = semesters.iter_mut().find(|s| s.id == semester.id) {
            *s = semester.clone();
        }
        Ok(())
    }

    async fn set_current(&self, id: Uuid) -> Result<(), PortalError> {
        let mut semesters = self.semesters.lock().unwrap();
        Self::clear_current_except(&mut semesters, id);
        if let Some(s) = semesters.iter_mut().find(|s| s.id == id) {
            s.is_current = true;
        }
        Ok(())
    }
}

// ── MockCourseRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCourseRepo {
    pub courses: Arc<Mutex<Vec<Course>>>,
    /// `(course_id, instructor_id, is_primary)`
    pub assignments: Arc<Mutex<Vec<(Uuid, Uuid, bool)>>>,
}

impl MockCourseRepo {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(Mutex::new(courses)),
            ..Self::default()
        }
    }

    pub fn with_assignment(self, course_id: Uuid, instructor_id: Uuid) -> Self {
        self.assignments
            .lock()
            .unwrap()
            .push((course_id, instructor_id, true));
        self
    }

    pub fn courses_handle(&self) -> Arc<Mutex<Vec<Course>>> {
        Arc::clone(&self.courses)
    }

    pub fn assignments_handle(&self) -> Arc<Mutex<Vec<(Uuid, Uuid, bool)>>> {
        Arc::clone(&self.assignments)
    }
}

impl CourseRepository for MockCourseRepo {
    async fn list(
        &self,
        filter: &CourseFilter,
        page: PageRequest,
    ) -> Result<Page<Course>, PortalError> {
        let mut courses: Vec<Course> = self
            .courses
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.level_id.is_none_or(|l| c.level_id == l))
            .filter(|c| filter.semester_id.is_none_or(|s| c.semester_id == s))
            .filter(|c| filter.major_id.is_none_or(|m| c.major_ids.contains(&m)))
            .filter(|c| filter.is_active.is_none_or(|a| c.is_active == a))
            .filter(|c| {
                filter.search.as_deref().is_none_or(|needle| {
                    let needle = needle.to_lowercase();
                    c.name.to_lowercase().contains(&needle)
                        || c.code.to_lowercase().contains(&needle)
                })
            })
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(paginate(courses, page))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, PortalError> {
        Ok(self.courses.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn code_taken(&self, code: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.code == code && Some(c.id) != except))
    }

    async fn create(&self, course: &Course) -> Result<(), PortalError> {
        self.courses.lock().unwrap().push(course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), PortalError> {
        let mut courses = self.courses.lock().unwrap();
        if let Some(c) = courses.iter_mut().find(|c| c.id == course.id) {
            *c = course.clone();
        }
        Ok(())
    }

    async fn list_active_for_major(&self, major_id: Uuid) -> Result<Vec<Course>, PortalError> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active && c.major_ids.contains(&major_id))
            .cloned()
            .collect())
    }

    async fn list_for_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, PortalError> {
        let assigned: Vec<Uuid> = self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, i, _)| *i == instructor_id)
            .map(|(c, _, _)| *c)
            .collect();
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active && assigned.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn instructors(&self, course_id: Uuid) -> Result<Vec<CourseInstructor>, PortalError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _, _)| *c == course_id)
            .map(|(_, instructor_id, is_primary)| CourseInstructor {
                instructor_id: *instructor_id,
                full_name: format!("Instructor {instructor_id}"),
                is_primary: *is_primary,
            })
            .collect())
    }

    async fn is_assigned(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
    ) -> Result<bool, PortalError> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .any(|(c, i, _)| *c == course_id && *i == instructor_id))
    }

    async fn assign(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
        is_primary: bool,
    ) -> Result<(), PortalError> {
        self.assignments
            .lock()
            .unwrap()
            .push((course_id, instructor_id, is_primary));
        Ok(())
    }

    async fn unassign(&self, course_id: Uuid, instructor_id: Uuid) -> Result<bool, PortalError> {
        let mut assignments = self.assignments.lock().unwrap();
        let before = assignments.len();
        assignments.retain(|(c, i, _)| !(*c == course_id && *i == instructor_id));
        Ok(assignments.len() < before)
    }
}

// ── MockLectureFileRepo ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLectureFileRepo {
    pub files: Arc<Mutex<Vec<LectureFile>>>,
}

impl MockLectureFileRepo {
    pub fn new(files: Vec<LectureFile>) -> Self {
        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn files_handle(&self) -> Arc<Mutex<Vec<LectureFile>>> {
        Arc::clone(&self.files)
    }
}

impl LectureFileRepository for MockLectureFileRepo {
    async fn create(&self, file: &LectureFile) -> Result<(), PortalError> {
        self.files.lock().unwrap().push(file.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LectureFile>, PortalError> {
        Ok(self.files.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }

    async fn list_for_course(
        &self,
        course_id: Uuid,
        include_hidden: bool,
        file_type: Option<FileType>,
    ) -> Result<Vec<LectureFile>, PortalError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.course_id == course_id && !f.is_deleted())
            .filter(|f| include_hidden || f.is_visible)
            .filter(|f| file_type.is_none_or(|t| f.file_type == t))
            .cloned()
            .collect())
    }

    async fn save(&self, file: &LectureFile) -> Result<(), PortalError> {
        let mut files = self.files.lock().unwrap();
        if let Some(f) = files.iter_mut().find(|f| f.id == file.id) {
            *f = file.clone();
        }
        Ok(())
    }

    async fn increment(&self, id: Uuid, counter: FileCounter) -> Result<(), PortalError> {
        if let Some(f) = self.files.lock().unwrap().iter_mut().find(|f| f.id == id) {
            match counter {
                FileCounter::Download => f.download_count += 1,
                FileCounter::View => f.view_count += 1,
            }
        }
        Ok(())
    }
}

// ── MockAuditRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAuditRepo {
    pub entries: Arc<Mutex<Vec<AuditEntry>>>,
    pub activities: Arc<Mutex<Vec<Activity>>>,
}

impl MockAuditRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries_handle(&self) -> Arc<Mutex<Vec<AuditEntry>>> {
        Arc::clone(&self.entries)
    }

    pub fn activities_handle(&self) -> Arc<Mutex<Vec<Activity>>> {
        Arc::clone(&self.activities)
    }
}

impl AuditRepository for MockAuditRepo {
    async fn record_audit(&self, entry: &AuditEntry) -> Result<(), PortalError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn record_activity(&self, activity: &Activity) -> Result<(), PortalError> {
        self.activities.lock().unwrap().push(activity.clone());
        Ok(())
    }

    async fn list_audit(
        &self,
        action: Option<AuditAction>,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, PortalError> {
        let entries: Vec<AuditEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| action.is_none_or(|a| e.action == a))
            .cloned()
            .collect();
        Ok(paginate(entries, page))
    }

    async fn list_activities(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Activity>, PortalError> {
        let activities: Vec<Activity> = self
            .activities
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(activities, page))
    }

    async fn recent_activities(&self, limit: u64) -> Result<Vec<Activity>, PortalError> {
        Ok(self
            .activities
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ── MockNotificationRepo ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockNotificationRepo {
    pub items: Arc<Mutex<Vec<InboxItem>>>,
}

impl MockNotificationRepo {
    pub fn new(items: Vec<InboxItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    pub fn items_handle(&self) -> Arc<Mutex<Vec<InboxItem>>> {
        Arc::clone(&self.items)
    }
}

impl NotificationRepository for MockNotificationRepo {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<InboxItem>, PortalError> {
        let mut items: Vec<InboxItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id && (!unread_only || !i.is_read))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, PortalError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id && !i.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items
            .iter_mut()
            .find(|i| i.user_id == user_id && i.notification_id == notification_id)
        else {
            return Ok(false);
        };
        if !item.is_read {
            item.is_read = true;
            item.read_at = Some(Utc::now());
        }
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, PortalError> {
        let mut changed = 0;
        for item in self
            .items
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|i| i.user_id == user_id && !i.is_read)
        {
            item.is_read = true;
            item.read_at = Some(Utc::now());
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, PortalError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !(i.user_id == user_id && i.notification_id == notification_id));
        Ok(items.len() < before)
    }
}

// ── MockStudyAidRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockStudyAidRepo {
    pub summaries: Arc<Mutex<Vec<SavedSummary>>>,
    pub questions: Arc<Mutex<Vec<SavedQuestions>>>,
    pub chats: Arc<Mutex<Vec<ChatExchange>>>,
    pub usage: Arc<Mutex<Vec<UsageRecord>>>,
}

impl MockStudyAidRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn usage_handle(&self) -> Arc<Mutex<Vec<UsageRecord>>> {
        Arc::clone(&self.usage)
    }

    pub fn chats_handle(&self) -> Arc<Mutex<Vec<ChatExchange>>> {
        Arc::clone(&self.chats)
    }

    pub fn summaries_handle(&self) -> Arc<Mutex<Vec<SavedSummary>>> {
        Arc::clone(&self.summaries)
    }

    pub fn questions_handle(&self) -> Arc<Mutex<Vec<SavedQuestions>>> {
        Arc::clone(&self.questions)
    }
}

impl StudyAidRepository for MockStudyAidRepo {
    async fn find_summary(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SavedSummary>, PortalError> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.file_id == file_id && s.user_id == user_id)
            .cloned())
    }

    async fn save_summary(&self, summary: &SavedSummary) -> Result<(), PortalError> {
        let mut summaries = self.summaries.lock().unwrap();
        summaries.retain(|s| !(s.file_id == summary.file_id && s.user_id == summary.user_id));
        summaries.push(summary.clone());
        Ok(())
    }

    async fn save_questions(&self, questions: &SavedQuestions) -> Result<(), PortalError> {
        self.questions.lock().unwrap().push(questions.clone());
        Ok(())
    }

    async fn list_questions(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<SavedQuestions>, PortalError> {
        let mut sets: Vec<SavedQuestions> = self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.file_id == file_id && q.user_id == user_id)
            .cloned()
            .collect();
        sets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sets)
    }

    async fn save_chat(&self, exchange: &ChatExchange) -> Result<(), PortalError> {
        self.chats.lock().unwrap().push(exchange.clone());
        Ok(())
    }

    async fn list_chats(
        &self,
        file_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ChatExchange>, PortalError> {
        let mut chats: Vec<ChatExchange> = self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.file_id == file_id && c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by_key(|c| c.created_at);
        Ok(chats)
    }

    async fn clear_chats(&self, file_id: Uuid, user_id: Uuid) -> Result<u64, PortalError> {
        let mut chats = self.chats.lock().unwrap();
        let before = chats.len();
        chats.retain(|c| !(c.file_id == file_id && c.user_id == user_id));
        Ok((before - chats.len()) as u64)
    }

    async fn saved_totals(&self, user_id: Uuid) -> Result<SavedTotals, PortalError> {
        Ok(SavedTotals {
            summaries: self
                .summaries
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .count() as u64,
            questions: self
                .questions
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.user_id == user_id)
                .count() as u64,
            chats: self
                .chats
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.user_id == user_id)
                .count() as u64,
        })
    }

    async fn count_usage_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.user_id == user_id && u.created_at >= since)
            .count() as u64)
    }

    async fn count_uncached_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, PortalError> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.user_id == user_id && !u.was_cached && u.created_at >= since)
            .count() as u64)
    }

    async fn log_usage(&self, record: &UsageRecord) -> Result<(), PortalError> {
        self.usage.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn recent_usage(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<UsageRecord>, PortalError> {
        let mut rows: Vec<UsageRecord> = self
            .usage
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

// ── MockLanguageModel ────────────────────────────────────────────────────────

/// Answers every prompt with `answer`, or fails when `answer` is `None`.
#[derive(Clone, Default)]
pub struct MockLanguageModel {
    pub answer: Option<String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLanguageModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_owned()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn prompts_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl LanguageModel for MockLanguageModel {
    fn model_name(&self) -> Option<&str> {
        self.answer.as_ref().map(|_| "mock-model")
    }

    async fn complete(
        &self,
        _system: &str,
        prompt: &str,
        _max_tokens: u32,
    ) -> Result<String, PortalError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.answer
            .clone()
            .ok_or_else(|| PortalError::Internal(anyhow::anyhow!("model unavailable")))
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

/// Argon2 is slow in debug builds; hash the shared test password once.
pub fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password_blocking(TEST_PASSWORD).unwrap())
        .clone()
}

pub fn test_user(role: UserRole, status: AccountStatus) -> User {
    let id = Uuid::new_v4();
    let mut user = User::new_inactive(
        format!("A{}", &id.simple().to_string()[..8]),
        format!("ID{}", &id.simple().to_string()[..10]),
        "Test User".to_owned(),
        role,
        None,
        None,
    );
    user.id = id;
    user.status = status;
    if status != AccountStatus::Inactive {
        user.email = Some(format!("{}@uni.example", user.academic_id.to_lowercase()));
        user.password_hash = Some(test_password_hash());
    }
    user
}

pub fn test_student(major_id: Uuid, level_id: Uuid) -> User {
    let mut user = test_user(UserRole::Student, AccountStatus::Active);
    user.major_id = Some(major_id);
    user.level_id = Some(level_id);
    user
}

pub fn test_major(name: &str) -> Major {
    Major {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn test_level(number: i32) -> Level {
    Level {
        id: Uuid::new_v4(),
        name: format!("Level {number}"),
        number,
    }
}

pub fn test_semester(name: &str, is_current: bool) -> Semester {
    Semester {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        academic_year: "2025/2026".to_owned(),
        number: 1,
        start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        is_current,
        created_at: Utc::now(),
    }
}

pub fn test_course(code: &str, level_id: Uuid, semester_id: Uuid, major_ids: Vec<Uuid>) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: format!("Course {code}"),
        code: code.to_owned(),
        description: None,
        level_id,
        semester_id,
        credit_hours: 3,
        is_active: true,
        major_ids,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_file(course_id: Uuid, uploader_id: Uuid, is_visible: bool) -> LectureFile {
    LectureFile {
        id: Uuid::new_v4(),
        course_id,
        uploader_id: Some(uploader_id),
        title: "Week 1".to_owned(),
        description: None,
        file_type: FileType::Lecture,
        content: FileContent::Local {
            storage_path: "courses/week1.pdf".to_owned(),
            file_name: "week1.pdf".to_owned(),
            file_size: 2048,
            extension: ".pdf".to_owned(),
            mime_type: "application/pdf".to_owned(),
        },
        is_visible,
        download_count: 0,
        view_count: 0,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_inbox_item(user_id: Uuid, is_read: bool) -> InboxItem {
    InboxItem {
        notification_id: Uuid::new_v4(),
        user_id,
        sender_id: None,
        title: "New file".to_owned(),
        body: "Week 1 slides are available".to_owned(),
        notification_type: "file_upload".to_owned(),
        course_id: None,
        file_id: None,
        is_read,
        read_at: None,
        created_at: Utc::now(),
    }
}
