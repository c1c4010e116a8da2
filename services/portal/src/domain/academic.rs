use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Major {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Study level. `number` is the rank compared for archival and promotion.
#[derive(Debug, Clone)]
pub struct Level {
    pub id: Uuid,
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone)]
pub struct Semester {
    pub id: Uuid,
    pub name: String,
    pub academic_year: String,
    pub number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

impl Semester {
    pub fn has_valid_dates(&self) -> bool {
        self.start_date < self.end_date
    }
}

#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub level_id: Uuid,
    pub semester_id: Uuid,
    pub credit_hours: i32,
    pub is_active: bool,
    pub major_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default credit hours for a new course.
pub const DEFAULT_CREDIT_HOURS: i32 = 3;

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub level_id: Option<Uuid>,
    pub semester_id: Option<Uuid>,
    pub major_id: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of course name or code.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CourseInstructor {
    pub instructor_id: Uuid,
    pub full_name: String,
    pub is_primary: bool,
}

/// Where a student sits: their major and the rank of their level.
#[derive(Debug, Clone, Copy)]
pub struct StudentPlacement {
    pub major_id: Uuid,
    pub level_rank: i32,
}

/// Where a course sits relative to the current academic state.
#[derive(Debug, Clone, Copy)]
pub struct CoursePlacement {
    pub is_active: bool,
    pub level_rank: i32,
    pub semester_is_current: bool,
    pub linked_to_major: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseBucket {
    Current,
    Archived,
}

/// Classify a course for a student.
///
/// Current: taught this semester at the student's level.
/// Archived: a lower level, from a past semester. Needs a current semester to exist.
pub fn classify_course(
    course: &CoursePlacement,
    student: &StudentPlacement,
    current_semester_exists: bool,
) -> Option<CourseBucket> {
    if !course.is_active || !course.linked_to_major {
        return None;
    }
    if course.semester_is_current && course.level_rank == student.level_rank {
        return Some(CourseBucket::Current);
    }
    if current_semester_exists
        && !course.semester_is_current
        && course.level_rank < student.level_rank
    {
        return Some(CourseBucket::Archived);
    }
    None
}

/// Promotion moves students strictly upward.
pub fn is_valid_promotion(from: &Level, to: &Level) -> bool {
    to.number > from.number
}
