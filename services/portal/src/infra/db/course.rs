use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::{Expr, Query, SelectStatement},
};
use uuid::Uuid;

use sacm_core::sea_ext::{OffsetPage, contains_ci};
use sacm_domain::pagination::{Page, PageRequest};
use sacm_portal_schema::{course_majors, courses, instructor_courses, users};

use crate::domain::academic::{Course, CourseFilter, CourseInstructor};
use crate::domain::repository::CourseRepository;
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

fn courses_of_major(major_id: Uuid) -> SelectStatement {
    Query::select()
        .column(course_majors::Column::CourseId)
        .from(course_majors::Entity)
        .and_where(Expr::col(course_majors::Column::MajorId).eq(major_id))
        .to_owned()
}

fn courses_of_instructor(instructor_id: Uuid) -> SelectStatement {
    Query::select()
        .column(instructor_courses::Column::CourseId)
        .from(instructor_courses::Entity)
        .and_where(Expr::col(instructor_courses::Column::InstructorId).eq(instructor_id))
        .to_owned()
}

async fn insert_major_links(
    txn: &DatabaseTransaction,
    course_id: Uuid,
    major_ids: &[Uuid],
) -> Result<(), sea_orm::DbErr> {
    if major_ids.is_empty() {
        return Ok(());
    }
    let links = major_ids.iter().map(|&major_id| course_majors::ActiveModel {
        course_id: Set(course_id),
        major_id: Set(major_id),
    });
    course_majors::Entity::insert_many(links).exec(txn).await?;
    Ok(())
}

impl DbCourseRepository {
    async fn with_majors(&self, models: Vec<courses::Model>) -> Result<Vec<Course>, PortalError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let links = course_majors::Entity::find()
            .filter(course_majors::Column::CourseId.is_in(models.iter().map(|m| m.id)))
            .all(&self.db)
            .await
            .context("load course majors")?;

        let mut by_course: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            by_course.entry(link.course_id).or_default().push(link.major_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let major_ids = by_course.remove(&m.id).unwrap_or_default();
                course_from_model(m, major_ids)
            })
            .collect())
    }
}

impl CourseRepository for DbCourseRepository {
    async fn list(
        &self,
        filter: &CourseFilter,
        page: PageRequest,
    ) -> Result<Page<Course>, PortalError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut query = courses::Entity::find();
        if let Some(level_id) = filter.level_id {
            query = query.filter(courses::Column::LevelId.eq(level_id));
        }
        if let Some(semester_id) = filter.semester_id {
            query = query.filter(courses::Column::SemesterId.eq(semester_id));
        }
        if let Some(major_id) = filter.major_id {
            query = query.filter(courses::Column::Id.in_subquery(courses_of_major(major_id)));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(courses::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(courses::Column::CourseName, search))
                    .add(contains_ci(courses::Column::CourseCode, search)),
            );
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count courses")?;
        let models = query
            .order_by_asc(courses::Column::CourseCode)
            .offset_page(per_page, page)
            .all(&self.db)
            .await
            .context("list courses")?;

        Ok(Page {
            items: self.with_majors(models).await?,
            total,
            page,
            per_page,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, PortalError> {
        let Some(model) = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_majors(vec![model]).await?.pop())
    }

    async fn code_taken(&self, code: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        let mut query = courses::Entity::find().filter(courses::Column::CourseCode.eq(code));
        if let Some(id) = except {
            query = query.filter(courses::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("check course code taken")?;
        Ok(count > 0)
    }

    async fn create(&self, course: &Course) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let course = course.clone();
                Box::pin(async move {
                    courses::ActiveModel {
                        id: Set(course.id),
                        course_name: Set(course.name),
                        course_code: Set(course.code),
                        description: Set(course.description),
                        level_id: Set(course.level_id),
                        semester_id: Set(course.semester_id),
                        credit_hours: Set(course.credit_hours),
                        is_active: Set(course.is_active),
                        created_at: Set(course.created_at),
                        updated_at: Set(course.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_major_links(txn, course.id, &course.major_ids).await?;
                    Ok(())
                })
            })
            .await
            .context("create course")?;
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let course = course.clone();
                Box::pin(async move {
                    courses::ActiveModel {
                        id: Set(course.id),
                        course_name: Set(course.name),
                        course_code: Set(course.code),
                        description: Set(course.description),
                        level_id: Set(course.level_id),
                        semester_id: Set(course.semester_id),
                        credit_hours: Set(course.credit_hours),
                        is_active: Set(course.is_active),
                        updated_at: Set(course.updated_at),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    course_majors::Entity::delete_many()
                        .filter(course_majors::Column::CourseId.eq(course.id))
                        .exec(txn)
                        .await?;
                    insert_major_links(txn, course.id, &course.major_ids).await?;
                    Ok(())
                })
            })
            .await
            .context("update course")?;
        Ok(())
    }

    async fn list_active_for_major(&self, major_id: Uuid) -> Result<Vec<Course>, PortalError> {
        let models = courses::Entity::find()
            .filter(courses::Column::IsActive.eq(true))
            .filter(courses::Column::Id.in_subquery(courses_of_major(major_id)))
            .order_by_asc(courses::Column::CourseCode)
            .all(&self.db)
            .await
            .context("list courses for major")?;
        self.with_majors(models).await
    }

    async fn list_for_instructor(&self, instructor_id: Uuid) -> Result<Vec<Course>, PortalError> {
        let models = courses::Entity::find()
            .filter(courses::Column::IsActive.eq(true))
            .filter(courses::Column::Id.in_subquery(courses_of_instructor(instructor_id)))
            .order_by_asc(courses::Column::CourseCode)
            .all(&self.db)
            .await
            .context("list courses for instructor")?;
        self.with_majors(models).await
    }

    async fn instructors(&self, course_id: Uuid) -> Result<Vec<CourseInstructor>, PortalError> {
        let assignments = instructor_courses::Entity::find()
            .filter(instructor_courses::Column::CourseId.eq(course_id))
            .order_by_desc(instructor_courses::Column::IsPrimary)
            .order_by_asc(instructor_courses::Column::AssignedAt)
            .all(&self.db)
            .await
            .context("list course assignments")?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(assignments.iter().map(|a| a.instructor_id)))
            .all(&self.db)
            .await
            .context("load course instructors")?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();

        Ok(assignments
            .into_iter()
            .filter_map(|a| {
                names.get(&a.instructor_id).map(|name| CourseInstructor {
                    instructor_id: a.instructor_id,
                    full_name: name.clone(),
                    is_primary: a.is_primary,
                })
            })
            .collect())
    }

    async fn is_assigned(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
    ) -> Result<bool, PortalError> {
        let found = instructor_courses::Entity::find_by_id((instructor_id, course_id))
            .one(&self.db)
            .await
            .context("check instructor assignment")?;
        Ok(found.is_some())
    }

    async fn assign(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
        is_primary: bool,
    ) -> Result<(), PortalError> {
        instructor_courses::ActiveModel {
            instructor_id: Set(instructor_id),
            course_id: Set(course_id),
            is_primary: Set(is_primary),
            assigned_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("assign instructor")?;
        Ok(())
    }

    async fn unassign(&self, course_id: Uuid, instructor_id: Uuid) -> Result<bool, PortalError> {
        let result = instructor_courses::Entity::delete_many()
            .filter(instructor_courses::Column::CourseId.eq(course_id))
            .filter(instructor_courses::Column::InstructorId.eq(instructor_id))
            .exec(&self.db)
            .await
            .context("unassign instructor")?;
        Ok(result.rows_affected > 0)
    }
}

fn course_from_model(model: courses::Model, major_ids: Vec<Uuid>) -> Course {
    Course {
        id: model.id,
        name: model.course_name,
        code: model.course_code,
        description: model.description,
        level_id: model.level_id,
        semester_id: model.semester_id,
        credit_hours: model.credit_hours,
        is_active: model.is_active,
        major_ids,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
