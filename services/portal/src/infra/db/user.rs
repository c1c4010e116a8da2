use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use sacm_core::sea_ext::{OffsetPage, contains_ci};
use sacm_domain::pagination::{Page, PageRequest};
use sacm_domain::user::{AccountStatus, UserRole};
use sacm_portal_schema::{levels, majors, users};

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserFilter, UserProfile, UserStats};
use crate::error::PortalError;

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

fn lower_email_eq(email: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(users::Column::Email))).eq(email.trim().to_lowercase())
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_academic_id(&self, academic_id: &str) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(users::Column::AcademicId.eq(academic_id))
            .one(&self.db)
            .await
            .context("find user by academic id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_identity(
        &self,
        academic_id: &str,
        id_card_number: &str,
    ) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(users::Column::AcademicId.eq(academic_id))
            .filter(users::Column::IdCardNumber.eq(id_card_number))
            .one(&self.db)
            .await
            .context("find user by identity")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(lower_email_eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, PortalError> {
        let mut query = users::Entity::find().filter(lower_email_eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query.count(&self.db).await.context("check email taken")?;
        Ok(count > 0)
    }

    async fn id_card_taken(&self, id_card_number: &str) -> Result<bool, PortalError> {
        let count = users::Entity::find()
            .filter(users::Column::IdCardNumber.eq(id_card_number))
            .count(&self.db)
            .await
            .context("check id card taken")?;
        Ok(count > 0)
    }

    async fn create(&self, user: &User) -> Result<(), PortalError> {
        users::ActiveModel {
            id: Set(user.id),
            academic_id: Set(user.academic_id.clone()),
            id_card_number: Set(user.id_card_number.clone()),
            full_name: Set(user.full_name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            account_status: Set(user.status.as_str().to_owned()),
            major_id: Set(user.major_id),
            level_id: Set(user.level_id),
            phone_number: Set(user.phone_number.clone()),
            date_joined: Set(user.date_joined),
            last_login: Set(user.last_login),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, PortalError> {
        let PageRequest { per_page, page } = page.clamped();
        let mut query = users::Entity::find();
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(i16::from(role.as_u8())));
        }
        if let Some(major_id) = filter.major_id {
            query = query.filter(users::Column::MajorId.eq(major_id));
        }
        if let Some(level_id) = filter.level_id {
            query = query.filter(users::Column::LevelId.eq(level_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(users::Column::AccountStatus.eq(status.as_str()));
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(users::Column::AcademicId, search))
                    .add(contains_ci(users::Column::FullName, search))
                    .add(contains_ci(users::Column::Email, search)),
            );
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count users")?;
        let models = query
            .order_by_desc(users::Column::DateJoined)
            .offset_page(per_page, page)
            .all(&self.db)
            .await
            .context("list users")?;

        Ok(Page {
            items: models.into_iter().map(user_from_model).collect(),
            total,
            page,
            per_page,
        })
    }

    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, PortalError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for profile")?
        else {
            return Ok(None);
        };

        let major_name = match model.major_id {
            Some(major_id) => majors::Entity::find_by_id(major_id)
                .one(&self.db)
                .await
                .context("find profile major")?
                .map(|m| m.major_name),
            None => None,
        };
        let level_name = match model.level_id {
            Some(level_id) => levels::Entity::find_by_id(level_id)
                .one(&self.db)
                .await
                .context("find profile level")?
                .map(|l| l.level_name),
            None => None,
        };

        Ok(Some(UserProfile {
            user: user_from_model(model),
            major_name,
            level_name,
        }))
    }

    async fn update_contact(
        &self,
        id: Uuid,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<(), PortalError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(email) = email {
            am.email = Set(Some(email.to_owned()));
        }
        if let Some(phone) = phone_number {
            am.phone_number = Set((!phone.is_empty()).then(|| phone.to_owned()));
        }
        am.update(&self.db).await.context("update user contact")?;
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), PortalError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(Some(password_hash.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user password")?;
        Ok(())
    }

    async fn activate(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, PortalError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Email, Expr::value(email.to_owned()))
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash.to_owned()))
            .col_expr(
                users::Column::AccountStatus,
                Expr::value(AccountStatus::Active.as_str()),
            )
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::AccountStatus.eq(AccountStatus::Inactive.as_str()))
            .exec(&self.db)
            .await
            .context("activate user")?;
        Ok(result.rows_affected == 1)
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<(), PortalError> {
        users::ActiveModel {
            id: Set(id),
            account_status: Set(status.as_str().to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user status")?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError> {
        users::ActiveModel {
            id: Set(id),
            last_login: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record user login")?;
        Ok(())
    }

    async fn promote(
        &self,
        from_level: Uuid,
        to_level: Uuid,
        major_id: Option<Uuid>,
    ) -> Result<u64, PortalError> {
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::LevelId, Expr::value(to_level))
            .filter(users::Column::Role.eq(i16::from(UserRole::Student.as_u8())))
            .filter(users::Column::AccountStatus.eq(AccountStatus::Active.as_str()))
            .filter(users::Column::LevelId.eq(from_level));
        if let Some(major_id) = major_id {
            update = update.filter(users::Column::MajorId.eq(major_id));
        }
        let result = update.exec(&self.db).await.context("promote students")?;
        Ok(result.rows_affected)
    }

    async fn count_active_students_by_level(&self) -> Result<Vec<(Uuid, u64)>, PortalError> {
        let rows: Vec<(Option<Uuid>, i64)> = users::Entity::find()
            .select_only()
            .column(users::Column::LevelId)
            .column_as(Expr::col(users::Column::Id).count(), "count")
            .filter(users::Column::Role.eq(i16::from(UserRole::Student.as_u8())))
            .filter(users::Column::AccountStatus.eq(AccountStatus::Active.as_str()))
            .group_by(users::Column::LevelId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count active students by level")?;
        Ok(rows
            .into_iter()
            .filter_map(|(level_id, count)| level_id.map(|id| (id, count.max(0) as u64)))
            .collect())
    }

    async fn stats(&self) -> Result<UserStats, PortalError> {
        let total_users = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        let active_users = users::Entity::find()
            .filter(users::Column::AccountStatus.eq(AccountStatus::Active.as_str()))
            .count(&self.db)
            .await
            .context("count active users")?;
        let students = users::Entity::find()
            .filter(users::Column::Role.eq(i16::from(UserRole::Student.as_u8())))
            .count(&self.db)
            .await
            .context("count students")?;
        let instructors = users::Entity::find()
            .filter(users::Column::Role.eq(i16::from(UserRole::Instructor.as_u8())))
            .count(&self.db)
            .await
            .context("count instructors")?;
        Ok(UserStats {
            total_users,
            active_users,
            students,
            instructors,
        })
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        academic_id: model.academic_id,
        id_card_number: model.id_card_number,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or(UserRole::Student),
        status: model.account_status.parse().unwrap_or_default(),
        major_id: model.major_id,
        level_id: model.level_id,
        phone_number: model.phone_number,
        date_joined: model.date_joined,
        last_login: model.last_login,
    }
}
