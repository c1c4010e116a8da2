//! Setup data: migrates the portal database and seeds the baseline rows a
//! fresh deployment needs before an admin can log in.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p sacm-setup-data -- --admin-password 'change me' --year 2026
//! ```
//!
//! Safe to re-run: existing levels, semesters, majors and the admin account
//! are left untouched.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set, sea_query::Expr,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use sacm_core::tracing::init_tracing;
use sacm_domain::user::UserRole;
use sacm_portal::infra::password::hash_password;
use sacm_portal_migration::Migrator;
use sacm_portal_schema::{levels, majors, semesters, users};

const LEVEL_COUNT: i32 = 8;

const MAJORS: [(&str, &str); 4] = [
    ("Computer Science", "Algorithms, systems and software"),
    ("Information Technology", "Networks, infrastructure and operations"),
    ("Information Systems", "Business information and data management"),
    ("Software Engineering", "Design, construction and maintenance of software"),
];

#[derive(Parser)]
#[command(about = "Migrate the portal database and seed baseline data")]
struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Password for the seeded `admin` account
    #[arg(long, env = "SETUP_ADMIN_PASSWORD")]
    admin_password: String,

    /// Email for the seeded `admin` account
    #[arg(long, default_value = "admin@sacm.local")]
    admin_email: String,

    /// Academic year the two seeded semesters belong to (e.g. 2026 → "2026/2027")
    #[arg(long)]
    year: Option<i32>,

    /// Skip running migrations
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let db = Database::connect(&args.database_url)
        .await
        .context("connect to database")?;

    if !args.skip_migrations {
        Migrator::up(&db, None).await.context("run migrations")?;
        info!("migrations applied");
    }

    let year = args
        .year
        .unwrap_or_else(|| chrono::Datelike::year(&Utc::now().date_naive()));

    seed_levels(&db).await?;
    seed_semesters(&db, year).await?;
    seed_majors(&db).await?;
    seed_admin(&db, &args.admin_email, &args.admin_password).await?;

    info!("setup data complete");
    Ok(())
}

async fn seed_levels(db: &DatabaseConnection) -> Result<()> {
    let mut created = 0;
    for number in 1..=LEVEL_COUNT {
        let exists = levels::Entity::find()
            .filter(levels::Column::LevelNumber.eq(number))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        levels::ActiveModel {
            id: Set(Uuid::now_v7()),
            level_name: Set(format!("Level {number}")),
            level_number: Set(number),
        }
        .insert(db)
        .await
        .with_context(|| format!("insert level {number}"))?;
        created += 1;
    }
    info!(created, "levels seeded");
    Ok(())
}

async fn seed_semesters(db: &DatabaseConnection, year: i32) -> Result<()> {
    let academic_year = format!("{year}/{}", year + 1);
    let terms = [
        (
            1,
            "First",
            date(year, 9, 1)?,
            date(year + 1, 1, 31)?,
        ),
        (
            2,
            "Second",
            date(year + 1, 2, 1)?,
            date(year + 1, 6, 30)?,
        ),
    ];

    for (number, label, start, end) in terms {
        let name = format!("{label} Semester {academic_year}");
        let exists = semesters::Entity::find()
            .filter(semesters::Column::Name.eq(name.as_str()))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        let is_current = number == 1;
        if is_current {
            semesters::Entity::update_many()
                .col_expr(semesters::Column::IsCurrent, Expr::value(false))
                .exec(db)
                .await
                .context("clear current semester")?;
        }
        semesters::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.clone()),
            academic_year: Set(academic_year.clone()),
            semester_number: Set(number),
            start_date: Set(start),
            end_date: Set(end),
            is_current: Set(is_current),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .with_context(|| format!("insert semester {name}"))?;
        info!(%name, is_current, "semester seeded");
    }
    Ok(())
}

async fn seed_majors(db: &DatabaseConnection) -> Result<()> {
    for (name, description) in MAJORS {
        let exists = majors::Entity::find()
            .filter(majors::Column::MajorName.eq(name))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        majors::ActiveModel {
            id: Set(Uuid::now_v7()),
            major_name: Set(name.to_owned()),
            description: Set(Some(description.to_owned())),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .with_context(|| format!("insert major {name}"))?;
        info!(major = name, "major seeded");
    }
    Ok(())
}

async fn seed_admin(db: &DatabaseConnection, email: &str, password: &str) -> Result<()> {
    let existing = users::Entity::find()
        .filter(users::Column::AcademicId.eq("admin"))
        .one(db)
        .await?;
    if existing.is_some() {
        info!("admin account already present");
        return Ok(());
    }

    let hash = hash_password(password)
        .await
        .map_err(|e| anyhow!("hash admin password: {e}"))?;
    users::ActiveModel {
        id: Set(Uuid::now_v7()),
        academic_id: Set("admin".to_owned()),
        id_card_number: Set("0000000000".to_owned()),
        full_name: Set("System Administrator".to_owned()),
        email: Set(Some(email.to_lowercase())),
        password_hash: Set(Some(hash)),
        role: Set(i16::from(UserRole::Admin.as_u8())),
        account_status: Set("active".to_owned()),
        major_id: Set(None),
        level_id: Set(None),
        phone_number: Set(None),
        date_joined: Set(Utc::now()),
        last_login: Set(None),
    }
    .insert(db)
    .await
    .context("insert admin account")?;
    info!(email, "admin account seeded");
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("invalid date {year}-{month}-{day}"))
}
