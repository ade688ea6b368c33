//! Demo data seed script
//!
//! Seeds a small, realistic data set for local development:
//! - 1 admin role (principal from --admin)
//! - 3 courses and 2 announcements
//! - 2 student profiles with enrollments in different lifecycle states
//! - Attendance for the current month's weekdays so the calendar has data
//! - A handful of test and daily results
//! - Contact details for the landing page
//!
//! Usage:
//!   DATABASE_URL=... ./seed-demo --admin <principal> [--reset]

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Utc, Weekday};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::env;

use tuitionhub_api::db;

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed demo data into the tuitionhub database")]
struct Args {
    /// Principal to grant the admin role
    #[arg(long)]
    admin: String,

    /// Delete existing demo rows before seeding
    #[arg(long)]
    reset: bool,
}

const DEMO_STUDENTS: [(&str, &str); 2] = [
    ("demo-student-asha", "Asha Rao"),
    ("demo-student-vikram", "Vikram Shah"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    db::run_migrations(&pool).await?;

    if args.reset {
        tracing::info!("Removing existing demo rows...");
        for (principal, _) in DEMO_STUDENTS {
            sqlx::query("DELETE FROM attendance WHERE student = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
            sqlx::query("DELETE FROM test_results WHERE student = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
            sqlx::query("DELETE FROM daily_results WHERE student = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
            sqlx::query("DELETE FROM enrollments WHERE student = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
            sqlx::query("DELETE FROM student_profiles WHERE principal = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
            sqlx::query("DELETE FROM user_roles WHERE principal = $1")
                .bind(principal)
                .execute(&pool)
                .await?;
        }
        sqlx::query("DELETE FROM courses WHERE title LIKE 'Demo:%'")
            .execute(&pool)
            .await?;
        sqlx::query("DELETE FROM announcements WHERE title LIKE 'Demo:%'")
            .execute(&pool)
            .await?;
    }

    // Admin role
    sqlx::query(
        "INSERT INTO user_roles (principal, role, assigned_by)
         VALUES ($1, 'admin', 'seed-demo')
         ON CONFLICT (principal) DO UPDATE SET role = 'admin'",
    )
    .bind(&args.admin)
    .execute(&pool)
    .await?;
    tracing::info!("Admin role granted to {}", args.admin);

    // Courses
    let mut course_ids = Vec::new();
    for (title, instructor, schedule, fee) in [
        ("Demo: Mathematics X", "R. Iyer", "Mon/Wed/Fri 5pm", 1500_i64),
        ("Demo: Physics XII", "S. Menon", "Tue/Thu 6pm", 1800),
        ("Demo: Chemistry XI", "K. Das", "Sat 10am", 1200),
    ] {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO courses (title, instructor, description, schedule, monthly_fee)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(title)
        .bind(instructor)
        .bind(format!("{title} — demo course for local development"))
        .bind(schedule)
        .bind(fee)
        .fetch_one(&pool)
        .await?;
        course_ids.push(id);
    }
    tracing::info!("Seeded {} courses", course_ids.len());

    // Announcements
    for (title, message) in [
        ("Demo: Holiday notice", "The center is closed this Friday."),
        ("Demo: Test schedule", "Unit tests begin next Monday for all batches."),
    ] {
        sqlx::query("INSERT INTO announcements (title, date, message) VALUES ($1, $2, $3)")
            .bind(title)
            .bind(Utc::now().date_naive().to_string())
            .bind(message)
            .execute(&pool)
            .await?;
    }

    // Student profiles and roles
    for (principal, name) in DEMO_STUDENTS {
        sqlx::query(
            "INSERT INTO user_roles (principal, role, assigned_by)
             VALUES ($1, 'student', 'seed-demo')
             ON CONFLICT (principal) DO NOTHING",
        )
        .bind(principal)
        .execute(&pool)
        .await?;

        sqlx::query(
            "INSERT INTO student_profiles
                (principal, name, age, class_name, school, batch, tuition_center,
                 parent_mobile_number, date_of_birth)
             VALUES ($1, $2, 16, '11th', 'City High School', 'Evening', 'Central Branch',
                     '9876543210', '2009-06-15')
             ON CONFLICT (principal) DO NOTHING",
        )
        .bind(principal)
        .bind(name)
        .execute(&pool)
        .await?;
    }

    // Enrollments: one active, one expired, one pending
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO enrollments (student, course_id, status, approval_date, expiry_date)
         VALUES ($1, $2, 'approved', $3, $4)
         ON CONFLICT (student, course_id) DO NOTHING",
    )
    .bind(DEMO_STUDENTS[0].0)
    .bind(course_ids[0])
    .bind(now)
    .bind(now + Duration::days(30))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO enrollments (student, course_id, status, approval_date, expiry_date)
         VALUES ($1, $2, 'expired', $3, $4)
         ON CONFLICT (student, course_id) DO NOTHING",
    )
    .bind(DEMO_STUDENTS[0].0)
    .bind(course_ids[1])
    .bind(now - Duration::days(45))
    .bind(now - Duration::days(15))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO enrollments (student, course_id, status)
         VALUES ($1, $2, 'pending')
         ON CONFLICT (student, course_id) DO NOTHING",
    )
    .bind(DEMO_STUDENTS[1].0)
    .bind(course_ids[2])
    .execute(&pool)
    .await?;

    // Attendance: weekdays of the current month up to today
    let today = now.date_naive();
    let mut day = today.with_day(1).unwrap_or(today);
    let mut marked = 0;
    while day <= today {
        let weekday = day.weekday();
        if weekday != Weekday::Sat && weekday != Weekday::Sun {
            let status = if day.day() % 4 == 0 { "absent" } else { "present" };
            sqlx::query(
                "INSERT INTO attendance (student, day, status)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (student, day) DO NOTHING",
            )
            .bind(DEMO_STUDENTS[0].0)
            .bind(day)
            .bind(status)
            .execute(&pool)
            .await?;
            marked += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    tracing::info!("Marked {marked} attendance days");

    // Results
    sqlx::query(
        "INSERT INTO test_results (student, course_id, score, grade, pass, feedback, date)
         VALUES ($1, $2, 82, 'A', TRUE, 'Strong fundamentals, keep it up.', $3)",
    )
    .bind(DEMO_STUDENTS[0].0)
    .bind(course_ids[0])
    .bind(now - Duration::days(7))
    .execute(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO daily_results (student, course_id, date, day, result_type, score, remarks)
         VALUES ($1, $2, $3, $4, 'Homework', 9, 'Neat work')
         ON CONFLICT (student, course_id, day, result_type) DO NOTHING",
    )
    .bind(DEMO_STUDENTS[0].0)
    .bind(course_ids[0])
    .bind(now - Duration::days(1))
    .bind((now - Duration::days(1)).date_naive())
    .execute(&pool)
    .await?;

    // Contact details
    sqlx::query(
        "UPDATE site_settings
         SET contact_email = 'hello@tuitionhub.example',
             contact_phone = '+91 98765 43210',
             contact_address = '12 MG Road, Bengaluru',
             updated_at = NOW()
         WHERE id = 1",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Demo data seeded");
    Ok(())
}
