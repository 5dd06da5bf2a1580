use std::str::FromStr;
use std::sync::Once;

use rocket::local::asynchronous::Client;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing_subscriber::EnvFilter;

use crate::database::ensure_schema;
use crate::db::StudentTracker;
use crate::error::AppError;
use crate::init_rocket;

static INIT: Once = Once::new();

#[derive(Default)]
pub struct TestDbBuilder {
    students: Vec<(i64, String)>,
    grades: Vec<(i64, String, f64)>,
}

impl TestDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student(mut self, roll_number: i64, name: &str) -> Self {
        self.students.push((roll_number, name.to_string()));
        self
    }

    pub fn grade(mut self, roll_number: i64, subject: &str, grade: f64) -> Self {
        self.grades.push((roll_number, subject.to_string(), grade));
        self
    }

    pub async fn build(self) -> Result<TestDb, AppError> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("debug"))
                .with_test_writer()
                .try_init();
        });

        // One connection keeps every query on the same in-memory database.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        ensure_schema(&pool).await?;

        let tracker = StudentTracker::new(&pool);
        for (roll_number, name) in &self.students {
            tracker.add_student(name, *roll_number).await?;
        }

        for (roll_number, subject, grade) in self.grades {
            tracker
                .add_grades(roll_number, &[subject], &[grade])
                .await?;
        }

        Ok(TestDb { pool })
    }
}

pub struct TestDb {
    pub pool: Pool<Sqlite>,
}

impl TestDb {
    pub fn tracker(&self) -> StudentTracker<'_> {
        StudentTracker::new(&self.pool)
    }

    pub async fn grade_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM grades")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count grades")
    }

    pub async fn student_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count students")
    }
}

/// Standard fixture: Alice (1) with Math 90 and Science 80, Bob (2) with
/// Math 70, Carol (3) with no grades.
pub async fn create_standard_test_db() -> TestDb {
    TestDbBuilder::new()
        .student(1, "Alice")
        .student(2, "Bob")
        .student(3, "Carol")
        .grade(1, "Math", 90.0)
        .grade(1, "Science", 80.0)
        .grade(2, "Math", 70.0)
        .build()
        .await
        .expect("Failed to build test database")
}

pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
    let rocket = init_rocket(test_db.pool.clone());
    let client = Client::tracked(rocket)
        .await
        .expect("Failed to build rocket client");

    (client, test_db)
}
