use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::models::{GradeRecord, Student, SubjectTopper};

pub const DUPLICATE_ROLL_MESSAGE: &str = "Error: Roll number already exists.";

/// All reads and writes against `students` and `grades`.
///
/// Borrows the managed pool for the lifetime of a request; each method checks
/// a connection out only for its own query or transaction.
#[derive(Debug, Clone, Copy)]
pub struct StudentTracker<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> StudentTracker<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn add_student(&self, name: &str, roll_number: i64) -> Result<Student, AppError> {
        info!("Adding student");
        let res = sqlx::query("INSERT INTO students (name, roll_number) VALUES (?, ?)")
            .bind(name)
            .bind(roll_number)
            .execute(self.pool)
            .await;

        match res {
            Ok(_) => {
                let student = Student {
                    roll_number,
                    name: name.to_string(),
                };
                info!(%student, "Student added");
                Ok(student)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!("Roll number already taken");
                Err(AppError::Conflict(DUPLICATE_ROLL_MESSAGE.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_all_students(&self) -> Result<Vec<Student>, AppError> {
        info!("Getting all students");
        let students = sqlx::query_as::<_, Student>(
            "SELECT roll_number, name FROM students ORDER BY rowid",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(students)
    }

    #[instrument(skip(self))]
    pub async fn get_student_by_roll(&self, roll_number: i64) -> Result<Option<String>, AppError> {
        info!("Fetching student by roll number");
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM students WHERE roll_number = ?")
            .bind(roll_number)
            .fetch_optional(self.pool)
            .await?;

        Ok(name)
    }

    /// Inserts one row per (subject, grade) pair inside a single transaction.
    /// Nothing is persisted unless every insert succeeds.
    #[instrument(skip(self))]
    pub async fn add_grades(
        &self,
        roll_number: i64,
        subjects: &[String],
        grades: &[f64],
    ) -> Result<usize, AppError> {
        info!("Adding grades");
        if subjects.len() != grades.len() {
            return Err(AppError::Validation(
                "Each subject needs a matching grade.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        for (subject, grade) in subjects.iter().zip(grades) {
            let inserted = sqlx::query(
                "INSERT INTO grades (roll_number, subject, grade) VALUES (?, ?, ?)",
            )
            .bind(roll_number)
            .bind(subject)
            .bind(*grade)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                warn!(error = %e, %subject, "Grade insert failed, rolling back batch");
                tx.rollback().await?;
                return Err(AppError::Internal(format!("Error adding grades: {}", e)));
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Error adding grades: {}", e)))?;

        Ok(subjects.len())
    }

    #[instrument(skip(self))]
    pub async fn get_student_grades(&self, roll_number: i64) -> Result<Vec<GradeRecord>, AppError> {
        info!("Getting student grades");
        let grades = sqlx::query_as::<_, GradeRecord>(
            "SELECT subject, grade FROM grades WHERE roll_number = ? ORDER BY rowid",
        )
        .bind(roll_number)
        .fetch_all(self.pool)
        .await?;

        Ok(grades)
    }

    /// `None` when the student has no grades.
    #[instrument(skip(self))]
    pub async fn calculate_average(&self, roll_number: i64) -> Result<Option<f64>, AppError> {
        info!("Calculating student average");
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(grade) FROM grades WHERE roll_number = ?",
        )
        .bind(roll_number)
        .fetch_one(self.pool)
        .await?;

        Ok(average)
    }

    #[instrument(skip(self))]
    pub async fn get_subjects(&self) -> Result<Vec<String>, AppError> {
        info!("Getting subjects");
        let subjects =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT subject FROM grades ORDER BY subject")
                .fetch_all(self.pool)
                .await?;

        Ok(subjects)
    }

    /// Highest grade for the subject; ties go to the earliest recorded row.
    #[instrument(skip(self))]
    pub async fn get_subject_topper(
        &self,
        subject: &str,
    ) -> Result<Option<SubjectTopper>, AppError> {
        info!("Getting subject topper");
        let topper = sqlx::query_as::<_, SubjectTopper>(
            "SELECT students.name, grades.grade
             FROM students
             JOIN grades ON students.roll_number = grades.roll_number
             WHERE grades.subject = ?
             ORDER BY grades.grade DESC, grades.rowid ASC
             LIMIT 1",
        )
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;

        Ok(topper)
    }

    #[instrument(skip(self))]
    pub async fn get_class_average(&self, subject: &str) -> Result<Option<f64>, AppError> {
        info!("Calculating class average");
        let average =
            sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(grade) FROM grades WHERE subject = ?")
                .bind(subject)
                .fetch_one(self.pool)
                .await?;

        Ok(average)
    }
}
