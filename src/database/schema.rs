use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

// roll_number is declared INT rather than INTEGER so it does not alias the
// rowid; rowid then keeps insertion order for listings.
pub const CURRENT_SCHEMA: &str = r#"
PRAGMA foreign_keys = 1;

CREATE TABLE IF NOT EXISTS students (
    roll_number INT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS grades (
    roll_number INT NOT NULL,
    subject TEXT NOT NULL,
    grade REAL NOT NULL,
    FOREIGN KEY (roll_number) REFERENCES students (roll_number)
);

CREATE INDEX IF NOT EXISTS idx_grades_roll_number ON grades (roll_number);
CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades (subject);
"#;

#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Ensuring database schema exists");
    sqlx::raw_sql(CURRENT_SCHEMA).execute(pool).await?;
    Ok(())
}
