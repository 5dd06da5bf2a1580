use std::fmt;

use serde::Serialize;

/// Shown wherever a student has no grades yet.
pub const NO_AVERAGE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub roll_number: i64,
    pub name: String,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Roll Number: {}, Name: {}", self.roll_number, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GradeRecord {
    pub subject: String,
    pub grade: f64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SubjectTopper {
    pub name: String,
    pub grade: f64,
}

/// Row of the index listing.
#[derive(Debug, Serialize)]
pub struct StudentSummary {
    pub roll_number: i64,
    pub name: String,
    pub average: String,
}

#[derive(Debug, Serialize)]
pub struct GradeView {
    pub subject: String,
    pub grade: String,
}

impl From<GradeRecord> for GradeView {
    fn from(record: GradeRecord) -> Self {
        Self {
            subject: record.subject,
            grade: format_grade(record.grade),
        }
    }
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Prints a stored grade as recorded. Whole numbers keep a trailing `.0`.
pub fn format_grade(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Formats an average to two decimals at most (`85.0`, `86.67`).
pub fn format_score(value: f64) -> String {
    format_grade(round_to_hundredths(value))
}

pub fn format_average(average: Option<f64>) -> String {
    average
        .map(format_score)
        .unwrap_or_else(|| NO_AVERAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(85.0), "85.0");
        assert_eq!(format_score(90.5), "90.5");
        assert_eq!(format_score(260.0 / 3.0), "86.67");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(99.999), "100.0");
    }

    #[test]
    fn test_format_grade_keeps_stored_precision() {
        assert_eq!(format_grade(90.0), "90.0");
        assert_eq!(format_grade(72.125), "72.125");
        assert_eq!(format_grade(99.999), "99.999");
    }

    #[test]
    fn test_format_average_placeholder() {
        assert_eq!(format_average(None), NO_AVERAGE);
        assert_eq!(format_average(Some(72.125)), "72.13");
    }

    #[test]
    fn test_student_display() {
        let student = Student {
            roll_number: 7,
            name: "Alice".to_string(),
        };
        assert_eq!(student.to_string(), "Roll Number: 7, Name: Alice");
    }
}
