use rocket::FromForm;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and Roll Number are required.";
pub const ROLL_NUMBER_MESSAGE: &str = "Roll Number must be an integer.";
pub const GRADE_NOT_NUMERIC_MESSAGE: &str = "Grades must be numeric.";
pub const GRADE_RANGE_MESSAGE: &str = "Grades must be between 0 and 100.";
pub const SUBJECT_REQUIRED_MESSAGE: &str = "Subject is required.";

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;

#[derive(Debug, FromForm, Validate)]
pub struct AddStudentForm {
    #[field(default = String::new())]
    #[validate(length(min = 1, message = "Name and Roll Number are required."))]
    pub name: String,
    #[field(default = String::new())]
    #[validate(length(min = 1, message = "Name and Roll Number are required."))]
    pub roll_number: String,
}

#[derive(Debug, FromForm)]
pub struct AddGradesForm {
    #[field(default = String::new())]
    pub roll_number: String,
    pub subject: Vec<String>,
    pub grade: Vec<String>,
}

#[derive(Debug, FromForm)]
pub struct RollNumberForm {
    #[field(default = String::new())]
    pub roll_number: String,
}

#[derive(Debug, FromForm, Validate)]
pub struct SubjectForm {
    #[field(default = String::new())]
    #[validate(length(min = 1, message = "Subject is required."))]
    pub subject: String,
}

/// A student that passed form validation.
#[derive(Debug, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: i64,
}

pub trait FormValidateExt {
    fn validate_form(&self) -> Result<(), AppError>;
}

impl<T: Validate> FormValidateExt for T {
    fn validate_form(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(first_message(&errors)))
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, field_errors)| field_errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid value".to_string())
}

pub fn parse_roll_number(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(ROLL_NUMBER_MESSAGE.to_string()))
}

/// Every grade must parse and lie in `[0, 100]`; one bad value rejects the
/// whole batch.
pub fn parse_grades(raw: &[String]) -> Result<Vec<f64>, AppError> {
    raw.iter()
        .map(|value| {
            let grade = value
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::Validation(GRADE_NOT_NUMERIC_MESSAGE.to_string()))?;

            if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
                Ok(grade)
            } else {
                Err(AppError::Validation(GRADE_RANGE_MESSAGE.to_string()))
            }
        })
        .collect()
}

impl AddStudentForm {
    pub fn into_new_student(self) -> Result<NewStudent, AppError> {
        self.validate_form()?;
        let roll_number = parse_roll_number(&self.roll_number)?;

        Ok(NewStudent {
            name: self.name,
            roll_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_form(name: &str, roll_number: &str) -> AddStudentForm {
        AddStudentForm {
            name: name.to_string(),
            roll_number: roll_number.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_student_form_requires_both_fields() {
        for (name, roll) in [("", "1"), ("Alice", ""), ("", "")] {
            let err = student_form(name, roll).into_new_student().unwrap_err();
            assert_eq!(validation_message(err), REQUIRED_FIELDS_MESSAGE);
        }
    }

    fn field_messages(errors: &ValidationErrors) -> Vec<(String, String)> {
        let mut messages: Vec<_> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error.message.as_ref().map(|m| m.to_string());
                    (field.to_string(), message.unwrap_or_default())
                })
            })
            .collect();
        messages.sort();
        messages
    }

    #[test]
    fn test_every_required_field_uses_shared_message() {
        let errors = student_form("", "").validate().unwrap_err();
        assert_eq!(
            field_messages(&errors),
            vec![
                ("name".to_string(), REQUIRED_FIELDS_MESSAGE.to_string()),
                ("roll_number".to_string(), REQUIRED_FIELDS_MESSAGE.to_string()),
            ]
        );

        let errors = SubjectForm {
            subject: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            field_messages(&errors),
            vec![("subject".to_string(), SUBJECT_REQUIRED_MESSAGE.to_string())]
        );
    }

    #[test]
    fn test_student_form_rejects_non_numeric_roll() {
        let err = student_form("Alice", "12a").into_new_student().unwrap_err();
        assert_eq!(validation_message(err), ROLL_NUMBER_MESSAGE);
    }

    #[test]
    fn test_student_form_accepts_padded_roll() {
        let student = student_form("Alice", " 42 ").into_new_student().unwrap();
        assert_eq!(
            student,
            NewStudent {
                name: "Alice".to_string(),
                roll_number: 42
            }
        );
    }

    #[test]
    fn test_grade_bounds_are_inclusive() {
        let grades = parse_grades(&strings(&["0", "100", "55.5"])).unwrap();
        assert_eq!(grades, vec![0.0, 100.0, 55.5]);
    }

    #[test]
    fn test_grade_out_of_range_rejected() {
        for bad in ["150", "-0.5", "100.01", "NaN", "inf"] {
            let err = parse_grades(&strings(&["90", bad])).unwrap_err();
            assert_eq!(validation_message(err), GRADE_RANGE_MESSAGE, "value {}", bad);
        }
    }

    #[test]
    fn test_grade_not_numeric_rejected() {
        let err = parse_grades(&strings(&["ninety"])).unwrap_err();
        assert_eq!(validation_message(err), GRADE_NOT_NUMERIC_MESSAGE);
    }

    #[test]
    fn test_subject_form_requires_subject() {
        let form = SubjectForm {
            subject: String::new(),
        };
        let err = form.validate_form().unwrap_err();
        assert_eq!(validation_message(err), SUBJECT_REQUIRED_MESSAGE);
    }
}
