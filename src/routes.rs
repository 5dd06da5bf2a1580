use rocket::State;
use rocket::form::Form;
use rocket::response::Redirect;
use rocket_dyn_templates::{Template, context};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::db::StudentTracker;
use crate::error::AppError;
use crate::models::{GradeView, StudentSummary, format_average, format_grade, format_score};
use crate::validation::{
    AddGradesForm, AddStudentForm, FormValidateExt, RollNumberForm, SubjectForm, parse_grades,
    parse_roll_number,
};

pub const STUDENT_NOT_FOUND_MESSAGE: &str = "Student not found.";

fn no_grades_for(subject: &str) -> AppError {
    AppError::NotFound(format!("No grades found for subject: {}", subject))
}

#[get("/")]
pub async fn index(db: &State<Pool<Sqlite>>) -> Result<Template, AppError> {
    let tracker = StudentTracker::new(db);

    let students = tracker.get_all_students().await?;
    let subjects = tracker.get_subjects().await?;

    let mut summaries = Vec::with_capacity(students.len());
    for student in students {
        let average = tracker.calculate_average(student.roll_number).await?;
        summaries.push(StudentSummary {
            roll_number: student.roll_number,
            name: student.name,
            average: format_average(average),
        });
    }

    Ok(Template::render(
        "index",
        context! {
            title: "Student Grade Tracker",
            students: summaries,
            subjects: subjects,
        },
    ))
}

#[post("/add_student", data = "<form>")]
pub async fn add_student(
    form: Form<AddStudentForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, AppError> {
    let new_student = form.into_inner().into_new_student()?;

    let student = StudentTracker::new(db)
        .add_student(&new_student.name, new_student.roll_number)
        .await?;
    info!(%student, "Registered student");

    Ok(Redirect::to(uri!(index)))
}

#[post("/add_grades", data = "<form>")]
pub async fn add_grades(
    form: Form<AddGradesForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, AppError> {
    let form = form.into_inner();
    let tracker = StudentTracker::new(db);

    let roll_number = parse_roll_number(&form.roll_number)?;
    if tracker.get_student_by_roll(roll_number).await?.is_none() {
        return Err(AppError::NotFound(STUDENT_NOT_FOUND_MESSAGE.to_string()));
    }

    let grades = parse_grades(&form.grade)?;
    let inserted = tracker
        .add_grades(roll_number, &form.subject, &grades)
        .await?;
    info!(roll_number, inserted, "Recorded grades");

    Ok(Redirect::to(uri!(index)))
}

#[get("/view_details")]
pub fn view_details_redirect() -> Redirect {
    Redirect::to(uri!(index))
}

#[post("/view_details", data = "<form>")]
pub async fn view_details(
    form: Form<RollNumberForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Template, AppError> {
    let tracker = StudentTracker::new(db);
    let roll_number = parse_roll_number(&form.roll_number)?;

    let name = tracker
        .get_student_by_roll(roll_number)
        .await?
        .ok_or_else(|| AppError::NotFound(STUDENT_NOT_FOUND_MESSAGE.to_string()))?;

    let grades: Vec<GradeView> = tracker
        .get_student_grades(roll_number)
        .await?
        .into_iter()
        .map(GradeView::from)
        .collect();
    let average = tracker.calculate_average(roll_number).await?;

    Ok(Template::render(
        "student_details",
        context! {
            title: format!("{} - Student Grade Tracker", name),
            name: name,
            roll_number: roll_number,
            grades: grades,
            average: format_average(average),
        },
    ))
}

#[post("/subject_topper", data = "<form>")]
pub async fn subject_topper(
    form: Form<SubjectForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<String, AppError> {
    form.validate_form()?;
    let subject = &form.subject;

    match StudentTracker::new(db).get_subject_topper(subject).await? {
        Some(topper) => Ok(format!(
            "The topper in {} is {} with a grade of {}",
            subject,
            topper.name,
            format_grade(topper.grade)
        )),
        None => Err(no_grades_for(subject)),
    }
}

#[post("/class_average", data = "<form>")]
pub async fn class_average(
    form: Form<SubjectForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<String, AppError> {
    form.validate_form()?;
    let subject = &form.subject;

    match StudentTracker::new(db).get_class_average(subject).await? {
        Some(average) => Ok(format!(
            "The class average for {} is {}",
            subject,
            format_score(average)
        )),
        None => Err(no_grades_for(subject)),
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
