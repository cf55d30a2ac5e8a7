//! Student gradebook: students, subjects and the grades linking them.

use crate::error::StoreError;
use crate::form::{validate_form, FormData, FormErrors};
use crate::orm::{grades, students, subjects};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Serialize;
use std::collections::BTreeMap;
use validator::Validate;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone, Debug, Default, Validate)]
pub struct StudentForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub first_name: String,
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub last_name: String,
}

impl StudentForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            first_name: data.text("first_name"),
            last_name: data.text("last_name"),
        }
    }

    pub fn from_model(student: &students::Model) -> Self {
        Self {
            first_name: student.first_name.to_owned(),
            last_name: student.last_name.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, Validate)]
pub struct SubjectForm {
    #[validate(
        custom = "crate::form::not_blank",
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub name: String,
}

impl SubjectForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            name: data.text("name"),
        }
    }

    pub fn from_model(subject: &subjects::Model) -> Self {
        Self {
            name: subject.name.to_owned(),
        }
    }
}

/// Grade form as submitted. The select values are resolved against the
/// database when saving.
#[derive(Clone, Debug, Default)]
pub struct GradeForm {
    pub student: String,
    pub subject: String,
    pub grade: String,
}

impl GradeForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            student: data.text("student"),
            subject: data.text("subject"),
            grade: data.text("grade"),
        }
    }

    pub fn from_model(grade: &grades::Model) -> Self {
        Self {
            student: grade.student_id.to_string(),
            subject: grade.subject_id.to_string(),
            grade: grade.grade.to_string(),
        }
    }

    /// Student id as currently selected, for re-rendering the select.
    pub fn student_id(&self) -> Option<i32> {
        self.student.parse().ok()
    }

    pub fn subject_id(&self) -> Option<i32> {
        self.subject.parse().ok()
    }
}

struct CleanGrade {
    student_id: i32,
    subject_id: i32,
    grade: i32,
}

async fn clean_grade<C>(db: &C, form: &GradeForm) -> Result<CleanGrade, StoreError>
where
    C: ConnectionTrait,
{
    let mut errors = FormErrors::new();

    let mut student_id = resolve_choice(&form.student, &mut errors, "student");
    if let Some(id) = student_id {
        if students::Entity::find_by_id(id).one(db).await?.is_none() {
            errors.add("student", INVALID_CHOICE);
            student_id = None;
        }
    }

    let mut subject_id = resolve_choice(&form.subject, &mut errors, "subject");
    if let Some(id) = subject_id {
        if subjects::Entity::find_by_id(id).one(db).await?.is_none() {
            errors.add("subject", INVALID_CHOICE);
            subject_id = None;
        }
    }

    let grade = if form.grade.is_empty() {
        errors.add("grade", "This field is required.");
        None
    } else {
        match form.grade.parse::<i32>() {
            Ok(grade) => Some(grade),
            Err(_) => {
                errors.add("grade", "Enter a whole number.");
                None
            }
        }
    };

    match (student_id, subject_id, grade) {
        (Some(student_id), Some(subject_id), Some(grade)) if errors.is_empty() => Ok(CleanGrade {
            student_id,
            subject_id,
            grade,
        }),
        _ => Err(StoreError::Invalid(errors)),
    }
}

/// Parses a select value, recording "required" or "invalid choice" errors.
fn resolve_choice(raw: &str, errors: &mut FormErrors, field: &str) -> Option<i32> {
    match crate::form::parse_optional_id(raw) {
        Ok(Some(id)) => Some(id),
        Ok(None) => {
            errors.add(field, "This field is required.");
            None
        }
        Err(()) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

/// One grade in the diary's JSON grade map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GradeEntry {
    pub id: i32,
    pub grade: i32,
}

/// Everything the diary page shows.
pub struct Diary {
    pub students: Vec<students::Model>,
    pub subjects: Vec<subjects::Model>,
    pub grade_map: BTreeMap<String, Vec<GradeEntry>>,
}

impl Diary {
    pub fn grade_map_json(&self) -> String {
        serde_json::to_string(&self.grade_map).unwrap_or_else(|_| "{}".to_owned())
    }

    pub fn grades_for(&self, student_id: i32, subject_id: i32) -> Vec<GradeEntry> {
        self.grade_map
            .get(&grade_key(student_id, subject_id))
            .cloned()
            .unwrap_or_default()
    }
}

pub fn grade_key(student_id: i32, subject_id: i32) -> String {
    format!("{}_{}", student_id, subject_id)
}

/// Groups grades by `"{student_id}_{subject_id}"`, keeping id order.
pub fn build_grade_map(grades: &[grades::Model]) -> BTreeMap<String, Vec<GradeEntry>> {
    let mut map: BTreeMap<String, Vec<GradeEntry>> = BTreeMap::new();
    for grade in grades {
        map.entry(grade_key(grade.student_id, grade.subject_id))
            .or_default()
            .push(GradeEntry {
                id: grade.id,
                grade: grade.grade,
            });
    }
    map
}

pub async fn get_diary<C>(db: &C) -> Result<Diary, DbErr>
where
    C: ConnectionTrait,
{
    let students = list_students(db).await?;
    let subjects = list_subjects(db).await?;
    let grades = grades::Entity::find()
        .order_by_asc(grades::Column::Id)
        .all(db)
        .await?;

    Ok(Diary {
        students,
        subjects,
        grade_map: build_grade_map(&grades),
    })
}

pub async fn list_students<C>(db: &C) -> Result<Vec<students::Model>, DbErr>
where
    C: ConnectionTrait,
{
    students::Entity::find()
        .order_by_asc(students::Column::LastName)
        .order_by_asc(students::Column::FirstName)
        .all(db)
        .await
}

pub async fn list_subjects<C>(db: &C) -> Result<Vec<subjects::Model>, DbErr>
where
    C: ConnectionTrait,
{
    subjects::Entity::find()
        .order_by_asc(subjects::Column::Name)
        .all(db)
        .await
}

pub async fn get_student<C>(db: &C, id: i32) -> Result<students::Model, StoreError>
where
    C: ConnectionTrait,
{
    students::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Student"))
}

pub async fn create_student<C>(db: &C, form: &StudentForm) -> Result<students::Model, StoreError>
where
    C: ConnectionTrait,
{
    validate_form(form)?;

    let student = students::ActiveModel {
        first_name: Set(form.first_name.to_owned()),
        last_name: Set(form.last_name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("created student {}", student.id);
    Ok(student)
}

pub async fn update_student<C>(
    db: &C,
    id: i32,
    form: &StudentForm,
) -> Result<students::Model, StoreError>
where
    C: ConnectionTrait,
{
    let student = get_student(db, id).await?;
    validate_form(form)?;

    let mut active = student.into_active_model();
    active.first_name = Set(form.first_name.to_owned());
    active.last_name = Set(form.last_name.to_owned());
    Ok(active.update(db).await?)
}

/// Deletes the student and, through the foreign key, all of their grades.
pub async fn delete_student<C>(db: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let student = get_student(db, id).await?;
    students::Entity::delete_by_id(student.id).exec(db).await?;
    log::info!("deleted student {}", id);
    Ok(())
}

pub async fn get_subject<C>(db: &C, id: i32) -> Result<subjects::Model, StoreError>
where
    C: ConnectionTrait,
{
    subjects::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Subject"))
}

pub async fn create_subject<C>(db: &C, form: &SubjectForm) -> Result<subjects::Model, StoreError>
where
    C: ConnectionTrait,
{
    validate_form(form)?;

    let subject = subjects::ActiveModel {
        name: Set(form.name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("created subject {}", subject.id);
    Ok(subject)
}

pub async fn update_subject<C>(
    db: &C,
    id: i32,
    form: &SubjectForm,
) -> Result<subjects::Model, StoreError>
where
    C: ConnectionTrait,
{
    let subject = get_subject(db, id).await?;
    validate_form(form)?;

    let mut active = subject.into_active_model();
    active.name = Set(form.name.to_owned());
    Ok(active.update(db).await?)
}

/// Deletes the subject and, through the foreign key, all of its grades.
pub async fn delete_subject<C>(db: &C, id: i32) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    let subject = get_subject(db, id).await?;
    subjects::Entity::delete_by_id(subject.id).exec(db).await?;
    log::info!("deleted subject {}", id);
    Ok(())
}

pub async fn get_grade<C>(db: &C, id: i32) -> Result<grades::Model, StoreError>
where
    C: ConnectionTrait,
{
    grades::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound("Grade"))
}

/// Records a grade dated today.
pub async fn create_grade<C>(db: &C, form: &GradeForm) -> Result<grades::Model, StoreError>
where
    C: ConnectionTrait,
{
    let clean = clean_grade(db, form).await?;

    let grade = grades::ActiveModel {
        student_id: Set(clean.student_id),
        subject_id: Set(clean.subject_id),
        grade: Set(clean.grade),
        date: Set(chrono::Utc::now().date_naive()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!(
        "recorded grade {} for student {} in subject {}",
        grade.id,
        grade.student_id,
        grade.subject_id
    );
    Ok(grade)
}

/// Changes a grade. Its date stays the day it was first recorded.
pub async fn update_grade<C>(db: &C, id: i32, form: &GradeForm) -> Result<grades::Model, StoreError>
where
    C: ConnectionTrait,
{
    let grade = get_grade(db, id).await?;
    let clean = clean_grade(db, form).await?;

    let mut active = grade.into_active_model();
    active.student_id = Set(clean.student_id);
    active.subject_id = Set(clean.subject_id);
    active.grade = Set(clean.grade);
    Ok(active.update(db).await?)
}
