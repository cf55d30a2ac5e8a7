//! Gradebook pages. Everything but the diary itself is staff only.

use super::{read_form, RawForm};
use crate::db::get_db_pool;
use crate::diary::{self, Diary, GradeForm, StudentForm, SubjectForm};
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::{students, subjects};
use crate::template::{confirm_delete, redirect, render_invalid};
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

const DIARY_URL: &str = "/diary/";

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_diary)
        .service(add_student_form)
        .service(add_student)
        .service(edit_student_form)
        .service(edit_student)
        .service(delete_student_confirm)
        .service(delete_student)
        .service(add_subject_form)
        .service(add_subject)
        .service(edit_subject_form)
        .service(edit_subject)
        .service(delete_subject_confirm)
        .service(delete_subject)
        .service(add_grade_form)
        .service(add_grade)
        .service(edit_grade_form)
        .service(edit_grade);
}

#[derive(Template)]
#[template(path = "diary.html")]
pub struct DiaryTemplate {
    pub client: ClientCtx,
    pub diary: Diary,
}

#[derive(Template)]
#[template(path = "student_form.html")]
pub struct StudentFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub form: StudentForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "subject_form.html")]
pub struct SubjectFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub form: SubjectForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "grade_form.html")]
pub struct GradeFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub students: Vec<students::Model>,
    pub subjects: Vec<subjects::Model>,
    pub form: GradeForm,
    pub errors: FormErrors,
}

impl GradeFormTemplate {
    async fn new(
        client: ClientCtx,
        heading: &'static str,
        action: String,
        form: GradeForm,
        errors: FormErrors,
    ) -> Result<Self, Error> {
        let db = get_db_pool();
        Ok(Self {
            client,
            heading,
            action,
            students: diary::list_students(db).await.map_err(StoreError::from)?,
            subjects: diary::list_subjects(db).await.map_err(StoreError::from)?,
            form,
            errors,
        })
    }

    pub fn is_student_selected(&self, id: &i32) -> bool {
        self.form.student_id() == Some(*id)
    }

    pub fn is_subject_selected(&self, id: &i32) -> bool {
        self.form.subject_id() == Some(*id)
    }
}

#[get("/diary/")]
pub async fn view_diary(client: ClientCtx) -> Result<impl Responder, Error> {
    let diary = diary::get_diary(get_db_pool())
        .await
        .map_err(StoreError::from)?;
    Ok(DiaryTemplate { client, diary }.to_response())
}

// Students

#[get("/add-student/")]
pub async fn add_student_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_admin()?;
    Ok(StudentFormTemplate {
        client,
        heading: "Add student",
        action: "/add-student/".to_owned(),
        form: StudentForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/add-student/")]
pub async fn add_student(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let form = StudentForm::from_data(&read_form(&session, form)?);

    match diary::create_student(get_db_pool(), &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&StudentFormTemplate {
            client,
            heading: "Add student",
            action: "/add-student/".to_owned(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/edit-student/{id}/")]
pub async fn edit_student_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let student = diary::get_student(get_db_pool(), path.into_inner()).await?;

    Ok(StudentFormTemplate {
        client,
        heading: "Edit student",
        action: format!("/edit-student/{}/", student.id),
        form: StudentForm::from_model(&student),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/edit-student/{id}/")]
pub async fn edit_student(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let id = path.into_inner();
    let form = StudentForm::from_data(&read_form(&session, form)?);

    match diary::update_student(get_db_pool(), id, &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&StudentFormTemplate {
            client,
            heading: "Edit student",
            action: format!("/edit-student/{}/", id),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-student/{id}/")]
pub async fn delete_student_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let student = diary::get_student(get_db_pool(), path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "student",
        student.full_name(),
        format!("/delete-student/{}/", student.id),
        DIARY_URL,
    ))
}

#[post("/delete-student/{id}/")]
pub async fn delete_student(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    read_form(&session, form)?;
    diary::delete_student(get_db_pool(), path.into_inner()).await?;
    Ok(redirect(DIARY_URL))
}

// Subjects

#[get("/add-subject/")]
pub async fn add_subject_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_admin()?;
    Ok(SubjectFormTemplate {
        client,
        heading: "Add subject",
        action: "/add-subject/".to_owned(),
        form: SubjectForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/add-subject/")]
pub async fn add_subject(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let form = SubjectForm::from_data(&read_form(&session, form)?);

    match diary::create_subject(get_db_pool(), &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&SubjectFormTemplate {
            client,
            heading: "Add subject",
            action: "/add-subject/".to_owned(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/edit-subject/{id}/")]
pub async fn edit_subject_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let subject = diary::get_subject(get_db_pool(), path.into_inner()).await?;

    Ok(SubjectFormTemplate {
        client,
        heading: "Edit subject",
        action: format!("/edit-subject/{}/", subject.id),
        form: SubjectForm::from_model(&subject),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/edit-subject/{id}/")]
pub async fn edit_subject(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let id = path.into_inner();
    let form = SubjectForm::from_data(&read_form(&session, form)?);

    match diary::update_subject(get_db_pool(), id, &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&SubjectFormTemplate {
            client,
            heading: "Edit subject",
            action: format!("/edit-subject/{}/", id),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-subject/{id}/")]
pub async fn delete_subject_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let subject = diary::get_subject(get_db_pool(), path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "subject",
        subject.name,
        format!("/delete-subject/{}/", subject.id),
        DIARY_URL,
    ))
}

#[post("/delete-subject/{id}/")]
pub async fn delete_subject(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    read_form(&session, form)?;
    diary::delete_subject(get_db_pool(), path.into_inner()).await?;
    Ok(redirect(DIARY_URL))
}

// Grades

#[get("/add-grade/")]
pub async fn add_grade_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let template = GradeFormTemplate::new(
        client,
        "Add grade",
        "/add-grade/".to_owned(),
        GradeForm::default(),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/add-grade/")]
pub async fn add_grade(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let form = GradeForm::from_data(&read_form(&session, form)?);

    match diary::create_grade(get_db_pool(), &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => {
            let template =
                GradeFormTemplate::new(client, "Add grade", "/add-grade/".to_owned(), form, errors)
                    .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/edit-grade/{id}/")]
pub async fn edit_grade_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_admin()?;
    let grade = diary::get_grade(get_db_pool(), path.into_inner()).await?;

    let template = GradeFormTemplate::new(
        client,
        "Edit grade",
        format!("/edit-grade/{}/", grade.id),
        GradeForm::from_model(&grade),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/edit-grade/{id}/")]
pub async fn edit_grade(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_admin()?;
    let id = path.into_inner();
    let form = GradeForm::from_data(&read_form(&session, form)?);

    match diary::update_grade(get_db_pool(), id, &form).await {
        Ok(_) => Ok(redirect(DIARY_URL)),
        Err(StoreError::Invalid(errors)) => {
            let template =
                GradeFormTemplate::new(client, "Edit grade", format!("/edit-grade/{}/", id), form, errors)
                    .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}
