//! Integration tests for the gradebook

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use groupportal::diary::{self, grade_key, GradeForm, StudentForm};
use groupportal::error::StoreError;
use groupportal::orm::grades;
use sea_orm::EntityTrait;

fn grade_form(student_id: i32, subject_id: i32, grade: &str) -> GradeForm {
    GradeForm {
        student: student_id.to_string(),
        subject: subject_id.to_string(),
        grade: grade.to_string(),
    }
}

#[actix_rt::test]
#[serial]
async fn test_diary_groups_grades_by_student_and_subject() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_student(&db, "Ada", "Lovelace")
        .await
        .expect("Failed to create student");
    let maths = create_test_subject(&db, "Maths").await.expect("Failed to create subject");

    diary::create_grade(&db, &grade_form(student.id, maths.id, "5"))
        .await
        .expect("Failed to create grade");
    diary::create_grade(&db, &grade_form(student.id, maths.id, "4"))
        .await
        .expect("Failed to create grade");

    let gradebook = diary::get_diary(&db).await.expect("Failed to load diary");
    assert_eq!(gradebook.students.len(), 1);
    assert_eq!(gradebook.subjects.len(), 1);

    let cell = gradebook
        .grade_map
        .get(&grade_key(student.id, maths.id))
        .expect("Missing grade cell");
    let values: Vec<i32> = cell.iter().map(|entry| entry.grade).collect();
    assert_eq!(values, vec![5, 4]);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_invalid_grade_choices_are_rejected() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_student(&db, "Ada", "Lovelace")
        .await
        .expect("Failed to create student");
    let maths = create_test_subject(&db, "Maths").await.expect("Failed to create subject");

    match diary::create_grade(&db, &grade_form(student.id, maths.id, "five")).await {
        Err(StoreError::Invalid(errors)) => assert!(errors.has("grade")),
        other => panic!("expected a grade error, got {:?}", other),
    }
    match diary::create_grade(&db, &grade_form(student.id, 9999, "3")).await {
        Err(StoreError::Invalid(errors)) => assert!(errors.has("subject")),
        other => panic!("expected a subject error, got {:?}", other),
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_grade_update_keeps_date() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let student = create_test_student(&db, "Ada", "Lovelace")
        .await
        .expect("Failed to create student");
    let maths = create_test_subject(&db, "Maths").await.expect("Failed to create subject");
    let grade = diary::create_grade(&db, &grade_form(student.id, maths.id, "2"))
        .await
        .expect("Failed to create grade");

    let updated = diary::update_grade(&db, grade.id, &grade_form(student.id, maths.id, "3"))
        .await
        .expect("Failed to update grade");
    assert_eq!(updated.grade, 3);
    assert_eq!(updated.date, grade.date);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleting_student_or_subject_removes_grades() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let ada = create_test_student(&db, "Ada", "Lovelace")
        .await
        .expect("Failed to create student");
    let alan = create_test_student(&db, "Alan", "Turing")
        .await
        .expect("Failed to create student");
    let maths = create_test_subject(&db, "Maths").await.expect("Failed to create subject");
    let art = create_test_subject(&db, "Art").await.expect("Failed to create subject");

    for (student, subject) in [(ada.id, maths.id), (alan.id, maths.id), (alan.id, art.id)] {
        diary::create_grade(&db, &grade_form(student, subject, "4"))
            .await
            .expect("Failed to create grade");
    }

    diary::delete_student(&db, ada.id)
        .await
        .expect("Failed to delete student");
    let remaining = grades::Entity::find().all(&db).await.expect("Failed to list grades");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|g| g.student_id == alan.id));

    diary::delete_subject(&db, art.id)
        .await
        .expect("Failed to delete subject");
    let remaining = grades::Entity::find().all(&db).await.expect("Failed to list grades");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].subject_id, maths.id);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_blank_student_name_is_rejected() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");
    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let form = StudentForm {
        first_name: String::new(),
        last_name: "Lovelace".to_string(),
    };
    match diary::create_student(&db, &form).await {
        Err(StoreError::Invalid(errors)) => {
            assert!(errors.has("first_name"));
            assert!(!errors.has("last_name"));
        }
        other => panic!("expected a first_name error, got {:?}", other),
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
