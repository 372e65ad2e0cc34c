use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn completing_lessons_advances_enrollment_progress() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "progress-1",
        "Progress 1",
        &instructor.id,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics", 0, true).await;
    let first = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson 1", 0, true).await;
    let second =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson 2", 1, true).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", first.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete first lesson");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["is_completed"], true);

    let enrollment = repositories::enrollments::find_any_for_student_course(
        ctx.state.db(),
        &student.id,
        &course.id,
    )
    .await
    .expect("find enrollment")
    .expect("enrollment exists");
    assert_eq!(enrollment.progress_percentage, 50.0);
    assert_eq!(enrollment.status, crate::db::types::EnrollmentStatus::InProgress);
    assert!(enrollment.started_at.is_some());
    assert!(enrollment.completed_at.is_none());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", second.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete second lesson");
    assert_eq!(response.status(), StatusCode::OK);

    let enrollment = repositories::enrollments::find_any_for_student_course(
        ctx.state.db(),
        &student.id,
        &course.id,
    )
    .await
    .expect("find enrollment")
    .expect("enrollment exists");
    assert_eq!(enrollment.progress_percentage, 100.0);
    assert_eq!(enrollment.status, crate::db::types::EnrollmentStatus::Completed);
    assert!(enrollment.completed_at.is_some());
}

#[tokio::test]
async fn completing_lesson_twice_keeps_first_timestamp() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "idempotent",
        "Idempotent",
        &instructor.id,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics", 0, true).await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson", 0, true).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("first completion");
    let first = test_support::read_json(response).await;
    let first_completed_at = first["completed_at"].as_str().expect("completed_at").to_string();

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("second completion");

    let status = response.status();
    let second = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {second}");
    assert_eq!(second["completed_at"], first_completed_at.as_str());
}

#[tokio::test]
async fn lesson_progress_requires_active_enrollment() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "no-enroll",
        "No Enroll",
        &instructor.id,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics", 0, true).await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson", 0, true).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete without enrollment");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn partial_progress_updates_accumulate_time() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "partial",
        "Partial",
        &instructor.id,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics", 0, true).await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson", 0, true).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/progress", lesson.id),
            Some(&token),
            Some(json!({"last_position": 120, "time_spent_seconds": 60})),
        ))
        .await
        .expect("first progress update");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["last_position"], 120);
    assert_eq!(body["time_spent_seconds"], 60);
    assert_eq!(body["is_completed"], false);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/progress", lesson.id),
            Some(&token),
            Some(json!({"time_spent_seconds": 30, "notes": "Halfway"})),
        ))
        .await
        .expect("second progress update");

    let body = test_support::read_json(response).await;
    // Absent fields keep their stored value, time accumulates
    assert_eq!(body["last_position"], 120);
    assert_eq!(body["time_spent_seconds"], 90);
    assert_eq!(body["notes"], "Halfway");
}

#[tokio::test]
async fn draft_module_lessons_do_not_count_toward_progress() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "draft-module",
        "Draft Module",
        &instructor.id,
        None,
    )
    .await;
    // Published lesson, but its module is still a draft: zero eligible lessons
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Draft", 0, false).await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson", 0, true).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete lesson in draft module");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["is_completed"], true);

    // No denominator, so the aggregate is untouched
    let enrollment = repositories::enrollments::find_any_for_student_course(
        ctx.state.db(),
        &student.id,
        &course.id,
    )
    .await
    .expect("find enrollment")
    .expect("enrollment exists");
    assert_eq!(enrollment.progress_percentage, 0.0);
    assert_eq!(enrollment.status, crate::db::types::EnrollmentStatus::Enrolled);
    assert!(enrollment.started_at.is_none());
}

#[tokio::test]
async fn unpublished_lessons_do_not_count_toward_progress() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "eligible",
        "Eligible",
        &instructor.id,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Basics", 0, true).await;
    let published =
        test_support::insert_lesson(ctx.state.db(), &module.id, "Published", 0, true).await;
    test_support::insert_lesson(ctx.state.db(), &module.id, "Draft", 1, false).await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", published.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete published lesson");
    assert_eq!(response.status(), StatusCode::OK);

    let enrollment = repositories::enrollments::find_any_for_student_course(
        ctx.state.db(),
        &student.id,
        &course.id,
    )
    .await
    .expect("find enrollment")
    .expect("enrollment exists");
    assert_eq!(enrollment.progress_percentage, 100.0);
    assert_eq!(enrollment.status, crate::db::types::EnrollmentStatus::Completed);
}
