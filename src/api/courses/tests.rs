use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::CourseStatus;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn instructor_can_create_course_with_content() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let token = test_support::bearer_token(&instructor.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({
                "slug": "rust-101",
                "title": "Rust 101",
                "description": "Introductory course",
                "publish": true
            })),
        ))
        .await
        .expect("create course");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["status"], "published");
    let course_id = created["id"].as_str().expect("course id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{course_id}/modules"),
            Some(&token),
            Some(json!({"title": "Basics", "order_index": 0})),
        ))
        .await
        .expect("create module");

    let status = response.status();
    let module = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {module}");
    let module_id = module["id"].as_str().expect("module id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/modules/{module_id}/lessons"),
            Some(&token),
            Some(json!({"title": "Ownership", "order_index": 0})),
        ))
        .await
        .expect("create lesson");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/courses/{course_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get course");

    let status = response.status();
    let detail = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {detail}");
    assert_eq!(detail["modules"][0]["lessons"][0]["title"], "Ownership");
}

#[tokio::test]
async fn student_cannot_create_course() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({"slug": "nope", "title": "Nope"})),
        ))
        .await
        .expect("create course as student");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_can_enroll_once_in_published_course() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "enroll-1",
        "Enroll 1",
        &instructor.id,
        None,
    )
    .await;
    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("enroll");

    let status = response.status();
    let enrollment = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {enrollment}");
    assert_eq!(enrollment["status"], "enrolled");
    assert_eq!(enrollment["progress_percentage"], 0.0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("enroll again");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/enrollments",
            Some(&token),
            None,
        ))
        .await
        .expect("list enrollments");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["course_id"], course.id);
}

#[tokio::test]
async fn enrollment_limit_is_enforced() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "limited",
        "Limited",
        &instructor.id,
        Some(1),
    )
    .await;

    let first = test_support::insert_student(ctx.state.db(), "first@example.com", "First").await;
    let second =
        test_support::insert_student(ctx.state.db(), "second@example.com", "Second").await;

    let token = test_support::bearer_token(&first.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("first enroll");
    assert_eq!(response.status(), StatusCode::OK);

    let token = test_support::bearer_token(&second.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("second enroll");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["detail"], "Course enrollment limit reached");
}

#[tokio::test]
async fn draft_course_is_not_enrollable() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "draft-1",
        "Draft 1",
        &instructor.id,
        CourseStatus::Draft,
        None,
    )
    .await;
    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("enroll in draft");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_requires_completed_enrollment() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    let course = test_support::insert_published_course(
        ctx.state.db(),
        "review-1",
        "Review 1",
        &instructor.id,
        None,
    )
    .await;
    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let enrollment =
        test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/reviews", course.id),
            Some(&token),
            Some(json!({"rating": 5, "comment": "Great course"})),
        ))
        .await
        .expect("review before completion");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    sqlx::query("UPDATE enrollments SET status = 'completed' WHERE id = $1")
        .bind(&enrollment.id)
        .execute(ctx.state.db())
        .await
        .expect("mark completed");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/reviews", course.id),
            Some(&token),
            Some(json!({"rating": 5, "comment": "Great course"})),
        ))
        .await
        .expect("review after completion");
    assert_eq!(response.status(), StatusCode::CREATED);

    // One review per student per course
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/reviews", course.id),
            Some(&token),
            Some(json!({"rating": 4, "comment": "Changed my mind"})),
        ))
        .await
        .expect("duplicate review");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let reviews = repositories::reviews::list_by_course(ctx.state.db(), &course.id)
        .await
        .expect("list reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 5);
}

#[tokio::test]
async fn students_only_see_published_courses() {
    let ctx = test_support::setup_test_context().await;

    let instructor =
        test_support::insert_instructor(ctx.state.db(), "teach@example.com", "Tanya Ives").await;
    test_support::insert_published_course(
        ctx.state.db(),
        "visible",
        "Visible",
        &instructor.id,
        None,
    )
    .await;
    test_support::insert_course(
        ctx.state.db(),
        "hidden",
        "Hidden",
        &instructor.id,
        CourseStatus::Draft,
        None,
    )
    .await;

    let student =
        test_support::insert_student(ctx.state.db(), "student@example.com", "Student").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/courses", Some(&token), None))
        .await
        .expect("list courses");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["slug"], "visible");

    // The instructor still sees their own draft
    let token = test_support::bearer_token(&instructor.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/courses", Some(&token), None))
        .await
        .expect("list courses as instructor");

    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}
