use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn enroll_twice_conflicts_and_history_lists_enrollment() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "Sam", "sam@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    let token = test_support::bearer_token(&student, ctx.state.settings());
    let payload = json!({"studentId": student.id, "courseId": course.id});

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/enrollments",
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("enroll");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["status"], "ENROLLED");
    let enrollment_id = body["id"].as_str().expect("enrollment id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/enrollments",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("enroll again");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Student is already enrolled in this course");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/enrollments/student/{}", student.id),
            Some(&token),
            None,
        ))
        .await
        .expect("history");
    let body = test_support::read_json(response).await;
    assert_eq!(body[0]["course_name"], "CS101");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/enrollments/{enrollment_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn students_cannot_enroll_others() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "Sam", "sam@college.test", UserRole::Student).await;
    let other =
        test_support::insert_user(ctx.state.db(), "Alex", "alex@college.test", UserRole::Student).await;
    let admin =
        test_support::insert_user(ctx.state.db(), "Admin", "admin@college.test", UserRole::Admin)
            .await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    let payload = json!({"student_id": other.id, "course_id": course.id});

    let token = test_support::bearer_token(&student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/enrollments",
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("enroll other");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = test_support::bearer_token(&admin, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/enrollments",
            Some(&admin_token),
            Some(payload),
        ))
        .await
        .expect("admin enrolls");
    assert_eq!(response.status(), StatusCode::CREATED);
}
