use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn course_listing_is_public() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let teacher =
        test_support::insert_user(ctx.state.db(), "Turing", "turing@college.test", UserRole::Teacher)
            .await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", Some(&teacher.id)).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/courses", None, None))
        .await
        .expect("list courses");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["teacher"]["name"], "Turing");
    assert_eq!(body[0]["enrollment_count"], 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/courses/{}", course.id),
            None,
            None,
        ))
        .await
        .expect("get course");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["name"], "CS101");
}

#[tokio::test]
async fn admin_manages_course_lifecycle() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let admin =
        test_support::insert_user(ctx.state.db(), "Admin", "admin@college.test", UserRole::Admin)
            .await;
    let teacher =
        test_support::insert_user(ctx.state.db(), "Hopper", "hopper@college.test", UserRole::Teacher)
            .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            Some(json!({"name": "Compilers", "description": "Parsing", "teacherId": teacher.id})),
        ))
        .await
        .expect("create course");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["teacher"]["id"], teacher.id.as_str());
    let course_id = created["id"].as_str().expect("course id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/courses/{course_id}"),
            Some(&token),
            Some(json!({"name": "Compilers II"})),
        ))
        .await
        .expect("update course");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["name"], "Compilers II");
    assert!(updated["teacher"].is_null());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/courses/{course_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete course");
    assert_eq!(response.status(), StatusCode::OK);

    let remaining = repositories::courses::find_by_id(ctx.state.db(), &course_id)
        .await
        .expect("lookup");
    assert!(remaining.is_none());
}

#[tokio::test]
async fn course_mutations_require_admin() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let teacher =
        test_support::insert_user(ctx.state.db(), "Knuth", "knuth@college.test", UserRole::Teacher)
            .await;
    let token = test_support::bearer_token(&teacher, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            Some(json!({"name": "Algorithms"})),
        ))
        .await
        .expect("create course");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Admin access required");
}

#[tokio::test]
async fn assigning_a_student_as_teacher_is_rejected() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let admin =
        test_support::insert_user(ctx.state.db(), "Admin", "admin@college.test", UserRole::Admin)
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "Stu", "stu@college.test", UserRole::Student).await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            Some(json!({"name": "Databases", "teacher_id": student.id})),
        ))
        .await
        .expect("create course");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/courses",
            Some(&token),
            Some(json!({"name": "Databases", "teacher_id": "missing-teacher"})),
        ))
        .await
        .expect("create course");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
