use super::*;
use crate::test_support;

#[tokio::test]
async fn dashboard_counts_by_role() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let teacher =
        test_support::insert_user(ctx.state.db(), "T", "t@college.test", UserRole::Teacher).await;
    test_support::insert_user(ctx.state.db(), "S1", "s1@college.test", UserRole::Student).await;
    test_support::insert_user(ctx.state.db(), "S2", "s2@college.test", UserRole::Student).await;
    test_support::insert_course(ctx.state.db(), "CS101", Some(&teacher.id)).await;

    let stats = dashboard_stats(&ctx.state).await;
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_teachers, 1);
    assert_eq!(stats.total_courses, 1);
}

#[tokio::test]
async fn create_course_requires_name_and_teacher_role() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;

    let blank = create_course(
        &ctx.state,
        CourseInput { name: "   ", description: None, teacher_id: None },
    )
    .await;
    assert!(matches!(blank, Err(ServiceError::Validation(_))));

    let not_teacher = create_course(
        &ctx.state,
        CourseInput { name: "CS101", description: None, teacher_id: Some(&student.id) },
    )
    .await;
    assert!(matches!(not_teacher, Err(ServiceError::Validation(_))));

    let created = create_course(
        &ctx.state,
        CourseInput { name: " CS101 ", description: Some(" "), teacher_id: None },
    )
    .await
    .expect("create course");
    assert_eq!(created.name, "CS101");
    assert!(created.description.is_none());
    assert!(created.teacher.is_none());
}

#[tokio::test]
async fn delete_course_refuses_while_enrolled() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    let enrollment = test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

    let result = delete_course(&ctx.state, &course.id).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert!(get_course(&ctx.state, &course.id).await.is_ok());

    repositories::enrollments::delete(ctx.state.db(), &enrollment.id).await.expect("unenroll");
    delete_course(&ctx.state, &course.id).await.expect("delete course");
    assert!(matches!(
        get_course(&ctx.state, &course.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        delete_course(&ctx.state, &course.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn referenced_user_cannot_be_deleted() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let admin =
        test_support::insert_user(ctx.state.db(), "A", "a@college.test", UserRole::Admin).await;
    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

    let result = delete_user(&ctx.state, &admin, &student.id).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let result = delete_user(&ctx.state, &admin, &admin.id).await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn reactivating_a_dropped_enrollment_conflicts_with_active_one() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    let first = test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

    let dropped = update_enrollment_status(&ctx.state, &first.id, EnrollmentStatus::Dropped)
        .await
        .expect("drop");
    assert_eq!(dropped.status, EnrollmentStatus::Dropped);

    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

    let result = update_enrollment_status(&ctx.state, &first.id, EnrollmentStatus::Enrolled).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}
