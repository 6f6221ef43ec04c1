use time::Duration;

use super::*;
use crate::db::types::EnrollmentStatus;
use crate::test_support;

async fn enrolled_student(ctx: &test_support::TestContext) -> (User, Course) {
    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    (student, course)
}

#[tokio::test]
async fn enroll_rejects_duplicates_and_non_students() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let teacher =
        test_support::insert_user(ctx.state.db(), "T", "t@college.test", UserRole::Teacher).await;
    let admin =
        test_support::insert_user(ctx.state.db(), "A", "a@college.test", UserRole::Admin).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;

    let enrollment = enroll(&ctx.state, &student, &student.id, &course.id).await.expect("enroll");
    assert_eq!(enrollment.student_id, student.id);

    assert!(matches!(
        enroll(&ctx.state, &student, &student.id, &course.id).await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        enroll(&ctx.state, &admin, &teacher.id, &course.id).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        enroll(&ctx.state, &student, &student.id, "missing-course").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        enroll(&ctx.state, &teacher, &student.id, &course.id).await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn unenroll_requires_an_enrollment() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;

    assert!(matches!(
        unenroll(&ctx.state, &student, &student.id, &course.id).await,
        Err(ServiceError::NotFound(_))
    ));

    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
    unenroll(&ctx.state, &student, &student.id, &course.id).await.expect("unenroll");

    let history = enrollment_history(&ctx.state, &student, &student.id).await.expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn unenroll_ignores_dropped_enrollments() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let (student, course) = enrolled_student(&ctx).await;
    let history = enrollment_history(&ctx.state, &student, &student.id).await.expect("history");
    crate::services::admin::update_enrollment_status(
        &ctx.state,
        &history[0].enrollment_id,
        EnrollmentStatus::Dropped,
    )
    .await
    .expect("drop");

    assert!(matches!(
        unenroll(&ctx.state, &student, &student.id, &course.id).await,
        Err(ServiceError::NotFound(_))
    ));
    let history = enrollment_history(&ctx.state, &student, &student.id).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, EnrollmentStatus::Dropped);

    enroll(&ctx.state, &student, &student.id, &course.id).await.expect("re-enroll");
    unenroll(&ctx.state, &student, &student.id, &course.id).await.expect("unenroll");
    let history = enrollment_history(&ctx.state, &student, &student.id).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, EnrollmentStatus::Dropped);
}

#[tokio::test]
async fn enroll_in_all_is_idempotent() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let (student, _) = enrolled_student(&ctx).await;
    test_support::insert_course(ctx.state.db(), "CS102", None).await;
    test_support::insert_course(ctx.state.db(), "CS103", None).await;

    assert_eq!(enroll_in_all(&ctx.state, &student, &student.id).await.expect("first"), 2);
    assert_eq!(enroll_in_all(&ctx.state, &student, &student.id).await.expect("second"), 0);

    let courses = enrolled_courses(&ctx.state, &student, &student.id).await.expect("courses");
    assert_eq!(courses.len(), 3);
}

#[tokio::test]
async fn submit_enforces_due_date_content_and_uniqueness() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let (student, course) = enrolled_student(&ctx).await;
    let closed =
        test_support::insert_assignment(ctx.state.db(), &course.id, "Old", test_support::yesterday())
            .await;
    let open =
        test_support::insert_assignment(ctx.state.db(), &course.id, "New", test_support::tomorrow())
            .await;

    assert!(matches!(
        submit(&ctx.state, &student, &closed.id, Some("late".to_string()), None).await,
        Err(ServiceError::Validation(_))
    ));

    let empty_file = UploadedFile { original_name: Some("a.txt".to_string()), bytes: Vec::new() };
    assert!(matches!(
        submit(&ctx.state, &student, &open.id, Some("  ".to_string()), Some(empty_file)).await,
        Err(ServiceError::Validation(_))
    ));

    let submission = submit(&ctx.state, &student, &open.id, Some(" answer ".to_string()), None)
        .await
        .expect("submit");
    assert_eq!(submission.submission_text.as_deref(), Some("answer"));
    assert!(submission.grade.is_none());

    assert!(matches!(
        submit(&ctx.state, &student, &open.id, Some("again".to_string()), None).await,
        Err(ServiceError::Conflict(_))
    ));

    let mine = my_submission(&ctx.state, &student, &open.id).await.expect("my submission");
    assert_eq!(mine.id, submission.id);
    assert!(matches!(
        submission_file(&ctx.state, &student, &open.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn file_submission_records_size_and_hash() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let (student, course) = enrolled_student(&ctx).await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, "HW1", test_support::tomorrow())
            .await;

    let upload = UploadedFile {
        original_name: Some("essay.PDF".to_string()),
        bytes: b"%PDF-1.4 essay".to_vec(),
    };
    let submission = submit(&ctx.state, &student, &assignment.id, None, Some(upload))
        .await
        .expect("submit file");

    let file_name = submission.file_name.expect("file name");
    assert!(file_name.ends_with(".pdf"));
    assert_eq!(submission.file_size, Some(14));
    assert_eq!(submission.file_hash.as_deref().map(str::len), Some(64));

    let downloaded = submission_file(&ctx.state, &student, &assignment.id).await.expect("download");
    assert_eq!(downloaded.bytes, b"%PDF-1.4 essay");
}

#[tokio::test]
async fn unenrolled_students_cannot_see_course_work() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", None).await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, "HW1", test_support::tomorrow())
            .await;

    assert!(matches!(
        course_details(&ctx.state, &student, &course.id).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        assignment_details(&ctx.state, &student, &assignment.id).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        course_details(&ctx.state, &student, "missing-course").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn dashboard_limits_upcoming_and_recent_grades() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };

    let teacher =
        test_support::insert_user(ctx.state.db(), "T", "t@college.test", UserRole::Teacher).await;
    let student =
        test_support::insert_user(ctx.state.db(), "S", "s@college.test", UserRole::Student).await;
    let course = test_support::insert_course(ctx.state.db(), "CS101", Some(&teacher.id)).await;
    test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

    let mut assignments = Vec::new();
    for day in 1..=7 {
        let due = test_support::tomorrow() + Duration::days(day);
        let assignment =
            test_support::insert_assignment(ctx.state.db(), &course.id, &format!("HW{day}"), due)
                .await;
        assignments.push(assignment);
    }

    let dashboard_before = dashboard(&ctx.state, &student, &student.id).await.expect("dashboard");
    assert_eq!(dashboard_before.courses.len(), 1);
    assert_eq!(dashboard_before.upcoming_assignments.len(), 5);
    assert_eq!(dashboard_before.upcoming_assignments[0].title, "HW1");
    assert!(dashboard_before.recent_grades.is_empty());

    for assignment in &assignments {
        let submission =
            submit(&ctx.state, &student, &assignment.id, Some("done".to_string()), None)
                .await
                .expect("submit");
        crate::services::teacher::grade_submission(&ctx.state, &teacher, &submission.id, 80.0, None)
            .await
            .expect("grade");
    }

    let dashboard_after = dashboard(&ctx.state, &student, &student.id).await.expect("dashboard");
    assert!(dashboard_after.upcoming_assignments.is_empty());
    assert_eq!(dashboard_after.recent_grades.len(), 5);

    let all_grades = grades(&ctx.state, &student, &student.id).await.expect("grades");
    assert_eq!(all_grades.len(), 7);
    assert!(all_grades.iter().all(|grade| grade.grade == Some(80.0)));
}
