mod common;

use axum::http::StatusCode;
use lessonflow::model::entity::{AnswerKey, EnrolmentStatus};
use lessonflow::web::dto::dashboard::DashboardResponse;
use lessonflow::web::dto::quizzes::{QuizResultResponse, SubmitQuizResponse};
use serde_json::json;

use crate::common::{Action, Flow, MemoryStore, setup_server};

const TUTOR: &str = "tutor-1";
const STUDENT: &str = "student-1";

#[tokio::test]
async fn route_quiz_submit_and_resubmit_test() {
    let store = MemoryStore::new();
    let course = store.add_course(TUTOR, "Algebra");
    let quiz = store.add_quiz(course.id(), TUTOR, 50);
    let mcq = store.add_question(quiz.id(), 5, AnswerKey::Mcq { correct_answer_index: 2 });
    let msq = store.add_question(
        quiz.id(),
        3,
        AnswerKey::Msq {
            correct_answer_indices: vec![1, 3],
        },
    );
    let fill = store.add_question(
        quiz.id(),
        2,
        AnswerKey::Fill {
            correct_answer_text: "Paris".to_string(),
        },
    );
    store.enrol(course.id(), STUDENT, EnrolmentStatus::Accepted);
    let app = setup_server(store.clone());

    let submit_path = format!("/api/v1/quizzes/{}/submit", quiz.id());
    let result_path = format!("/api/v1/quizzes/{}/result", quiz.id());

    let ctx = Flow::new()
        .step(
            Action::new("result_before_submit", "GET", &result_path)
                .as_user(STUDENT, "student")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("submit_not_enrolled", "POST", &submit_path)
                .as_user("stranger", "student")
                .with_body(json!({ "answers": {} }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("submit_all_correct", "POST", &submit_path)
                .as_user(STUDENT, "student")
                .with_body(json!({
                    "answers": {
                        (mcq.id()): "02",
                        (msq.id()): "[3, 1]",
                        (fill.id()): "  paris ",
                    }
                }))
                .with_save_as("first"),
        )
        .step(
            Action::new("resubmit", "POST", &submit_path)
                .as_user(STUDENT, "student")
                .with_body(json!({
                    "answers": {
                        (mcq.id()): "2",
                        (msq.id()): "1",
                    }
                }))
                .with_save_as("second"),
        )
        .step(
            Action::new("result", "GET", &result_path)
                .as_user(STUDENT, "student")
                .with_save_as("stored"),
        )
        .step(
            Action::new("submit_unknown_quiz", "POST", "/api/v1/quizzes/nope/submit")
                .as_user(STUDENT, "student")
                .with_body(json!({ "answers": {} }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&app)
        .await;

    let first: SubmitQuizResponse = ctx.get_json("first");
    assert_eq!(first.score, 10);
    assert_eq!(first.max_score, 10);
    assert!(first.outcomes.iter().all(|o| o.is_correct()));
    assert_eq!(first.result_id, format!("{}-{STUDENT}", quiz.id()));

    let second: SubmitQuizResponse = ctx.get_json("second");
    assert_eq!(second.score, 5);
    assert_eq!(second.result_id, first.result_id);

    let stored: QuizResultResponse = ctx.get_json("stored");
    assert_eq!(stored.score, 5);
    assert_eq!(stored.student_id, STUDENT);
}

#[tokio::test]
async fn route_quiz_results_for_tutor_test() {
    let store = MemoryStore::new();
    let course = store.add_course(TUTOR, "Algebra");
    let quiz = store.add_quiz(course.id(), TUTOR, 50);
    store.set_score(quiz.id(), "s1", 70);
    store.set_score(quiz.id(), "s2", 30);
    let app = setup_server(store.clone());

    let results_path = format!("/api/v1/quizzes/{}/results", quiz.id());

    Flow::new()
        .step(
            Action::new("results_as_student", "GET", &results_path)
                .as_user("s1", "student")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("results_as_other_tutor", "GET", &results_path)
                .as_user("tutor-2", "tutor")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("results_as_owner", "GET", &results_path)
                .as_user(TUTOR, "tutor")
                .assert_body(|body| {
                    let results: Vec<QuizResultResponse> =
                        serde_json::from_value(body.clone()).expect("Invalid body format");
                    let mut scores: Vec<_> = results.iter().map(|r| r.score).collect();
                    scores.sort();
                    assert_eq!(scores, [30, 70]);
                }),
        )
        .step(
            Action::new("results_as_admin", "GET", &results_path).as_user("root", "admin"),
        )
        .run(&app)
        .await;
}

#[tokio::test]
async fn route_dashboard_test() {
    let store = MemoryStore::new();
    let course = store.add_course(TUTOR, "Algebra");
    let a = store.add_lesson(course.id(), "A", 1);
    let b = store.add_lesson(course.id(), "B", 2);
    let quiz = store.add_quiz(course.id(), TUTOR, 50);
    store.enrol(course.id(), "s1", EnrolmentStatus::Accepted);
    store.enrol(course.id(), "s2", EnrolmentStatus::Accepted);
    store.complete("s1", course.id(), a.id());
    store.complete("s2", course.id(), a.id());
    store.complete("s2", course.id(), b.id());
    store.set_score(quiz.id(), "s2", 60);

    let broken = store.add_course(TUTOR, "Broken");
    store.faults().lessons_of.insert(broken.id().to_string());
    let app = setup_server(store.clone());

    let ctx = Flow::new()
        .step(
            Action::new("dashboard_as_student", "GET", "/api/v1/dashboard/")
                .as_user("s1", "student")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("dashboard", "GET", "/api/v1/dashboard/")
                .as_user(TUTOR, "tutor")
                .with_save_as("dashboard"),
        )
        .step(
            Action::new("dashboard_as_admin", "GET", format!("/api/v1/dashboard/?tutor_id={TUTOR}"))
                .as_user("root", "admin")
                .with_save_as("admin_view"),
        )
        .run(&app)
        .await;

    let dashboard: DashboardResponse = ctx.get_json("dashboard");
    assert_eq!(dashboard.tutor_id, TUTOR);
    assert_eq!(dashboard.courses.len(), 2);

    let algebra = dashboard
        .courses
        .iter()
        .find(|c| c.course_id == course.id())
        .unwrap();
    let analytics = algebra.analytics.as_ref().unwrap();
    assert_eq!(analytics.average_progress, 75.0);
    assert_eq!(analytics.completed_count, 1);
    assert_eq!(analytics.passed_quiz_count, 1);

    let broken_report = dashboard
        .courses
        .iter()
        .find(|c| c.course_id == broken.id())
        .unwrap();
    assert!(broken_report.analytics.is_none());
    assert!(broken_report.error.is_some());

    let admin_view: DashboardResponse = ctx.get_json("admin_view");
    assert_eq!(admin_view.tutor_id, TUTOR);
    assert_eq!(admin_view.courses.len(), 2);
}

#[tokio::test]
async fn route_dashboard_after_shutdown_test() {
    let store = MemoryStore::new();
    store.add_course(TUTOR, "Algebra");
    let app = setup_server(store);
    app.state.shutdown().cancel();

    Flow::new()
        .step(
            Action::new("dashboard_shutting_down", "GET", "/api/v1/dashboard/")
                .as_user(TUTOR, "tutor")
                .with_expect(StatusCode::SERVICE_UNAVAILABLE),
        )
        .run(&app)
        .await;
}
