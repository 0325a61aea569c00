#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use lessonflow::auth::{UserClaims, generate_token};
use lessonflow::model::entity::{
    AnswerKey, Course, CourseCreate, Enrolment, EnrolmentStatus, Lesson, LessonCreate,
    LessonProgress, ProgressCreate, Quiz, QuizCreate, QuizQuestion, QuizQuestionCreate, QuizResult,
};
use lessonflow::model::{
    CourseRepository, DatabaseError, DatabaseResult, EnrolmentRepository, LessonRepository,
    ProgressRepository, QuizRepository, QuizResultRepository, new_id,
};
use lessonflow::web::AppState;
use lessonflow::web::middlewares::AUTH_TOKEN;
use lessonflow::{EngineConfig, build_server_with_store};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_cookies::Cookie;

pub const JWT_SECRET: &str = "test-secret";

/// Failures and latency a test can inject into [`MemoryStore`].
#[derive(Debug, Default)]
pub struct Faults {
    pub list_courses: bool,
    /// Course ids whose lesson listing fails.
    pub lessons_of: HashSet<String>,
    /// Student ids whose progress fetch fails.
    pub progress_of: HashSet<String>,
    /// Student ids whose quiz result fetch fails.
    pub results_of: HashSet<String>,
    /// Added to every progress fetch.
    pub progress_delay: Option<Duration>,
    /// Per-student progress fetch delay, takes precedence over `progress_delay`.
    pub progress_delay_of: HashMap<String, Duration>,
}

#[derive(Debug, Default)]
struct Data {
    courses: Vec<Course>,
    lessons: Vec<Lesson>,
    enrolments: Vec<Enrolment>,
    progress: Vec<LessonProgress>,
    quizzes: Vec<Quiz>,
    questions: Vec<QuizQuestion>,
    results: Vec<QuizResult>,
}

/// In-memory store with the same contract as the PostgreSQL one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
    faults: Mutex<Faults>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

fn unavailable() -> DatabaseError {
    DatabaseError::SqlxError(sqlx::Error::PoolTimedOut)
}

fn upsert<T, F>(items: &mut Vec<T>, item: T, same: F)
where
    F: Fn(&T, &T) -> bool,
{
    match items.iter_mut().find(|existing| same(existing, &item)) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap()
    }

    // fixtures

    pub fn add_course(&self, tutor_id: &str, title: &str) -> Course {
        let course = CourseCreate {
            tutor_id: tutor_id.to_string(),
            title: title.to_string(),
            description: String::new(),
        }
        .into_course(new_id());
        self.data.lock().unwrap().courses.push(course.clone());
        course
    }

    pub fn add_lesson(&self, course_id: &str, title: &str, order: i32) -> Lesson {
        let lesson = LessonCreate {
            course_id: course_id.to_string(),
            title: title.to_string(),
            pages: vec![],
            order: Some(order),
        }
        .into_lesson(new_id());
        self.data.lock().unwrap().lessons.push(lesson.clone());
        lesson
    }

    pub fn enrol(&self, course_id: &str, student_id: &str, status: EnrolmentStatus) -> Enrolment {
        let enrolment = Enrolment::request(course_id, student_id).with_status(status);
        let mut data = self.data.lock().unwrap();
        upsert(&mut data.enrolments, enrolment.clone(), |a, b| a.id() == b.id());
        enrolment
    }

    pub fn complete(&self, student_id: &str, course_id: &str, lesson_id: &str) {
        let progress = ProgressCreate::new(student_id, course_id, lesson_id).into_progress(Utc::now());
        let mut data = self.data.lock().unwrap();
        upsert(&mut data.progress, progress, |a, b| a.id() == b.id());
    }

    pub fn add_quiz(&self, course_id: &str, tutor_id: &str, pass_percentage: i32) -> Quiz {
        let quiz = QuizCreate {
            course_id: course_id.to_string(),
            title: "Final quiz".to_string(),
            description: String::new(),
            created_by: tutor_id.to_string(),
            total_marks: 100,
            pass_percentage,
        }
        .into_quiz(new_id());
        self.data.lock().unwrap().quizzes.push(quiz.clone());
        quiz
    }

    pub fn add_question(&self, quiz_id: &str, marks: i32, answer: AnswerKey) -> QuizQuestion {
        let question = QuizQuestionCreate {
            quiz_id: quiz_id.to_string(),
            question_text: "?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            marks,
            answer,
        }
        .into_question(new_id())
        .unwrap();
        self.data.lock().unwrap().questions.push(question.clone());
        question
    }

    pub fn set_score(&self, quiz_id: &str, student_id: &str, score: i32) {
        let result = QuizResult::new(quiz_id, student_id, HashMap::new(), score, Utc::now());
        let mut data = self.data.lock().unwrap();
        upsert(&mut data.results, result, |a, b| a.id() == b.id());
    }
}

#[async_trait::async_trait]
impl CourseRepository for MemoryStore {
    async fn course_by_id(&self, course_id: &str) -> DatabaseResult<Option<Course>> {
        let data = self.data.lock().unwrap();
        Ok(data.courses.iter().find(|c| c.id() == course_id).cloned())
    }

    async fn courses_by_tutor(&self, tutor_id: &str) -> DatabaseResult<Vec<Course>> {
        if self.faults().list_courses {
            return Err(unavailable());
        }
        let data = self.data.lock().unwrap();
        Ok(data
            .courses
            .iter()
            .filter(|c| c.tutor_id() == tutor_id)
            .cloned()
            .collect())
    }

    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course> {
        let course = data.into_course(new_id());
        self.data.lock().unwrap().courses.push(course.clone());
        Ok(course)
    }
}

#[async_trait::async_trait]
impl EnrolmentRepository for MemoryStore {
    async fn enrolments_by_course(
        &self,
        course_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .enrolments
            .iter()
            .filter(|e| e.course_id() == course_id)
            .filter(|e| status.is_none_or(|s| e.status() == s))
            .cloned()
            .collect())
    }

    async fn enrolments_by_student(
        &self,
        student_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .enrolments
            .iter()
            .filter(|e| e.student_id() == student_id)
            .filter(|e| status.is_none_or(|s| e.status() == s))
            .cloned()
            .collect())
    }

    async fn request_enrolment(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Enrolment> {
        Ok(self.enrol(course_id, student_id, EnrolmentStatus::Pending))
    }

    async fn update_enrolment_status(
        &self,
        course_id: &str,
        student_id: &str,
        status: EnrolmentStatus,
    ) -> DatabaseResult<Option<Enrolment>> {
        let mut data = self.data.lock().unwrap();
        let Some(existing) = data
            .enrolments
            .iter_mut()
            .find(|e| e.course_id() == course_id && e.student_id() == student_id)
        else {
            return Ok(None);
        };
        *existing = existing.clone().with_status(status);
        Ok(Some(existing.clone()))
    }
}

#[async_trait::async_trait]
impl LessonRepository for MemoryStore {
    async fn lessons_by_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>> {
        if self.faults().lessons_of.contains(course_id) {
            return Err(unavailable());
        }
        let data = self.data.lock().unwrap();
        let mut lessons: Vec<Lesson> = data
            .lessons
            .iter()
            .filter(|l| l.course_id() == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order());
        Ok(lessons)
    }

    async fn lesson_by_id(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>> {
        let data = self.data.lock().unwrap();
        Ok(data.lessons.iter().find(|l| l.id() == lesson_id).cloned())
    }

    async fn create_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson> {
        let lesson = data.into_lesson(new_id());
        self.data.lock().unwrap().lessons.push(lesson.clone());
        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        lesson_id: &str,
        data: LessonCreate,
    ) -> DatabaseResult<Option<Lesson>> {
        let mut store = self.data.lock().unwrap();
        let Some(existing) = store.lessons.iter_mut().find(|l| l.id() == lesson_id) else {
            return Ok(None);
        };
        *existing = data.into_lesson(lesson_id.to_string());
        Ok(Some(existing.clone()))
    }
}

#[async_trait::async_trait]
impl ProgressRepository for MemoryStore {
    async fn progress_by_student(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Vec<LessonProgress>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let (delay, fail) = {
            let faults = self.faults();
            let delay = faults
                .progress_delay_of
                .get(student_id)
                .copied()
                .or(faults.progress_delay);
            (delay, faults.progress_of.contains(student_id))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fail {
            return Err(unavailable());
        }
        let data = self.data.lock().unwrap();
        Ok(data
            .progress
            .iter()
            .filter(|p| p.course_id() == course_id && p.student_id() == student_id)
            .cloned()
            .collect())
    }

    async fn mark_lesson_completed(&self, data: ProgressCreate) -> DatabaseResult<LessonProgress> {
        let progress = data.into_progress(Utc::now());
        let mut store = self.data.lock().unwrap();
        upsert(&mut store.progress, progress.clone(), |a, b| a.id() == b.id());
        Ok(progress)
    }
}

#[async_trait::async_trait]
impl QuizRepository for MemoryStore {
    async fn quiz_by_course(&self, course_id: &str) -> DatabaseResult<Option<Quiz>> {
        let data = self.data.lock().unwrap();
        Ok(data.quizzes.iter().find(|q| q.course_id() == course_id).cloned())
    }

    async fn quiz_by_id(&self, quiz_id: &str) -> DatabaseResult<Option<Quiz>> {
        let data = self.data.lock().unwrap();
        Ok(data.quizzes.iter().find(|q| q.id() == quiz_id).cloned())
    }

    async fn create_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz> {
        let quiz = data.into_quiz(new_id());
        self.data.lock().unwrap().quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn questions_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizQuestion>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .questions
            .iter()
            .filter(|q| q.quiz_id() == quiz_id)
            .cloned()
            .collect())
    }

    async fn add_question(&self, data: QuizQuestionCreate) -> DatabaseResult<QuizQuestion> {
        let question = data.into_question(new_id())?;
        self.data.lock().unwrap().questions.push(question.clone());
        Ok(question)
    }
}

#[async_trait::async_trait]
impl QuizResultRepository for MemoryStore {
    async fn quiz_result(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Option<QuizResult>> {
        if self.faults().results_of.contains(student_id) {
            return Err(unavailable());
        }
        let data = self.data.lock().unwrap();
        Ok(data
            .results
            .iter()
            .find(|r| r.quiz_id() == quiz_id && r.student_id() == student_id)
            .cloned())
    }

    async fn quiz_results_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizResult>> {
        let data = self.data.lock().unwrap();
        Ok(data
            .results
            .iter()
            .filter(|r| r.quiz_id() == quiz_id)
            .cloned()
            .collect())
    }

    async fn save_quiz_result(&self, result: &QuizResult) -> DatabaseResult<()> {
        let mut data = self.data.lock().unwrap();
        upsert(&mut data.results, result.clone(), |a, b| a.id() == b.id());
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

pub fn setup_server(store: Arc<MemoryStore>) -> TestApp {
    let (state, router) =
        build_server_with_store(store, JWT_SECRET, EngineConfig::default(), false);
    let server = TestServer::new(router).unwrap();
    TestApp { server, state }
}

pub fn token_for(user_id: &str, role: &str) -> String {
    let claims = UserClaims::new(user_id, role, chrono::Duration::hours(1));
    generate_token(&claims, JWT_SECRET).unwrap()
}

#[derive(Debug, Default)]
pub struct FlowContext {
    pub store: HashMap<&'static str, Value>, // a way to pass data between steps
}

impl FlowContext {
    pub fn store(&mut self, key: &'static str, val: Value) {
        self.store.insert(key, val);
    }

    pub fn get(&self, key: &str) -> &Value {
        self.store.get(key).expect("missing store key")
    }

    pub fn get_json<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.get(key).clone()).expect("Invalid json format")
    }
}

pub struct Action {
    pub name: &'static str,
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub expect: StatusCode,
    pub user: Option<(String, &'static str)>,
    pub body_asserts: Vec<Box<dyn Fn(&Value) + Send + Sync>>,
    pub save_as: Option<&'static str>,
}

impl Action {
    pub fn new(name: &'static str, method: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            method,
            path: path.into(),
            body: None,
            expect: StatusCode::OK,
            user: None,
            body_asserts: vec![],
            save_as: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_expect(mut self, expect: StatusCode) -> Self {
        self.expect = expect;
        self
    }

    /// Sends the request with a session cookie for `user_id`.
    pub fn as_user(mut self, user_id: &str, role: &'static str) -> Self {
        self.user = Some((user_id.to_string(), role));
        self
    }

    pub fn with_save_as(mut self, key: &'static str) -> Self {
        self.save_as = Some(key);
        self
    }

    pub fn assert_body<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.body_asserts.push(Box::new(check));
        self
    }
}

#[derive(Default)]
pub struct Flow {
    actions: Vec<Action>,
}

impl Flow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub async fn run(self, app: &TestApp) -> FlowContext {
        let mut ctx = FlowContext::default();
        for action in self.actions {
            println!("==> Running test action `{}`", action.name);

            let mut req = match action.method {
                "GET" => app.server.get(&action.path),
                "POST" => app.server.post(&action.path),
                "PUT" => app.server.put(&action.path),
                _ => panic!("unsupported method {}", action.method),
            };

            if let Some(json) = &action.body {
                req = req.json(json);
            }

            if let Some((user_id, role)) = &action.user {
                req = req.add_cookie(Cookie::new(AUTH_TOKEN, token_for(user_id, role)));
            }

            let resp = req.await;
            resp.assert_status(action.expect);

            if !action.body_asserts.is_empty() || action.save_as.is_some() {
                let body = resp.json::<Value>();
                for check in &action.body_asserts {
                    check(&body);
                }
                if let Some(save_key) = action.save_as {
                    ctx.store(save_key, body);
                }
            }
        }
        ctx
    }
}
