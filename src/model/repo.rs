//! Storage capabilities consumed by the engine and the web layer.
//!
//! Every trait is object safe so callers can hold an `Arc<dyn Store>` and
//! swap the PostgreSQL implementation for anything else that speaks the
//! same contract.

use crate::model::{
    entity::{
        Course, CourseCreate, Enrolment, EnrolmentStatus, Lesson, LessonCreate, LessonProgress,
        ProgressCreate, Quiz, QuizCreate, QuizQuestion, QuizQuestionCreate, QuizResult,
    },
    error::DatabaseResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Course,
    Enrolment,
    Lesson,
    LessonProgress,
    Quiz,
    QuizQuestion,
    QuizResult,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Course => "course",
            Self::Enrolment => "enrolment",
            Self::Lesson => "lesson",
            Self::LessonProgress => "lesson progress",
            Self::Quiz => "quiz",
            Self::QuizQuestion => "quiz question",
            Self::QuizResult => "quiz result",
        };
        f.write_str(name)
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

#[async_trait::async_trait]
pub trait CourseRepository: Send + Sync {
    async fn course_by_id(&self, course_id: &str) -> DatabaseResult<Option<Course>>;
    async fn courses_by_tutor(&self, tutor_id: &str) -> DatabaseResult<Vec<Course>>;
    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course>;
}

#[async_trait::async_trait]
pub trait EnrolmentRepository: Send + Sync {
    async fn enrolments_by_course(
        &self,
        course_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>>;

    async fn enrolments_by_student(
        &self,
        student_id: &str,
        status: Option<EnrolmentStatus>,
    ) -> DatabaseResult<Vec<Enrolment>>;

    /// Creates (or resets) the enrolment as `PENDING`.
    async fn request_enrolment(&self, course_id: &str, student_id: &str)
    -> DatabaseResult<Enrolment>;

    /// Returns `None` when no enrolment exists for the pair.
    async fn update_enrolment_status(
        &self,
        course_id: &str,
        student_id: &str,
        status: EnrolmentStatus,
    ) -> DatabaseResult<Option<Enrolment>>;
}

#[async_trait::async_trait]
pub trait LessonRepository: Send + Sync {
    /// Lessons of a course ordered by `order`, ties in creation order.
    async fn lessons_by_course(&self, course_id: &str) -> DatabaseResult<Vec<Lesson>>;
    async fn lesson_by_id(&self, lesson_id: &str) -> DatabaseResult<Option<Lesson>>;
    async fn create_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson>;
    async fn update_lesson(
        &self,
        lesson_id: &str,
        data: LessonCreate,
    ) -> DatabaseResult<Option<Lesson>>;
}

#[async_trait::async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn progress_by_student(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Vec<LessonProgress>>;

    /// Upserts keyed by (student, lesson); a repeat completion overwrites.
    async fn mark_lesson_completed(&self, data: ProgressCreate) -> DatabaseResult<LessonProgress>;
}

#[async_trait::async_trait]
pub trait QuizRepository: Send + Sync {
    /// A course carries at most one quiz.
    async fn quiz_by_course(&self, course_id: &str) -> DatabaseResult<Option<Quiz>>;
    async fn quiz_by_id(&self, quiz_id: &str) -> DatabaseResult<Option<Quiz>>;
    async fn create_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz>;
    async fn questions_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizQuestion>>;
    async fn add_question(&self, data: QuizQuestionCreate) -> DatabaseResult<QuizQuestion>;
}

#[async_trait::async_trait]
pub trait QuizResultRepository: Send + Sync {
    async fn quiz_result(
        &self,
        quiz_id: &str,
        student_id: &str,
    ) -> DatabaseResult<Option<QuizResult>>;

    async fn quiz_results_by_quiz(&self, quiz_id: &str) -> DatabaseResult<Vec<QuizResult>>;

    /// Upserts keyed by (quiz, student); the last submission wins.
    async fn save_quiz_result(&self, result: &QuizResult) -> DatabaseResult<()>;
}

/// Everything the application needs from storage.
pub trait Store:
    CourseRepository
    + EnrolmentRepository
    + LessonRepository
    + ProgressRepository
    + QuizRepository
    + QuizResultRepository
{
}

impl<T> Store for T where
    T: CourseRepository
        + EnrolmentRepository
        + LessonRepository
        + ProgressRepository
        + QuizRepository
        + QuizResultRepository
{
}
