mod course;
pub use course::{Course, CourseCreate};

mod lesson;
pub use lesson::{ContentBlock, Lesson, LessonCreate, LessonPage};

mod lesson_progress;
pub use lesson_progress::{LessonProgress, ProgressCreate};

mod enrolment;
pub use enrolment::{Enrolment, EnrolmentStatus};

mod quiz;
pub use quiz::{
    AnswerKey, QuestionType, Quiz, QuizCreate, QuizQuestion, QuizQuestionCreate, QuizQuestionRow,
};

mod quiz_result;
pub use quiz_result::QuizResult;
