use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use lessonflow::Config;
use lessonflow::auth::{UserClaims, generate_token};
use lessonflow::engine::DashboardAggregator;
use lessonflow::model::entity::{
    AnswerKey, ContentBlock, CourseCreate, EnrolmentStatus, LessonCreate, LessonPage, QuizCreate,
    QuizQuestionCreate,
};
use lessonflow::model::{
    CourseRepository, DbConnection, EnrolmentRepository, LessonRepository, ModelManager,
    QuizRepository,
};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Manage quiz questions
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },

    /// Request (and optionally accept) an enrolment
    Enrol {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        student_id: String,
        #[arg(long, default_value_t = false)]
        accept: bool,
    },

    /// Mint a session token for the `SID` cookie
    Token {
        #[arg(long)]
        user_id: String,
        /// admin, tutor or student
        #[arg(long, default_value = "student")]
        role: String,
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },

    /// Print a tutor's dashboard
    Dashboard {
        #[arg(long)]
        tutor: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        tutor_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        title: String,
        /// Text file with the lesson content, pages separated by a `---` line
        #[arg(long)]
        file: String,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        created_by: String,
        #[arg(long)]
        total_marks: i32,
        #[arg(long, default_value_t = 50)]
        pass_percentage: i32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QuestionKind {
    Mcq,
    Msq,
    Fill,
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    Add {
        #[arg(long)]
        quiz_id: String,
        #[arg(long)]
        text: String,
        #[arg(long, value_enum)]
        kind: QuestionKind,
        /// Repeat for every option
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long, default_value_t = 1)]
        marks: i32,
        /// Correct option index (mcq)
        #[arg(long)]
        correct_index: Option<i32>,
        /// Correct option indices, comma separated (msq)
        #[arg(long, value_delimiter = ',')]
        correct_indices: Vec<i32>,
        /// Expected answer (fill)
        #[arg(long)]
        correct_text: Option<String>,
    },
}

fn pages_from_text(content: &str) -> Vec<LessonPage> {
    content
        .split("\n---\n")
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(|page| {
            LessonPage::new(vec![ContentBlock::Text {
                text: page.to_string(),
            }])
        })
        .collect()
}

fn missing_arg(flag: &str) -> ! {
    Cli::command()
        .error(
            clap::error::ErrorKind::MissingRequiredArgument,
            format!("--{flag} is required for this question kind"),
        )
        .exit()
}

fn answer_key(
    kind: QuestionKind,
    correct_index: Option<i32>,
    correct_indices: Vec<i32>,
    correct_text: Option<String>,
) -> AnswerKey {
    match kind {
        QuestionKind::Mcq => AnswerKey::Mcq {
            correct_answer_index: correct_index.unwrap_or_else(|| missing_arg("correct-index")),
        },
        QuestionKind::Msq if correct_indices.is_empty() => missing_arg("correct-indices"),
        QuestionKind::Msq => AnswerKey::Msq {
            correct_answer_indices: correct_indices,
        },
        QuestionKind::Fill => AnswerKey::Fill {
            correct_answer_text: correct_text.unwrap_or_else(|| missing_arg("correct-text")),
        },
    }
}

#[tokio::main]
async fn main() -> lessonflow::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let config = Config::get_or_init(cfg!(debug_assertions)).await;
    let database_uri =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| config.app().database_uri().to_string());

    let db_con = DbConnection::connect(&database_uri, config.app().max_connections())?;
    let mm = ModelManager::new(db_con);

    match args.command {
        Commands::Course { action } => match action {
            CourseCommands::Add {
                tutor_id,
                title,
                description,
            } => {
                let course = mm
                    .create_course(CourseCreate {
                        tutor_id,
                        title,
                        description,
                    })
                    .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_id,
                title,
                file,
                order_index,
            } => {
                let content = std::fs::read_to_string(file)?;
                let lesson = mm
                    .create_lesson(LessonCreate {
                        course_id,
                        title,
                        pages: pages_from_text(&content),
                        order: order_index,
                    })
                    .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add {
                course_id,
                title,
                description,
                created_by,
                total_marks,
                pass_percentage,
            } => {
                let quiz = mm
                    .create_quiz(QuizCreate {
                        course_id,
                        title,
                        description,
                        created_by,
                        total_marks,
                        pass_percentage,
                    })
                    .await?;
                println!("Quiz created: {:?}", quiz);
            }
        },

        Commands::Question { action } => match action {
            QuestionCommands::Add {
                quiz_id,
                text,
                kind,
                options,
                marks,
                correct_index,
                correct_indices,
                correct_text,
            } => {
                let answer = answer_key(kind, correct_index, correct_indices, correct_text);
                let question = mm
                    .add_question(QuizQuestionCreate {
                        quiz_id,
                        question_text: text,
                        options,
                        marks,
                        answer,
                    })
                    .await?;
                println!("Question created: {:?}", question);
            }
        },

        Commands::Enrol {
            course_id,
            student_id,
            accept,
        } => {
            let mut enrolment = mm.request_enrolment(&course_id, &student_id).await?;
            if accept {
                if let Some(accepted) = mm
                    .update_enrolment_status(&course_id, &student_id, EnrolmentStatus::Accepted)
                    .await?
                {
                    enrolment = accepted;
                }
            }
            println!("Enrolment: {:?}", enrolment);
        }

        Commands::Token {
            user_id,
            role,
            ttl_hours,
        } => {
            let claims = UserClaims::new(user_id, role, chrono::Duration::hours(ttl_hours));
            let token = generate_token(&claims, config.app().jwt())
                .map_err(lessonflow::auth::CryptError::from)?;
            println!("{token}");
        }

        Commands::Dashboard { tutor } => {
            let aggregator = DashboardAggregator::new(Arc::new(mm), config.engine().clone());
            for report in aggregator.aggregate(&tutor).await? {
                match report.analytics {
                    Ok(a) => println!(
                        "{} ({}): enrolled {}, avg {:.2}%, completed {}, passed {}, unavailable {}",
                        report.course_title,
                        report.course_id,
                        a.enrolled_count,
                        a.average_progress,
                        a.completed_count,
                        a.passed_quiz_count,
                        a.unavailable_students,
                    ),
                    Err(e) => println!("{} ({}): error: {e}", report.course_title, report.course_id),
                }
            }
        }
    }

    Ok(())
}
