//! Exams command.

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use crate::format::{check, format_bytes, format_date};
use studyhub_core::models::{CreateExamRequest, Exam, ExamKind, ExamStatus, UpdateExamRequest};

#[derive(Args, Debug)]
pub struct ExamsArgs {
    #[command(subcommand)]
    pub command: ExamsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExamsCommand {
    /// List exams
    List {
        /// Only exams of this subject
        #[arg(short, long)]
        subject: Option<String>,
    },

    /// Show an exam with its contents, files and bibliography
    Show {
        /// Exam ID
        id: String,
    },

    /// Create an exam
    Create {
        /// Subject ID
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// exam, assignment, project or quiz
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Change an exam
    Update {
        /// Exam ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// pending, in_progress or completed
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete an exam
    Delete {
        /// Exam ID
        id: String,
    },
}

fn parse_kind(kind: Option<String>) -> Result<Option<ExamKind>> {
    kind.map(|k| k.parse::<ExamKind>().map_err(|e| anyhow!(e)))
        .transpose()
}

fn parse_status(status: Option<String>) -> Result<Option<ExamStatus>> {
    status
        .map(|s| s.parse::<ExamStatus>().map_err(|e| anyhow!(e)))
        .transpose()
}

fn print_exam_line(exam: &Exam) {
    let now = Utc::now();
    let flag = if exam.is_overdue(now) { " (atrasada)" } else { "" };
    println!(
        "{:<38} {}  {:<10} {:<12} {}{}",
        exam.id,
        format_date(exam.due_date.as_deref()),
        exam.kind.label(),
        exam.status.label(),
        exam.title,
        flag
    );
}

pub async fn run(args: ExamsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let api = ctx.api.exams();

    match args.command {
        ExamsCommand::List { subject } => {
            let exams = match subject {
                Some(subject_id) => load_view(api.by_subject(&subject_id)).await?,
                None => load_view(api.list()).await?,
            };
            ctx.print(&exams, |exams| {
                if exams.is_empty() {
                    println!("Nenhuma avaliação.");
                }
                exams.iter().for_each(print_exam_line);
            })
        }
        ExamsCommand::Show { id } => {
            let details = load_view(api.details(&id)).await?;
            ctx.print(&details, |d| {
                println!("{} [{} / {}]", d.exam.title, d.exam.kind.label(), d.exam.status.label());
                println!("Entrega: {}", format_date(d.exam.due_date.as_deref()));
                if !d.exam.description.is_empty() {
                    println!("{}", d.exam.description);
                }

                println!("\nConteúdos ({})", d.study_contents.len());
                for content in &d.study_contents {
                    println!("  {} {}", check(content.is_completed), content.title);
                }
                println!("\nArquivos ({})", d.attachments.len());
                for file in &d.attachments {
                    println!("  {} ({})", file.display_name(), format_bytes(file.file_size));
                }
                println!("\nBibliografia ({})", d.references.len());
                for reference in &d.references {
                    println!("  {}", reference.citation());
                }
            })
        }
        ExamsCommand::Create {
            subject,
            title,
            description,
            due,
            kind,
        } => {
            let request = CreateExamRequest {
                subject_id: subject,
                title,
                description,
                due_date: due,
                kind: parse_kind(kind)?,
            };
            let exam = api.create(&request).await.or_user_message()?;
            ctx.print(&exam, |e| println!("Avaliação criada: {} ({})", e.title, e.id))
        }
        ExamsCommand::Update {
            id,
            title,
            description,
            due,
            status,
        } => {
            let request = UpdateExamRequest {
                title,
                description,
                due_date: due,
                status: parse_status(status)?,
                ..Default::default()
            };
            let exam = api.update(&id, &request).await.or_user_message()?;
            ctx.print(&exam, print_exam_line)
        }
        ExamsCommand::Delete { id } => {
            api.delete(&id).await.or_user_message()?;
            if !ctx.json_output {
                println!("Avaliação removida.");
            }
            Ok(())
        }
    }
}
