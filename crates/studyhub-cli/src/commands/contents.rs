//! Study contents command.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use crate::format::{check, truncate};
use studyhub_core::models::{CreateStudyContentRequest, StudyContent};

#[derive(Args, Debug)]
pub struct ContentsArgs {
    #[command(subcommand)]
    pub command: ContentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ContentsCommand {
    /// List study contents
    List {
        /// Only contents of this subject
        #[arg(short, long, conflicts_with = "exam")]
        subject: Option<String>,

        /// Only contents tied to this exam
        #[arg(short, long)]
        exam: Option<String>,
    },

    /// Add a study content
    Create {
        /// Subject ID
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Tie the content to an exam
        #[arg(short, long)]
        exam: Option<String>,
    },

    /// Mark a content as studied
    Complete {
        /// Content ID
        id: String,
    },

    /// Delete a content
    Delete {
        /// Content ID
        id: String,
    },
}

fn print_contents(contents: &[StudyContent]) {
    if contents.is_empty() {
        println!("Nenhum conteúdo.");
    }
    let mut sorted: Vec<&StudyContent> = contents.iter().collect();
    sorted.sort_by_key(|c| c.order);
    for content in sorted {
        println!(
            "{:<38} {} {}",
            content.id,
            check(content.is_completed),
            truncate(&content.title, 60)
        );
    }
}

pub async fn run(args: ContentsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;

    match args.command {
        ContentsCommand::List { subject, exam } => {
            let contents = match (subject, exam) {
                (Some(subject_id), _) => load_view(ctx.api.subjects().study_contents(&subject_id)).await?,
                (None, Some(exam_id)) => load_view(ctx.api.exams().study_contents(&exam_id)).await?,
                (None, None) => load_view(ctx.api.study_contents().list()).await?,
            };
            ctx.print(&contents, |c| print_contents(c))
        }
        ContentsCommand::Create {
            subject,
            title,
            description,
            exam,
        } => {
            let request = CreateStudyContentRequest {
                subject_id: subject,
                exam_id: exam,
                title,
                description,
                order: None,
            };
            let content = ctx
                .api
                .study_contents()
                .create(&request)
                .await
                .or_user_message()?;
            ctx.print(&content, |c| println!("Conteúdo criado: {} ({})", c.title, c.id))
        }
        ContentsCommand::Complete { id } => {
            let content = ctx
                .api
                .study_contents()
                .complete(&id)
                .await
                .or_user_message()?;
            ctx.print(&content, |c| println!("{} {}", check(c.is_completed), c.title))
        }
        ContentsCommand::Delete { id } => {
            ctx.api.study_contents().delete(&id).await.or_user_message()?;
            if !ctx.json_output {
                println!("Conteúdo removido.");
            }
            Ok(())
        }
    }
}
