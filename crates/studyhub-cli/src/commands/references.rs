//! Bibliography command.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use studyhub_core::models::{CreateExamReferenceRequest, ReferenceKind};

#[derive(Args, Debug)]
pub struct ReferencesArgs {
    #[command(subcommand)]
    pub command: ReferencesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReferencesCommand {
    /// List bibliography entries
    List {
        /// Only entries of this exam
        #[arg(short, long)]
        exam: Option<String>,
    },

    /// Add a bibliography entry to an exam
    Create {
        /// Exam ID
        #[arg(short, long)]
        exam: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        author: String,

        #[arg(short, long, default_value = "")]
        publisher: String,

        #[arg(short, long)]
        year: i32,

        /// book, article, website, video or other
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        isbn: Option<String>,
    },

    /// Delete a bibliography entry
    Delete {
        /// Reference ID
        id: String,
    },
}

pub async fn run(args: ReferencesArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let api = ctx.api.references();

    match args.command {
        ReferencesCommand::List { exam } => {
            let references = match exam {
                Some(exam_id) => load_view(api.list_for_exam(&exam_id)).await?,
                None => load_view(api.list()).await?,
            };
            ctx.print(&references, |references| {
                if references.is_empty() {
                    println!("Nenhuma referência.");
                }
                for reference in references {
                    println!("{:<38} [{}] {}", reference.id, reference.kind.label(), reference.citation());
                }
            })
        }
        ReferencesCommand::Create {
            exam,
            title,
            author,
            publisher,
            year,
            kind,
            url,
            isbn,
        } => {
            let kind = kind
                .map(|k| k.parse::<ReferenceKind>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let request = CreateExamReferenceRequest {
                exam_id: exam,
                title,
                author,
                publisher,
                year,
                isbn,
                url,
                description: None,
                kind,
            };
            let reference = api.create(&request).await.or_user_message()?;
            ctx.print(&reference, |r| println!("Referência adicionada: {}", r.citation()))
        }
        ReferencesCommand::Delete { id } => {
            api.delete(&id).await.or_user_message()?;
            if !ctx.json_output {
                println!("Referência removida.");
            }
            Ok(())
        }
    }
}
