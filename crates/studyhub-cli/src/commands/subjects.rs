//! Subjects command.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use crate::format::{format_date, truncate};
use studyhub_core::models::{CreateSubjectRequest, UpdateSubjectRequest};
use studyhub_core::ResourceList;

#[derive(Args, Debug)]
pub struct SubjectsArgs {
    #[command(subcommand)]
    pub command: SubjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SubjectsCommand {
    /// List all subjects
    List,

    /// Show a subject with its exams
    Show {
        /// Subject ID
        id: String,
    },

    /// Create a subject
    Create {
        /// Subject name
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Change a subject
    Update {
        /// Subject ID
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a subject
    Delete {
        /// Subject ID
        id: String,
    },
}

pub async fn run(args: SubjectsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let api = ctx.api.subjects();

    match args.command {
        SubjectsCommand::List => {
            let subjects = ResourceList::from_server(load_view(api.list()).await?);
            ctx.print(&subjects.as_slice(), |subjects| {
                if subjects.is_empty() {
                    println!("Nenhuma disciplina cadastrada.");
                }
                for subject in subjects.iter() {
                    println!("{:<38} {:<30} {}", subject.id, truncate(&subject.name, 30), truncate(&subject.description, 40));
                }
            })
        }
        SubjectsCommand::Show { id } => {
            let subject = load_view(api.with_exams(&id)).await?;
            ctx.print(&subject, |s| {
                println!("{}", s.subject.name);
                if !s.subject.description.is_empty() {
                    println!("{}", s.subject.description);
                }
                println!();
                if s.exams.is_empty() {
                    println!("Nenhuma avaliação.");
                }
                for exam in &s.exams {
                    println!(
                        "  {}  {:<12} {:<12} {}",
                        format_date(exam.due_date.as_deref()),
                        exam.kind.label(),
                        exam.status.label(),
                        exam.title
                    );
                }
            })
        }
        SubjectsCommand::Create { name, description } => {
            let request = CreateSubjectRequest { name, description };
            let subject = api.create(&request).await.or_user_message()?;
            ctx.print(&subject, |s| println!("Disciplina criada: {} ({})", s.name, s.id))
        }
        SubjectsCommand::Update {
            id,
            name,
            description,
        } => {
            let request = UpdateSubjectRequest { name, description };
            let subject = api.update(&id, &request).await.or_user_message()?;
            ctx.print(&subject, |s| println!("Disciplina atualizada: {}", s.name))
        }
        SubjectsCommand::Delete { id } => {
            api.delete(&id).await.or_user_message()?;
            if !ctx.json_output {
                println!("Disciplina removida.");
            }
            Ok(())
        }
    }
}
