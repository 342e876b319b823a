//! Student profile command.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use studyhub_core::models::CreateStudentRequest;

#[derive(Args, Debug)]
pub struct StudentsArgs {
    #[command(subcommand)]
    pub command: StudentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StudentsCommand {
    /// List student profiles
    List,

    /// Create the profile of the logged-in account
    Create {
        /// Defaults to the account name
        #[arg(short, long)]
        name: Option<String>,

        /// Defaults to the account email
        #[arg(short, long)]
        email: Option<String>,
    },
}

pub async fn run(args: StudentsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let api = ctx.api.students();

    match args.command {
        StudentsCommand::List => {
            let students = load_view(api.list()).await?;
            ctx.print(&students, |students| {
                for student in students {
                    println!("{:<38} {:<30} {}", student.id, student.name, student.email);
                }
            })
        }
        StudentsCommand::Create { name, email } => {
            let Some(user) = ctx.session.current_user() else {
                bail!("Nenhuma sessão ativa. Use `studyhub login`.");
            };
            let request = CreateStudentRequest {
                name: name.unwrap_or(user.name),
                email: email.unwrap_or(user.email),
            };
            let student = api.create(&request).await.or_user_message()?;
            ctx.print(&student, |s| println!("Perfil criado: {} ({})", s.name, s.id))
        }
    }
}
