//! Attachments command: upload and download exam files.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use super::{load_view, Context, UserFacing};
use crate::format::{format_bytes, truncate};
use studyhub_core::models::UploadFile;

#[derive(Args, Debug)]
pub struct AttachmentsArgs {
    #[command(subcommand)]
    pub command: AttachmentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AttachmentsCommand {
    /// List files
    List {
        /// Only files of this exam
        #[arg(short, long)]
        exam: Option<String>,
    },

    /// Upload a file to an exam
    Upload {
        /// Exam ID
        #[arg(short, long)]
        exam: String,

        /// File to upload
        path: PathBuf,

        #[arg(short, long)]
        description: Option<String>,

        /// MIME type (left to the service when omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Download a file
    Download {
        /// Attachment ID
        id: String,

        /// Where to write (defaults to the original file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a file
    Delete {
        /// Attachment ID
        id: String,
    },
}

pub async fn run(args: AttachmentsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session().await?;
    let api = ctx.api.attachments();

    match args.command {
        AttachmentsCommand::List { exam } => {
            let files = match exam {
                Some(exam_id) => load_view(api.list_for_exam(&exam_id)).await?,
                None => load_view(api.list()).await?,
            };
            ctx.print(&files, |files| {
                if files.is_empty() {
                    println!("Nenhum arquivo.");
                }
                for file in files {
                    println!(
                        "{:<38} {:<40} {:>10}  {}",
                        file.id,
                        truncate(file.display_name(), 40),
                        format_bytes(file.file_size),
                        truncate(&file.description, 30)
                    );
                }
            })
        }
        AttachmentsCommand::Upload {
            exam,
            path,
            description,
            mime,
        } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "arquivo".to_string());
            let mut file = UploadFile::new(file_name, bytes);
            if let Some(mime) = mime {
                file = file.with_mime_type(mime);
            }

            let attachment = api
                .upload(&exam, file, description.as_deref())
                .await
                .or_user_message()?;
            ctx.print(&attachment, |a| {
                println!("Arquivo enviado: {} ({})", a.display_name(), format_bytes(a.file_size))
            })
        }
        AttachmentsCommand::Download { id, output } => {
            let output = match output {
                Some(path) => path,
                None => {
                    let attachment = api.get(&id).await.or_user_message()?;
                    PathBuf::from(attachment.display_name())
                }
            };
            let bytes = api.download(&id).await.or_user_message()?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            if !ctx.json_output {
                println!("{} salvo ({})", output.display(), format_bytes(bytes.len() as u64));
            }
            Ok(())
        }
        AttachmentsCommand::Delete { id } => {
            api.delete(&id).await.or_user_message()?;
            if !ctx.json_output {
                println!("Arquivo removido.");
            }
            Ok(())
        }
    }
}
