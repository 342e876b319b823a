//! Login, registration and session inspection.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use tracing::warn;

use super::{prompt_line, Context};
use crate::format::format_datetime;
use studyhub_core::models::{Credentials, RegistrationForm, User};
use studyhub_core::Config;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email (defaults to the last one used)
    #[arg(short, long)]
    pub email: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Account email
    #[arg(short, long)]
    pub email: String,
}

fn describe(user: &User) -> String {
    format!("{} <{}>", user.name, user.email)
}

/// The session's error line, falling back to the error itself.
fn failure(ctx: &Context, error: studyhub_core::ApiError) -> anyhow::Error {
    anyhow!(ctx
        .session
        .status()
        .error()
        .unwrap_or_else(|| error.user_message()))
}

/// Only `last_email` is written back; `ctx.config` carries run-only overrides.
fn remember_email(ctx: &mut Context, email: String) {
    if let Err(e) = Config::remember_email(&email) {
        warn!(error = %e, "Failed to remember email");
    }
    ctx.config.last_email = Some(email);
}

pub async fn login(args: LoginArgs, ctx: &mut Context) -> Result<()> {
    let email = match args.email.or_else(|| ctx.config.last_email.clone()) {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    if email.is_empty() {
        bail!("Preencha todos os campos");
    }
    let password = rpassword::prompt_password("Senha: ")?;
    if password.is_empty() {
        bail!("Preencha todos os campos");
    }

    let credentials = Credentials::new(email.clone(), password);
    let user = ctx
        .session
        .login(&ctx.api, &credentials)
        .await
        .map_err(|e| failure(ctx, e))?;

    remember_email(ctx, email);

    ctx.print(&user, |user| println!("Logado como {}", describe(user)))
}

pub async fn register(args: RegisterArgs, ctx: &mut Context) -> Result<()> {
    let password = rpassword::prompt_password("Senha: ")?;
    let confirm_password = rpassword::prompt_password("Confirme a senha: ")?;

    let form = RegistrationForm {
        name: args.name,
        email: args.email,
        password,
        confirm_password,
    };
    let request = form.validate().map_err(|message| anyhow!(message))?;

    let user = ctx
        .session
        .register(&ctx.api, &request)
        .await
        .map_err(|e| failure(ctx, e))?;

    remember_email(ctx, user.email.clone());

    ctx.print(&user, |user| println!("Conta criada. Logado como {}", describe(user)))
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.session.logout();
    if !ctx.json_output {
        println!("Sessão encerrada.");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let Some(user) = ctx.session.current_user() else {
        bail!("Nenhuma sessão ativa. Use `studyhub login`.");
    };
    let expires_at = ctx.session.expires_at();
    let authenticated = ctx.session.is_authenticated();

    if ctx.json_output {
        let body = serde_json::json!({
            "user": user,
            "authenticated": authenticated,
            "expires_at": expires_at,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", describe(&user));
    match (authenticated, expires_at) {
        (true, Some(at)) => println!("Sessão válida até {}", format_datetime(&at)),
        (false, Some(at)) => println!("Sessão expirada em {}", format_datetime(&at)),
        (_, None) => println!("Validade da sessão desconhecida"),
    }
    Ok(())
}

pub async fn refresh(ctx: &Context) -> Result<()> {
    let user = ctx
        .session
        .refresh(&ctx.api)
        .await
        .map_err(|e| failure(ctx, e))?;
    let expires_at = ctx.session.expires_at();
    ctx.print(&user, |user| {
        println!("Sessão renovada para {}", describe(user));
        if let Some(at) = expires_at {
            println!("Válida até {}", format_datetime(&at));
        }
    })
}
