//! Dashboard command: the overview screen.

use anyhow::Result;
use chrono::Utc;

use super::Context;
use crate::format::{format_bytes, format_date};
use studyhub_core::DashboardData;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.require_session().await?;

    let data = DashboardData::load(&ctx.api).await;
    let stats = data.stats(Utc::now());

    if ctx.json_output {
        let body = serde_json::json!({ "stats": stats, "missing": &data.missing });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if let Some(user) = ctx.session.current_user() {
        println!("Olá, {}!", user.name);
        println!();
    }

    println!("Disciplinas:   {}", stats.subjects);
    println!(
        "Avaliações:    {} ({} pendentes, {} em andamento, {} concluídas, {} atrasadas)",
        stats.exams,
        stats.pending_exams,
        stats.in_progress_exams,
        stats.completed_exams,
        stats.overdue_exams
    );
    println!(
        "Conteúdos:     {}/{} estudados ({}%)",
        stats.completed_contents,
        stats.contents,
        stats.completion_percent()
    );
    println!("Arquivos:      {} ({})", stats.files, format_bytes(stats.file_bytes));
    println!("Bibliografia:  {}", stats.bibliography);

    if !stats.upcoming.is_empty() {
        println!("\nPróximas entregas");
        for exam in &stats.upcoming {
            println!("  {}  {}", format_date(exam.due_date.as_deref()), exam.title);
        }
    }

    if !stats.by_subject.is_empty() {
        println!("\nPor disciplina");
        for subject in &stats.by_subject {
            println!(
                "  {:<30} {} avaliações em aberto, {}/{} conteúdos",
                subject.name, subject.open_exams, subject.completed_contents, subject.contents
            );
        }
    }

    if !data.is_complete() {
        let labels: Vec<&str> = data.missing.iter().map(|d| d.label()).collect();
        eprintln!("\nNão foi possível carregar: {}", labels.join(", "));
    }
    Ok(())
}
