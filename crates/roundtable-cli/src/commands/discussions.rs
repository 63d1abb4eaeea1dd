use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use roundtable_core::discussion::{CreateDiscussionRequest, DiscussionMode};

use crate::context::AppContext;

pub async fn create(
    ctx: &AppContext,
    topic: String,
    mode: &str,
    title: Option<String>,
    character_ids: &[String],
) -> Result<()> {
    let mode = DiscussionMode::from_str(mode).map_err(|_| {
        anyhow!("Unknown mode '{}' (expected chat, debate, brainstorm, interview or opinion)", mode)
    })?;
    let roster = ctx.usecase.find_characters(character_ids).await?;

    let discussion = ctx
        .usecase
        .create(CreateDiscussionRequest {
            title,
            topic,
            mode,
            roster,
        })
        .await
        .context("Could not create the discussion")?;

    println!("{} {}", "Created".bright_green(), discussion.title.bold());
    println!("{}", discussion.id);
    Ok(())
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    let discussions = ctx.usecase.list().await?;
    if discussions.is_empty() {
        println!(
            "{}",
            format!("No discussions yet in {:?}", ctx.paths.discussions_dir()).bright_black()
        );
        return Ok(());
    }

    for d in discussions {
        let names: Vec<_> = d.roster.iter().map(|p| p.name.as_str()).collect();
        println!("{}  {}", d.id.bright_black(), d.title.bold());
        println!(
            "    {} | {} | {} turns | {}",
            d.mode,
            names.join(", "),
            d.turns.len(),
            d.topic
        );
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, discussion_id: &str) -> Result<()> {
    ctx.usecase.delete(discussion_id).await?;
    println!("{} {}", "Deleted".bright_green(), discussion_id);
    Ok(())
}
