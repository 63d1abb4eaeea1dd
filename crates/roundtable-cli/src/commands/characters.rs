use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use colored::Colorize;
use roundtable_core::participant::{CharacterSource, ModelProvider, ParticipantKind};

use crate::context::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    for c in ctx.usecase.available_characters().await? {
        let source = match c.source {
            CharacterSource::System => "built-in",
            CharacterSource::User => "custom",
        };
        let kind = match &c.kind {
            ParticipantKind::Scripted { phrases } => format!("scripted, {} phrases", phrases.len()),
            ParticipantKind::Generative {
                binding: Some(binding),
                ..
            } => format!("{} / {}", binding.provider, binding.model),
            ParticipantKind::Generative { binding: None, .. } => "no model configured".to_string(),
        };
        println!(
            "{:<12} {:<16} {} {}",
            c.id.bold(),
            c.name,
            format!("[{}]", source).bright_black(),
            kind.bright_black()
        );
    }
    Ok(())
}

pub async fn models(ctx: &AppContext, provider: &str, endpoint: Option<&str>) -> Result<()> {
    let provider =
        ModelProvider::from_str(provider).map_err(|_| anyhow!("Unknown provider '{}'", provider))?;
    let models = ctx.router.list_models(provider, endpoint).await;
    if models.is_empty() {
        println!("{}", format!("No models found for {}", provider).yellow());
    }
    for model in models {
        println!("{}", model);
    }
    Ok(())
}

pub async fn probe(ctx: &AppContext, character_id: &str) -> Result<()> {
    let character = ctx
        .usecase
        .find_characters(&[character_id.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Character '{}' not found", character_id))?;
    let Some(binding) = character.binding() else {
        bail!("{} has no model binding to test", character.name);
    };

    println!("Probing {} ({} / {})", character.name, binding.provider, binding.model);
    if ctx.router.probe(binding).await {
        println!("{}", "ok".bright_green());
    } else {
        println!("{}", "failed".bright_red());
    }
    Ok(())
}
