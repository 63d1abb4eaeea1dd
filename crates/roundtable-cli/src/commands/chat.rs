//! Interactive REPL over one running discussion.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::{Context as _, Result};
use colored::Colorize;
use roundtable_core::discussion::RoundtableEvent;
use roundtable_core::participant::Participant;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper, history::DefaultHistory};
use tokio::sync::broadcast;

use crate::context::AppContext;
use crate::render;

const COMMANDS: &[&str] = &["/mention", "/quit", "/reset", "/start", "/status", "/stop"];

/// Completes slash commands and `@Name` mentions.
struct ChatHelper {
    names: Vec<String>,
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return Ok((0, candidates));
        }

        if let Some(at) = line.rfind('@') {
            let partial = line[at + 1..].to_lowercase();
            let candidates = self
                .names
                .iter()
                .filter(|name| name.to_lowercase().starts_with(&partial))
                .map(|name| Pair {
                    display: name.clone(),
                    replacement: format!("{} ", name),
                })
                .collect();
            return Ok((at + 1, candidates));
        }

        Ok((0, vec![]))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ChatHelper {}

/// Prints runtime events as they arrive.
fn spawn_printer(
    mut events: broadcast::Receiver<RoundtableEvent>,
    roster: Vec<Participant>,
    user_name: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render::event(&event, &roster, &user_name) {
                        println!("{}", line);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Terminal fell behind the discussion");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

pub async fn run(ctx: &AppContext, discussion_id: &str) -> Result<()> {
    let handle = ctx
        .usecase
        .open_discussion(discussion_id)
        .await
        .with_context(|| format!("Could not open discussion {}", discussion_id))?;
    let discussion = ctx.usecase.find(discussion_id).await?;
    let roster = discussion.roster;
    let user_name = ctx.config.display.user_name.clone();

    println!("{}", format!("=== {} ===", discussion.title).bright_magenta().bold());
    println!("{} {}", "Topic:".bright_black(), discussion.topic);
    println!(
        "{}",
        "Type to join in. /mention <name>, /reset, /stop, /start, /status, /quit.".bright_black()
    );
    println!();
    for turn in handle.turns().await? {
        println!("{}", render::turn(&turn, &roster, &user_name));
    }

    let printer = spawn_printer(handle.subscribe(), roster.clone(), user_name.clone());
    handle.start().await?;

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper {
        names: roster.iter().map(|p| p.name.clone()).collect(),
    }));
    let prompt = format!("{}> ", user_name);
    let mut draft = String::new();

    loop {
        let initial = std::mem::take(&mut draft);
        let readline =
            tokio::task::block_in_place(|| rl.readline_with_initial(&prompt, (&initial, "")));

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed.split_once(' ').unwrap_or((trimmed, "")) {
                    ("/quit" | "/exit", _) => break,
                    ("/reset", _) => {
                        handle.reset().await?;
                    }
                    ("/stop", _) => {
                        handle.stop().await?;
                        println!("{}", "Paused. /start to resume.".bright_black());
                    }
                    ("/start", _) => handle.start().await?,
                    ("/status", _) => println!("{}", render::status(&handle.status())),
                    ("/mention", name) => match handle.mention_prefill(name).await? {
                        Some(prefill) => draft = prefill,
                        None => println!("{}", format!("Nobody called '{}' is seated here.", name.trim()).yellow()),
                    },
                    (cmd, _) if cmd.starts_with('/') => {
                        println!("{}", format!("Unknown command {}", cmd).yellow());
                    }
                    _ => {
                        if let Some(outcome) = handle.send_user(trimmed).await? {
                            println!("{}", render::turn(&outcome.turn, &roster, &user_name));
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to leave.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    handle.stop().await?;
    ctx.usecase.close_discussion(discussion_id).await;
    printer.abort();
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
