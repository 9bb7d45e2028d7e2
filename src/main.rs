//! Protocol: OMEGA - console demo front-end.
//!
//! A thin presentation layer over [`EscapeSession`] that walks the full
//! game loop on stdin/stdout. All game semantics live in the library.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use protocol_omega::{
    Advance, Attempt, Bin, Catalog, EscapeSession, GeminiClient, GeminiConfig, PuzzleData, Room,
    SortAttempt, Verdict,
};
use std::io::Write as _;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            Catalog::from_toml_str(&content)?
        }
        None => Catalog::builtin(),
    };

    let config = if cli.offline {
        GeminiConfig::offline()
    } else {
        GeminiConfig::from_env()
    };
    let session = EscapeSession::new(catalog, Arc::new(GeminiClient::new(config)));

    info!("Starting console front-end");
    println!("=== {} ===", session.catalog().game_title());
    println!("Alert in the school sector! The mainframe is under attack.");
    println!("Press Enter to start the diagnostics.");
    read_line()?;

    session.start()?;

    loop {
        let room = session.current_room()?;
        println!();
        println!("--- {} ---", room.title());
        println!("{}", room.description());

        if let Some(image) = session.ensure_illustration().await? {
            println!("[visual link: {}]", summarize_image(image.as_str()));
        }

        run_puzzle(&session, &room).await?;

        match session.advance()? {
            Advance::Moved(_) => continue,
            Advance::Finished => break,
        }
    }

    println!();
    println!("=== MISSION COMPLETE ===");
    println!("The school system is safe again. Well done, operator!");
    if let Some(code) = session.completion_code() {
        println!("Secret completion code: {}", code);
    }

    Ok(())
}

/// Runs the current room's puzzle loop until it is solved.
async fn run_puzzle(session: &EscapeSession, room: &Room) -> Result<()> {
    match room.puzzle() {
        PuzzleData::Quiz(quiz) => loop {
            println!();
            println!("{}", quiz.question());
            for (i, option) in quiz.options().iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            let line = prompt("answer number (or 'hint')")?;
            if line == "hint" {
                show_hint(session).await;
                continue;
            }
            let Ok(number) = line.parse::<usize>() else {
                println!("Please enter a number.");
                continue;
            };
            let selected = number.saturating_sub(1);
            match session.submit_attempt(Attempt::Quiz { selected }) {
                Ok(Verdict::Solved { feedback }) => {
                    if let Some(feedback) = feedback {
                        println!("{}", feedback);
                    }
                    return Ok(());
                }
                Ok(_) => println!("Access denied. Wrong answer, the system resets..."),
                Err(e) => println!("Input rejected: {}", e),
            }
        },
        PuzzleData::Lock(lock) => loop {
            println!();
            println!("DIGITAL LOCK - clue on the wall: {}", lock.hint_text());
            let line = prompt("enter the code (or 'hint')")?;
            if line == "hint" {
                show_hint(session).await;
                continue;
            }
            let mut rejected = false;
            for ch in line.chars() {
                if let Err(e) = session.press_digit(ch) {
                    println!("Input rejected: {}", e);
                    session.clear_code();
                    rejected = true;
                    break;
                }
            }
            if rejected {
                continue;
            }
            match session.submit_code()? {
                Verdict::Solved { .. } => {
                    println!("OPEN.");
                    return Ok(());
                }
                _ => println!("ERROR. The lock resets."),
            }
        },
        PuzzleData::Sort { items } => loop {
            println!();
            println!("Sort each device into INPUT (i) or OUTPUT (o).");
            let mut attempt = SortAttempt::new();
            for item in items {
                loop {
                    let line = prompt(&format!("{} [i/o]", item.label()))?;
                    match line.as_str() {
                        "i" => {
                            attempt.place(item.id().clone(), Bin::Input);
                            break;
                        }
                        "o" => {
                            attempt.place(item.id().clone(), Bin::Output);
                            break;
                        }
                        "hint" => show_hint(session).await,
                        _ => println!("Please answer 'i' or 'o'."),
                    }
                }
            }
            match session.submit_attempt(Attempt::Sort(attempt))? {
                Verdict::Solved { .. } => {
                    println!("Excellent! Everything is in place.");
                    return Ok(());
                }
                Verdict::Incomplete => println!("Sort all the items first!"),
                Verdict::NotSolved => println!("Something is wrong. Try again."),
            }
        },
    }
}

/// Requests and prints a hint for the current room.
async fn show_hint(session: &EscapeSession) {
    println!("Analyzing data...");
    match session.request_hint().await {
        Ok(Some(text)) => println!("AI guide: {}", text),
        Ok(None) => {}
        Err(e) => println!("AI guide unavailable: {}", e),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}> ", label);
    std::io::stdout().flush()?;
    read_line()
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Keeps inline data URLs out of the terminal.
fn summarize_image(url: &str) -> String {
    if url.starts_with("data:") {
        format!("inline image, {} bytes", url.len())
    } else {
        url.to_string()
    }
}
