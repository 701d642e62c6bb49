//! voxchat CLI - interactive assistant with spoken replies.
//!
//! Reads prompts line by line, prints the assistant's reply, and saves a
//! narrated audio file for each reply when a speech credential is configured.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use voxchat::prelude::*;

/// voxchat - chat assistant that answers in text and speech
#[derive(Parser)]
#[command(name = "voxchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory to write synthesized audio files to (overrides CHATBOT_AUDIO_DIR)
    #[arg(long, env = "CHATBOT_AUDIO_DIR")]
    audio_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("voxchat={level},voxchat_bot={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.audio_dir {
        settings = settings.with_audio_dir(dir);
    }

    let mut bot = ChatBot::new(settings)?;

    println!("voxchat");
    println!("Type your prompt and press enter. Submit an empty line to exit.\n");
    if !bot.narration_enabled() {
        tracing::debug!("HEYGEN_API_KEY not set; replies will not be narrated");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let prompt = line.trim();
        if prompt.is_empty() {
            println!("Goodbye!");
            break;
        }

        let reply = bot.ask(prompt).await?;
        println!("Assistant: {reply}");

        match bot.speak(&reply).await {
            Some(path) => println!("Audio saved to: {}", path.display()),
            None => println!("Audio synthesis skipped."),
        }
    }

    Ok(())
}
