//! Terminal client for the diary: lists, adds and deletes entries through
//! either a diary server or a local JSON file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use diary_api::client::{
    Confirm, DiaryView, LocalNoteRepository, NoteRepository, RemoteNoteRepository,
};

/// Default diary server address
const DEFAULT_SERVER: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "diary")]
#[command(about = "Personal diary client")]
#[command(version)]
struct Cli {
    /// Diary server URL
    #[arg(long, env = "DIARY_SERVER", conflicts_with = "local")]
    server: Option<String>,

    /// Keep entries in this JSON file instead of on a server
    #[arg(long, env = "DIARY_LOCAL_FILE")]
    local: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every entry, newest first
    List,

    /// Write a new entry
    Add {
        #[arg(long, short = 't')]
        title: String,

        #[arg(long, short = 'c', default_value = "")]
        content: String,

        /// happy, sad, angry, tired, anxious, calm, excited or neutral
        #[arg(long, short = 'm', default_value = "")]
        mood: String,

        /// Background color as #rgb or #rrggbb
        #[arg(long, default_value = "#ffffff")]
        color: String,
    },

    /// Delete an entry by id
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

async fn open_repository(cli: &Cli) -> Result<Box<dyn NoteRepository>> {
    if let Some(path) = &cli.local {
        tracing::debug!(path = %path.display(), "Using local diary file");
        return Ok(Box::new(LocalNoteRepository::open(path).await?));
    }

    let server = cli.server.as_deref().unwrap_or(DEFAULT_SERVER);
    tracing::debug!(server, "Using diary server");
    Ok(Box::new(RemoteNoteRepository::new(server)))
}

async fn run(cli: Cli) -> Result<bool> {
    let repo = open_repository(&cli).await?;
    let mut view = DiaryView::new(repo);

    let (ok, output) = match cli.command {
        Commands::List => {
            let ok = view.load().await.is_ok();
            (ok, ok.then(|| view.render_text()))
        }
        Commands::Add {
            title,
            content,
            mood,
            color,
        } => {
            view.form.title = title;
            view.form.content = content;
            view.form.mood = mood;
            view.form.background_color = color;
            let ok = view.submit().await.is_ok();
            (ok, view.cards().first().map(ToString::to_string))
        }
        Commands::Delete { id, yes } => {
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };
            match view.request_delete(id, confirm).await {
                Ok(true) => (true, None),
                Ok(false) => (true, Some("Cancelled.".to_string())),
                Err(_) => (false, None),
            }
        }
    };

    if let Some(notice) = view.notice() {
        if notice.is_error() {
            eprintln!("error: {}", notice.message());
        } else {
            println!("{}", notice.message());
        }
    }
    if let Some(output) = output {
        println!("{output}");
    }

    Ok(ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
