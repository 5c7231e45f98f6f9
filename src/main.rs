mod app;
mod config;
mod content;
mod input;
mod lyrics;
mod player;
mod queue;
mod sync;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use content::{ContentClient, ContentType};
use lyrics::{LyricsDocument, LyricsQuery, LyricsResolver, ProviderChain};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "dwc", version, about = "Terminal player with synced lyrics for the DWC fan site")]
struct Cli {
    /// Override config file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Resolve lyrics through the provider chain and print them.
    Lyrics {
        title: String,
        artist: String,
        /// Local or remote LRC file to fall back on.
        #[arg(long)]
        lrc: Option<String>,
    },
    /// Parse an LRC file and print it normalised.
    Parse { file: PathBuf },
    /// Print the track catalog.
    Tracks,
    /// Read or write site content through the content proxy.
    Content {
        #[command(subcommand)]
        cmd: ContentCommand,
    },
    /// Record a search query with the content proxy.
    SearchLog { query: String },
}

#[derive(Debug, Subcommand)]
enum ContentCommand {
    /// Print one content type (profile, tracks, playlists, gallery, videos, shows, links).
    Get { content_type: ContentType },
    /// Replace one content type with the JSON in a file.
    Put { content_type: ContentType, file: PathBuf },
    /// Print every content type at once.
    BulkGet,
    /// Replace all content with the JSON object in a file.
    BulkPut { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let command = cli.command.unwrap_or(Command::Tui);

    match command {
        Command::Tui => {
            init_file_logging(&cfg.paths.data_dir, level)?;
            let mut app = app::App::new(cfg.clone(), cfg_path)?;
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            app.run(terminal.terminal_mut()).await?;
        }
        other => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            run_headless(other, &cfg).await?;
        }
    }

    Ok(())
}

/// The TUI owns the terminal, so logs go to `<data_dir>/dwc.log`
fn init_file_logging(data_dir: &Path, level: Level) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("create dir {}", data_dir.display()))?;
    let path = data_dir.join("dwc.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

async fn run_headless(command: Command, cfg: &config::Config) -> anyhow::Result<()> {
    let content = ContentClient::from_config(&cfg.content)?;

    match command {
        Command::Tui => anyhow::bail!("the TUI is not a headless command"),
        Command::Lyrics { title, artist, lrc } => {
            let chain = ProviderChain::from_config(&cfg.lyrics, &cfg.content.data_dir)?;
            let mut resolver = LyricsResolver::new(chain);
            let query = LyricsQuery::new(title, artist).with_lrc_asset(lrc);
            match resolver.get_or_resolve(&query).await {
                Some(resolved) => {
                    eprintln!("source: {}", resolved.source);
                    print_document(&resolved.document);
                }
                None => println!("No lyrics available"),
            }
        }
        Command::Parse { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;
            print_document(&LyricsDocument::parse(&raw));
        }
        Command::Tracks => {
            let tracks = content.load_tracks().await?;
            for (i, t) in tracks.iter().enumerate() {
                let duration = t.duration.as_deref().unwrap_or("-");
                let lrc = if t.lrc_file.is_some() { "  [lrc]" } else { "" };
                println!("{:02}. {}  ({}){}", i + 1, t.display(), duration, lrc);
            }
        }
        Command::Content { cmd } => match cmd {
            ContentCommand::Get { content_type } => {
                let value = content.load(content_type).await?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            ContentCommand::Put { content_type, file } => {
                let value = read_json(&file).await?;
                content.save(content_type, &value).await?;
                println!("Saved {content_type}.");
            }
            ContentCommand::BulkGet => {
                let value = content.load_bulk().await?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            ContentCommand::BulkPut { file } => {
                let value = read_json(&file).await?;
                content.save_bulk(&value).await?;
                println!("Saved all content.");
            }
        },
        Command::SearchLog { query } => content.log_search(&query).await,
    }

    Ok(())
}

fn print_document(document: &LyricsDocument) {
    if document.is_synced() {
        print!("{}", document.to_lrc());
    } else if document.plain_text.is_empty() {
        println!("No lyrics available");
    } else {
        println!("{}", document.plain_text);
    }
}

async fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}
