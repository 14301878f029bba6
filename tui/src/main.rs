//! InExAI TUI Entry Point
//!
//! Launches the terminal chat client.
//!
//! Usage:
//!   inexai [OPTIONS]
//!
//! Options:
//!   --endpoint <URL>        Answering service URL (env: INEXAI_API_URL)
//!   --mentor <MODE>         generativo | reflexivo
//!   --config <PATH>         Config file (default ~/.config/inexai/config.toml)
//!   --export-html <PATH>    Write the conversation as HTML on exit
//!   --log-file <PATH>       Log file (default in the cache dir)

use std::fs::{File, OpenOptions};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inexai_conductor::{load_config_file, ChatConfig, MentorMode};
use inexai_tui::App;

#[derive(Debug, Parser)]
#[command(name = "inexai", version, about = "Terminal chat client for InExAI")]
struct Args {
    /// Answering service base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Mentor mode (generativo or reflexivo)
    #[arg(long)]
    mentor: Option<MentorMode>,

    /// Config file path
    #[arg(long, env = "INEXAI_CONFIG")]
    config: Option<PathBuf>,

    /// Write the conversation as an HTML document when the client exits
    #[arg(long)]
    export_html: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Defaults, then the config file, then the environment, then flags
    fn resolve_config(&self) -> anyhow::Result<ChatConfig> {
        let mut config = match &self.config {
            Some(path) => ChatConfig::default()
                .with_file(&load_config_file(path)?)
                .with_env(),
            None => ChatConfig::load()?,
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(mode) = self.mentor {
            config.mentor_mode = mode;
        }
        Ok(config)
    }
}

/// Logs go to a file; the terminal belongs to the UI
fn init_logging(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("inexai").join("inexai.log")))
        .context("no log file path available")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    init_logging(args.log_file.clone())?;

    let config = args.resolve_config()?;
    tracing::info!(endpoint = %config.endpoint, mode = %config.mentor_mode, "Starting InExAI");

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: inexai requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result?;

    if let Some(path) = args.export_html {
        tokio::fs::write(&path, app.conductor().export_html())
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Conversa exportada para {}", path.display());
    }

    println!("\n\x1b[36mInExAI:\x1b[0m Até logo!\n");
    Ok(())
}
