//! Command-line interface for formula
//!
//! Usage:
//!   formula edit                  - Open the interactive formula editor
//!   formula eval `<document>`       - Evaluate a saved document (JSON segments)
//!   formula suggest [`<term>`]      - List catalog entries matching a category term
//!
//! Global options `--config <file>` and `--catalog <url-or-path>` layer over
//! the built-in defaults.
mod app;
mod logging;
mod terminal;
mod ui;


use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::ConfigError;
use crossterm::event::{self, Event};
use formula::catalog::{spawn_fetch, Catalog, CatalogError};
use formula::config::{FormulaConfig, Loader};
use formula::document::{Document, Segment};
use formula::expression::{self, ExpressionError};
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::warn;

use app::App;
use terminal::TerminalGuard;

#[derive(Parser)]
#[command(name = "formula")]
#[command(version, about = "Compose and evaluate formulas with catalog tags")]
struct Cli {
    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog URL or JSON file, overriding configuration
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive formula editor
    Edit,
    /// Evaluate a document saved as a JSON array of segments
    Eval {
        /// Path to the document
        document: PathBuf,
    },
    /// List catalog entries whose category contains TERM
    Suggest {
        /// Category search term; lists everything when omitted
        term: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a list of segments: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Error in the formula: {0}")]
    Expression(#[from] ExpressionError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<FormulaConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader = loader.with_env();
    if let Some(catalog) = &cli.catalog {
        loader = loader.set_override("catalog.source", catalog.as_str())?;
    }
    loader.build()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let fallback = match cli.command {
        Command::Edit => logging::Fallback::Discard,
        _ => logging::Fallback::Stderr,
    };
    logging::init(&config.logging, fallback)?;

    let runtime = Runtime::new()?;
    match cli.command {
        Command::Edit => handle_edit_command(&runtime, config),
        Command::Eval { document } => handle_eval_command(&runtime, &config, &document),
        Command::Suggest { term } => handle_suggest_command(&runtime, &config, term.as_deref()),
    }
}

fn handle_edit_command(runtime: &Runtime, config: FormulaConfig) -> Result<(), CliError> {
    let pending = spawn_fetch(runtime.handle(), config.catalog.source());
    let mut app = App::new(config.editor.into(), Some(pending));

    let mut guard = TerminalGuard::enter()?;
    run_app(guard.terminal(), &mut app)?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut ratatui::Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut dirty = true;
    loop {
        if app.tick() {
            dirty = true;
        }
        if dirty {
            let size = terminal.size()?;
            app.viewport = ratatui::layout::Rect::new(0, 0, size.width, size.height);
            terminal.draw(|frame| ui::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(100))? {
            dirty = match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(_, _) => true,
                _ => false,
            };
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Fetch the catalog, degrading to an empty one when it is unavailable
fn fetch_catalog(runtime: &Runtime, config: &FormulaConfig) -> Catalog {
    let source = config.catalog.source();
    runtime.block_on(source.fetch()).unwrap_or_else(|err| {
        warn!(%source, error = %err, "catalog unavailable, tags evaluate to 0");
        Catalog::empty()
    })
}

fn read_document(path: &Path) -> Result<Document, CliError> {
    let body = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let segments: Vec<Segment> = serde_json::from_str(&body).map_err(|source| CliError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::from_segments(segments))
}

fn handle_eval_command(runtime: &Runtime, config: &FormulaConfig, path: &Path) -> Result<(), CliError> {
    let document = read_document(path)?;
    let catalog = fetch_catalog(runtime, config);
    let evaluation = expression::evaluate_document(&document, &catalog)?;
    println!("Expression: {}", evaluation.expression);
    println!("Calculation result: {}", evaluation.value);
    Ok(())
}

fn handle_suggest_command(runtime: &Runtime, config: &FormulaConfig, term: Option<&str>) -> Result<(), CliError> {
    let catalog = runtime.block_on(config.catalog.source().fetch())?;
    for suggestion in catalog.filter(term.unwrap_or("")) {
        println!(
            "{}\t{}\t{}\t{}",
            suggestion.id, suggestion.category, suggestion.name, suggestion.value
        );
    }
    Ok(())
}
