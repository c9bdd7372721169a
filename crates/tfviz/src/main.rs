mod config;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Browse a Terraform state snapshot grouped into related resources.
#[derive(Debug, Parser)]
#[command(name = "tfviz", version, about)]
struct Cli {
    /// Path to the state file (terraform.tfstate).
    state_file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let snapshot = match tfviz_core::load_file(&cli.state_file) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!("load failed: {err}");
            eprintln!("tfviz: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = state::App::new(snapshot, config::load_config());

    let result = if io::stdout().is_terminal() {
        run(&mut app)
    } else {
        print_outline(&app)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("tfviz: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &mut state::App) -> Result<()> {
    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let result = size_viewport(&terminal, app).and_then(|()| run_app(&mut terminal, app));
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn size_viewport(
    terminal: &Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App,
) -> Result<()> {
    let size = terminal.size()?;
    app.handle(state::Input::Resize {
        width: size.width,
        height: size.height,
    });
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    app.handle_key(key);
                }
            }
            Event::Resize(width, height) => {
                app.handle(state::Input::Resize { width, height });
            }
            _ => {}
        }

        if app.should_quit() {
            break;
        }
    }

    info!("session ended");
    Ok(())
}

/// Non-interactive output for when stdout is piped.
fn print_outline(app: &state::App) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for line in app.outline(usize::MAX) {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = std::env::var("TFVIZ_LOG_FILE")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                return;
            }
            Err(err) => {
                eprintln!("tfviz: cannot open log file {path}: {err}");
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::sink)
        .try_init();
}
