//! Pingate TUI entry point

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::panic;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pingate_core::{CredentialStore, GateConfig, Pin, PIN_LENGTH};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeroize::Zeroizing;

use pingate_tui::app::App;
use pingate_tui::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Restore the terminal before the default hook prints
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange);
        original_hook(panic_info);
    }));

    init_logging()?;

    let cli = Cli::parse();
    let credentials = match &cli.pin_file {
        Some(path) => CredentialStore::at(path),
        None => CredentialStore::at(CredentialStore::default_path()),
    };

    let result = match cli.command() {
        Command::Run => run_app(credentials).await,
        Command::SetPin => set_pin(&credentials),
    };

    if let Err(e) = &result {
        tracing::error!("Application error: {:#}", e);
    }
    result
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let dir = GateConfig::config_dir().context("No config directory available")?;
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("pingate.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pingate_tui=info,pingate_core=info")),
        )
        .init();
    Ok(())
}

/// Main application runner
async fn run_app(credentials: CredentialStore) -> Result<()> {
    if !credentials.is_provisioned() {
        bail!(
            "No PIN set at {}. Run `pingate-tui set-pin` first.",
            credentials.path().display()
        );
    }

    let config = GateConfig::load();
    config.validate().context("Invalid configuration")?;
    let mut app = App::new(config, credentials)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;

    result
}

fn set_pin(credentials: &CredentialStore) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let first = prompt_pin(&mut input, &format!("New {}-digit PIN: ", PIN_LENGTH))?;
    let second = prompt_pin(&mut input, "Repeat PIN: ")?;
    if first != second {
        bail!("PINs do not match");
    }

    credentials.provision(&first)?;
    tracing::info!("PIN provisioned at {}", credentials.path().display());
    println!("PIN saved to {}", credentials.path().display());
    Ok(())
}

fn prompt_pin(input: &mut impl BufRead, label: &str) -> Result<Pin> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line).context("Failed to read PIN")?;

    let pin = Pin::parse(line.trim()).context("PIN must contain digits only")?;
    if pin.len() != PIN_LENGTH {
        bail!("PIN must be exactly {} digits", PIN_LENGTH);
    }
    Ok(pin)
}
