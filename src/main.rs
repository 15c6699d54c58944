//! Clipboard Japanese Translator - Main Entry Point
//!
//! Supports two modes:
//! - CLI mode: translate from a terminal prompt (run with --cli flag)
//! - UI mode: window, tray and global hotkey (default)

use anyhow::Result;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipboard_ja_translator::business::TARGET_LANGUAGE;
use clipboard_ja_translator::{App, AppConfig};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let cli_mode = args.iter().any(|a| a == "--cli" || a == "-c");

    init_logging(cli_mode);

    // Background work runs here; the main thread belongs to the window
    let runtime = tokio::runtime::Runtime::new()?;

    if cli_mode {
        runtime.block_on(run_cli_mode(runtime.handle().clone()))
    } else {
        run_ui_mode(runtime.handle().clone())
    }
}

/// Run in full UI mode with window, tray and hotkey
fn run_ui_mode(runtime: tokio::runtime::Handle) -> Result<()> {
    info!(
        "Starting Clipboard Japanese Translator v{} (UI Mode)",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load_or_default()?;
    info!("Configuration loaded");

    let app = Arc::new(App::build(&config, runtime)?);
    app.startup();

    let result = clipboard_ja_translator::ui::run_app(app.clone());

    app.shutdown();
    info!("Application exited");
    result
}

/// Run in CLI mode for testing
async fn run_cli_mode(runtime: tokio::runtime::Handle) -> Result<()> {
    info!(
        "Starting Clipboard Japanese Translator v{} (CLI Mode)",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load_or_default()?;
    let app = App::build(&config, runtime)?;

    println!("Clipboard Japanese Translator v{}", env!("CARGO_PKG_VERSION"));
    println!("  [t] translate clipboard to '{}'", TARGET_LANGUAGE);
    println!("  [p] print clipboard");
    println!("  [q] quit");
    println!();

    loop {
        print!(">>> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim().to_lowercase();

        match cmd.as_str() {
            "t" | "translate" => match app.controller().translate_clipboard(true).await {
                Some(translated) => println!("{}", translated),
                None => println!("(nothing translated, see log)"),
            },
            "p" | "print" => match app.controller().clipboard().get_text() {
                Ok(text) if text.is_empty() => println!("(clipboard is empty)"),
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!("Failed to read clipboard: {}", e);
                }
            },
            "q" | "quit" | "exit" => {
                info!("User requested exit");
                break;
            }
            "" => {}
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Use t/p/q");
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug {
        "clipboard_ja_translator=debug"
    } else {
        "clipboard_ja_translator=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
