// BotConsole - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation (CLI flags override it)
// 3. Logging initialisation (debug mode support)
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use botconsole::app;

pub use botconsole::core;
pub use botconsole::platform;
pub use botconsole::ui;
pub use botconsole::util;

use clap::Parser;
use std::path::PathBuf;

/// BotConsole - operator console for the tweet automation backend.
///
/// Shows the backend's live log stream in a floating terminal, the current
/// rate-limit status, and buttons for the tweet actions.
#[derive(Parser, Debug)]
#[command(name = "BotConsole", version, about)]
struct Cli {
    /// Backend base URL (overrides [server] base_url).
    #[arg(short = 's', long = "server")]
    server: Option<String>,

    /// Terminal buffer capacity in lines (overrides [stream] buffer_lines).
    #[arg(short = 'n', long = "buffer-lines")]
    buffer_lines: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

/// Apply CLI overrides on top of the validated config. Invalid overrides are
/// reported as warnings and ignored, like invalid config values.
fn apply_cli_overrides(cli: &Cli, config: &mut platform::config::AppConfig, warnings: &mut Vec<String>) {
    if let Some(ref url) = cli.server {
        match platform::config::validate_server_url(url) {
            Ok(u) => config.server_url = u,
            Err(reason) => warnings.push(format!("--server: {reason}. Ignored.")),
        }
    }
    if let Some(lines) = cli.buffer_lines {
        let range = util::constants::MIN_BUFFER_CAPACITY..=util::constants::ABSOLUTE_MAX_BUFFER_CAPACITY;
        if range.contains(&lines) {
            config.buffer_capacity = lines;
        } else {
            warnings.push(format!(
                "--buffer-lines {lines} is out of range ({}-{}). Ignored.",
                range.start(),
                range.end()
            ));
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging so its [logging] section can take effect;
    // warnings are replayed once the subscriber exists.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (mut config, mut warnings) = platform::config::load_config(&config_path);
    apply_cli_overrides(&cli, &mut config, &mut warnings);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        server = %config.server_url,
        buffer_lines = config.buffer_capacity,
        "BotConsole starting"
    );
    for w in &warnings {
        tracing::warn!(warning = %w, "Configuration warning");
    }

    // Create application state
    let mut state = app::state::AppState::new(&config, cli.debug);
    state.warnings = warnings;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    let dark_mode = config.dark_mode;
    let font_size = config.font_size;
    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            gui::apply_theme(&cc.egui_ctx, dark_mode);
            gui::apply_font_size(&cc.egui_ctx, font_size);
            Ok(Box::new(gui::BotConsoleApp::new(state)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch BotConsole GUI: {e}");
        std::process::exit(1);
    }
}
