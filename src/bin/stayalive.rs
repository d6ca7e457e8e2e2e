// StayAlive CLI - Command-line interface for the keep-alive service
// Runs the service in the foreground with a small command console on stdin

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use stayalive::{config, platform_controller, ActionKey, ConfigStore, ServiceController};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

/// Keep the session from going idle by pressing an unused function key
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keep the session from going idle by pressing an unused function key",
    long_about = "Keep the session from going idle by pressing an unused function key.

StayAlive presses one of F13-F24 on a fixed interval. These keys have no
default binding on common desktops, so nothing visible happens, but the
operating system and remote-desktop sessions see regular input and never
consider the machine idle.

CONFIGURATION:
  Settings are stored at ~/.stay_alive_config.toml (override with --config
  or the STAY_ALIVE_CONFIG environment variable):
    interval   = 60      # seconds between presses
    key_code   = 126     # F13 = 124 ... F24 = 135
    auto_start = false   # launch at login

  --interval, --key and --auto-start update the stored settings.

CONSOLE COMMANDS (while running):
  status     Show the active configuration and loop
  reload     Re-read the config file (after editing it by hand)
  quit       Stop pressing keys and exit"
)]
struct Args {
    /// Config file location (overrides STAY_ALIVE_CONFIG and the default path)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds between key presses (must be at least 1)
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    interval: Option<i64>,

    /// Key to press, F13 through F24
    #[arg(long, value_name = "NAME")]
    key: Option<String>,

    /// Launch at login
    #[arg(long, value_name = "BOOL")]
    auto_start: Option<bool>,

    /// Print the stored configuration and exit
    #[arg(long)]
    show: bool,

    /// Print the supported keys and exit
    #[arg(long)]
    list_keys: bool,
}

impl Args {
    fn has_settings(&self) -> bool {
        self.interval.is_some() || self.key.is_some() || self.auto_start.is_some()
    }
}

fn list_keys() {
    println!("Key   Code");
    for key in ActionKey::all() {
        println!("{:<5} {:#04x} ({})", key.name(), key.code(), key.code());
    }
}

fn show_config(store: &ConfigStore) -> Result<()> {
    let cfg = store
        .try_load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    println!("Config file: {}", store.path().display());
    match cfg {
        Some(cfg) => {
            println!("  interval:   {} seconds", cfg.interval_secs);
            println!("  key:        {} ({:#04x})", cfg.action_key, cfg.action_key.code());
            println!("  auto_start: {}", cfg.auto_start);
        }
        None => println!("  (not created yet; defaults apply)"),
    }
    Ok(())
}

/// Merge command-line settings over the running configuration and apply them
fn apply_args(controller: &ServiceController, args: &Args) -> Result<()> {
    let current = controller.current_config();
    let interval = args
        .interval
        .unwrap_or_else(|| i64::try_from(current.interval_secs).unwrap_or(i64::MAX));
    let key = args.key.as_deref().unwrap_or(current.action_key.name());
    let auto_start = args.auto_start.unwrap_or(current.auto_start);

    let report = controller
        .apply_settings(interval, key, auto_start)
        .context("Invalid settings")?;
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning.describe());
    }
    Ok(())
}

fn print_status(controller: &ServiceController) {
    let cfg = controller.current_config();
    println!(
        "interval {}s, key {}, launch at login {}",
        cfg.interval_secs, cfg.action_key, cfg.auto_start
    );
    match controller.active_loop() {
        Some(status) => println!(
            "loop #{} {:?}: {} every {}s",
            status.generation,
            status.state,
            status.snapshot.key,
            status.snapshot.interval.as_secs()
        ),
        None => println!("no loop running"),
    }
}

/// Read console commands until `quit` or end of input
///
/// Returns true if the user asked to quit.
fn run_console(controller: &ServiceController, input: impl BufRead) -> Result<bool> {
    print!("> ");
    io::stdout().flush()?;

    for line in input.lines() {
        let line = line.context("Failed to read from stdin")?;
        match line.trim() {
            "" => {}
            "status" => print_status(controller),
            "reload" => match controller.reload() {
                Ok(report) => {
                    for warning in &report.warnings {
                        eprintln!("Warning: {}", warning.describe());
                    }
                    print_status(controller);
                }
                Err(e) => eprintln!("Reload failed: {}", e),
            },
            "quit" | "exit" => return Ok(true),
            other => println!("Unknown command '{}'. Commands: status, reload, quit", other),
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(false)
}

/// Run the console; the service is shut down on `quit` or a read error
///
/// Returns true if the service was shut down, false if input simply ended.
fn serve_console(controller: &ServiceController, input: impl BufRead) -> Result<bool> {
    match run_console(controller, input) {
        Ok(true) => {
            controller.shutdown();
            Ok(true)
        }
        Ok(false) => Ok(false),
        Err(e) => {
            controller.shutdown();
            Err(e)
        }
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.list_keys {
        list_keys();
        return Ok(());
    }

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let store = config::resolve_store(args.config.clone())
        .context("Failed to locate the configuration file")?;

    if args.show {
        return show_config(&store);
    }

    info!("Starting StayAlive v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", store.path().display());

    let controller = platform_controller(store)?;
    controller.start().context("Failed to start the keep-alive service")?;

    if args.has_settings() {
        if let Err(e) = apply_args(&controller, &args) {
            controller.shutdown();
            return Err(e);
        }
    }

    info!("StayAlive is running - type 'quit' to exit");
    if serve_console(&controller, io::stdin().lock())? {
        info!("CLI shutdown complete");
        return Ok(());
    }

    // No console (stdin closed or redirected); keep running until killed
    warn!("stdin closed; running until the process is terminated");
    loop {
        thread::park();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stayalive::{ActionError, AutoStartGateway, GatewayError, KeyPresser};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NoLoginItem;

    impl AutoStartGateway for NoLoginItem {
        fn is_enabled(&self) -> bool {
            false
        }
        fn enable(&self) -> Result<(), GatewayError> {
            Ok(())
        }
        fn disable(&self) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    struct SilentPresser;

    impl KeyPresser for SilentPresser {
        fn press(&self, _key: ActionKey) -> Result<(), ActionError> {
            Ok(())
        }
    }

    fn started_controller(dir: &TempDir) -> ServiceController {
        let controller = ServiceController::new(
            ConfigStore::at(dir.path().join("stay_alive.toml")),
            Box::new(NoLoginItem),
            Arc::new(SilentPresser),
        );
        controller.start().unwrap();
        controller
    }

    #[test]
    fn test_quit_shuts_down_service() {
        let dir = TempDir::new().unwrap();
        let controller = started_controller(&dir);

        assert!(serve_console(&controller, &b"status\nquit\n"[..]).unwrap());
        assert!(!controller.is_running());
        assert!(controller.active_loop().is_none());
    }

    #[test]
    fn test_end_of_input_leaves_service_running() {
        let dir = TempDir::new().unwrap();
        let controller = started_controller(&dir);

        assert!(!serve_console(&controller, &b"status\n"[..]).unwrap());
        assert!(controller.is_running());

        controller.shutdown();
    }

    #[test]
    fn test_read_error_shuts_down_service() {
        let dir = TempDir::new().unwrap();
        let controller = started_controller(&dir);

        // Not valid UTF-8, so reading the line fails
        let result = serve_console(&controller, &b"\xff\xfe\n"[..]);

        assert!(result.is_err());
        assert!(!controller.is_running());
        assert!(controller.active_loop().is_none());
    }
}
