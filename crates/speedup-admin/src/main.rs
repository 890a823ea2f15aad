//! speedup command-line entry point.
//!
//! Toggles the managed web-server performance blocks in a site's `.htaccess`
//! and the settings-only switches kept in the state store.
//!
//! # Usage
//!
//! ```text
//! speedup [--config PATH] toggle <TARGET>   gzip | expire | hotlinks | pingbacks | emojis | ...
//! speedup [--config PATH] action <NAME>     speedup_toggle_gzip, speedup_toggle_expire, ...
//! speedup [--config PATH] status [--json]
//! speedup [--config PATH] filter-content    page HTML on stdin, filtered HTML on stdout
//! speedup [--config PATH] init [--force]    write a default config file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                                   |
//! |-------------------|-----------------------------------------------|
//! | `SPEEDUP_CONFIG`  | Path of the TOML config file                  |
//! | `RUST_LOG`        | `tracing` filter, overrides `admin.log_level` |

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use speedup_admin::infrastructure::storage::config::{
    config_file_path, load_config, save_config, AppConfig,
};
use speedup_admin::infrastructure::ui_bridge::{
    dispatch, filter_content, settings_panel, AdminContext, Command, PanelDto,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Toggle web-server performance blocks in .htaccess.
#[derive(Debug, Parser)]
#[command(name = "speedup", version)]
struct Cli {
    /// TOML config file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "SPEEDUP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Flip one feature or setting by its short name.
    Toggle {
        /// gzip, expire, hotlinks, pingbacks, emojis or image-lazyload.
        target: String,
    },
    /// Run a host action by name, e.g. `speedup_toggle_gzip`.
    Action { name: String },
    /// Show the pending notice and the state of every feature.
    Status {
        /// Print the panel as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Apply the content settings (lazy-loaded images) to HTML read from stdin.
    FilterContent,
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Toggle { target } => {
            let command = Command::parse(&target)?;
            run(&open_context(cli.config)?, command)
        }
        CliCommand::Action { name } => {
            let command = Command::from_action(&name)
                .with_context(|| format!("unknown action: {name}"))?;
            run(&open_context(cli.config)?, command)
        }
        CliCommand::Status { json } => {
            let result = settings_panel(&open_context(cli.config)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(panel) = &result.data {
                print_panel(panel);
            }
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::FilterContent => {
            let ctx = open_context(cli.config)?;
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read content from stdin")?;
            std::io::stdout()
                .write_all(filter_content(&ctx, &content).as_bytes())
                .context("failed to write filtered content")?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Init { force } => {
            init_tracing(&AppConfig::default().admin.log_level);
            init(cli.config, force)
        }
    }
}

/// Loads the config, starts logging and wires the admin context.
fn open_context(path: Option<PathBuf>) -> anyhow::Result<AdminContext> {
    let config = load_config(path.as_deref()).context("failed to load config")?;
    init_tracing(&config.admin.log_level);

    debug!(htaccess = %config.site.htaccess_path().display(), "config loaded");
    AdminContext::from_config(config).context("failed to set up speedup")
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Writes the default config to `path` (or the platform location).
fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<ExitCode> {
    let path = match path {
        Some(p) => p,
        None => config_file_path().context("no config directory on this platform")?,
    };
    if path.exists() && !force {
        eprintln!("error: {} already exists (use --force to overwrite)", path.display());
        return Ok(ExitCode::FAILURE);
    }

    save_config(&AppConfig::default(), &path).context("failed to write config")?;
    info!(path = %path.display(), "default config written");
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Dispatches `command`, then shows the panel the way a redirect would.
fn run(ctx: &AdminContext, command: Command) -> anyhow::Result<ExitCode> {
    let result = dispatch(ctx, command);

    if let Some(data) = &result.data {
        let state = if data.state.is_enabled() { "on" } else { "off" };
        println!("{}: {state}", data.label);
    }
    if let Some(error) = &result.error {
        eprintln!("error: {error}");
    }

    if let Some(panel) = settings_panel(ctx).data {
        if let Some(notice) = panel.notice {
            println!("{}", notice.message);
        }
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_panel(panel: &PanelDto) {
    if let Some(notice) = &panel.notice {
        let tag = if notice.error { "error" } else { "notice" };
        println!("[{tag}] {}\n", notice.message);
    }
    for row in &panel.rows {
        let state = if row.state.is_enabled() { "on" } else { "off" };
        println!("{:<16} {:<28} {state}", row.target, row.label);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_parses_target() {
        let cli = Cli::parse_from(["speedup", "toggle", "gzip"]);
        assert!(matches!(cli.command, CliCommand::Toggle { ref target } if target == "gzip"));
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::parse_from([
            "speedup",
            "status",
            "--json",
            "--config",
            "/etc/speedup.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/speedup.toml")));
        assert!(matches!(cli.command, CliCommand::Status { json: true }));
    }

    #[test]
    fn test_action_requires_name() {
        assert!(Cli::try_parse_from(["speedup", "action"]).is_err());
    }

    #[test]
    fn test_filter_content_and_init_parse() {
        let cli = Cli::parse_from(["speedup", "filter-content"]);
        assert!(matches!(cli.command, CliCommand::FilterContent));

        let cli = Cli::parse_from(["speedup", "init", "--force"]);
        assert!(matches!(cli.command, CliCommand::Init { force: true }));
    }

    #[test]
    fn test_init_writes_loadable_defaults_and_refuses_to_overwrite() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speedup").join("config.toml");

        // Act
        let first = init(Some(path.clone()), false).unwrap();
        let second = init(Some(path.clone()), false).unwrap();

        // Assert
        assert_eq!(first, ExitCode::SUCCESS);
        assert_eq!(second, ExitCode::FAILURE);
        assert_eq!(load_config(Some(&path)).unwrap(), AppConfig::default());
    }
}
