//! # muse-agent
//!
//! The `muse` binary — an ambient assistant that watches a workspace,
//! scores file changes, and speaks up when the moment is right.

#![deny(unsafe_code)]

mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use session::Session;

/// Ambient coding companion.
#[derive(Parser, Debug)]
#[command(name = "muse", about = "Watches a workspace and offers timely observations")]
struct Cli {
    /// Workspace directory to watch.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Settings file (defaults to `muse.toml` in the workspace, then the
    /// user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// flag-derived level.
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();
    let _ = subscriber.try_init();
}

/// Pick the settings file: explicit flag, workspace-local `muse.toml`,
/// then the user config directory.
fn settings_path(cli: &Cli, workspace: &std::path::Path) -> PathBuf {
    if let Some(config) = &cli.config {
        return config.clone();
    }
    let local = workspace.join("muse.toml");
    if local.exists() {
        return local;
    }
    muse_settings::default_settings_path()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let workspace = cli
        .dir
        .canonicalize()
        .with_context(|| format!("workspace directory {}", cli.dir.display()))?;

    let path = settings_path(&cli, &workspace);
    let settings = muse_settings::load_settings_from_path(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;

    let session = Session::new(workspace, &settings)?;
    session.run().await
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_flag_wins() {
        let cli = Cli {
            dir: PathBuf::from("."),
            config: Some(PathBuf::from("/etc/muse.toml")),
            verbose: false,
            quiet: false,
        };
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            settings_path(&cli, dir.path()),
            PathBuf::from("/etc/muse.toml")
        );
    }

    #[test]
    fn workspace_local_settings_preferred() {
        let cli = Cli {
            dir: PathBuf::from("."),
            config: None,
            verbose: false,
            quiet: false,
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("muse.toml"), "").unwrap();
        assert_eq!(settings_path(&cli, dir.path()), dir.path().join("muse.toml"));
    }

    #[test]
    fn falls_back_to_user_config_dir() {
        let cli = Cli {
            dir: PathBuf::from("."),
            config: None,
            verbose: false,
            quiet: false,
        };
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            settings_path(&cli, dir.path()),
            muse_settings::default_settings_path()
        );
    }
}
