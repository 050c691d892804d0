//! Log directory discovery shared by the log commands.
//!
//! Resolves the same directory the server writes to: `LOG_DIR` when set,
//! otherwise the platform cache directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Which of the two server logs to look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogKind {
    /// Server events
    Backend,
    /// Errors reported by browsers via `/api/log-error`
    Frontend,
}

impl LogKind {
    /// File name prefix used by the rolling appender.
    pub fn prefix(self) -> &'static str {
        match self {
            LogKind::Backend => "backend",
            LogKind::Frontend => "frontend",
        }
    }
}

/// Get the log directory the server writes to
///
/// - `LOG_DIR` if set
/// - macOS: `~/Library/Caches/game-server/logs`
/// - Linux: `~/.cache/game-server/logs` (or `$XDG_CACHE_HOME/game-server/logs`)
/// - Windows: `%LOCALAPPDATA%\game-server\cache\logs`
pub fn log_dir() -> PathBuf {
    std::env::var_os("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(game_server::config::default_log_dir)
}

/// List rotated files of one log, newest first.
pub fn list_logs(log_dir: &Path, kind: LogKind) -> Result<Vec<PathBuf>> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let mut logs: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {}", log_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with(kind.prefix())
            && name.ends_with(".log")
        {
            let modified = entry.metadata()?.modified()?;
            logs.push((path, modified));
        }
    }

    // Newest first; file names carry the date so they break ties.
    logs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    Ok(logs.into_iter().map(|(path, _)| path).collect())
}

/// Find the file currently being written for `kind`
pub fn find_latest_log(log_dir: &Path, kind: LogKind) -> Result<PathBuf> {
    list_logs(log_dir, kind)?
        .into_iter()
        .next()
        .with_context(|| {
            format!(
                "No {} log found in {}",
                kind.prefix(),
                log_dir.display()
            )
        })
}
