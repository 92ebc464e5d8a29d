//! SQLite DSN helpers: memory detection, path resolution and typed
//! connect options with the pragmas the server relies on.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use crate::{DbError, Result};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub const MEMORY_DSN: &str = "sqlite::memory:";

pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Split `sqlite://path?query` into the file path and the optional query.
fn split_path(dsn: &str) -> Result<(&str, Option<&str>)> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .ok_or_else(|| DbError::InvalidSqliteDsn(dsn.to_string()))?;
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(DbError::InvalidSqliteDsn(format!("empty path in '{dsn}'")));
    }
    Ok((path, query))
}

/// Rewrite a file DSN so relative paths point under `base_dir`.
/// In-memory DSNs are normalized to [`MEMORY_DSN`].
pub fn absolutize_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok(MEMORY_DSN.to_string());
    }
    let (path, query) = split_path(dsn)?;
    let mut p = PathBuf::from(path);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

pub(crate) fn ensure_parent_dir(dsn: &str) -> Result<()> {
    let (path, _) = split_path(dsn)?;
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// WAL for files, DELETE for memory; `synchronous = NORMAL`; busy timeout
/// only for files.
pub(crate) fn connect_options(
    dsn: &str,
    busy_timeout: Option<Duration>,
) -> Result<SqliteConnectOptions> {
    let in_memory = is_memory_dsn(dsn);
    let mut opts = SqliteConnectOptions::from_str(dsn)?
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    if in_memory {
        opts = opts.journal_mode(SqliteJournalMode::Delete);
    } else {
        opts = opts
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(
                busy_timeout.unwrap_or(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS)),
            );
    }
    Ok(opts)
}
