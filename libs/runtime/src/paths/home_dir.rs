use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the platform home directory")]
    NoPlatformHome,
    #[error("home_dir '{0}' resolved to a relative path")]
    NotAbsolute(String),
    #[error("failed to create home_dir '{path}': {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Platform base directory under which the default subdirectory is placed.
/// Windows: `%APPDATA%`, elsewhere: `$HOME`.
fn platform_base() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or(HomeDirError::NoPlatformHome)
}

/// Expand a leading `~` or `~/` using the user's home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return dirs::home_dir().ok_or(HomeDirError::NoPlatformHome);
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        let home = dirs::home_dir().ok_or(HomeDirError::NoPlatformHome)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the server home directory.
///
/// - `None` → `<platform base>/<default_subdir>`
/// - `Some("~/x")` → `$HOME/x`
/// - relative paths are resolved against the current working directory
///
/// When `create` is set, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let mut path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    if path.is_relative() {
        let cwd = std::env::current_dir().map_err(|source| HomeDirError::Create {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        path = cwd.join(path);
    }

    if !path.is_absolute() {
        return Err(HomeDirError::NotAbsolute(path.to_string_lossy().to_string()));
    }

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_string_lossy().to_string(),
        source,
    })
}
