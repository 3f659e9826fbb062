use std::env;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;

/// Directory holding `exe`, with symlinks and relative segments resolved.
pub fn resolve(exe: &Path) -> Result<PathBuf, LaunchError> {
    let exe = exe.canonicalize()?;
    let dir = exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| LaunchError::BaseDir(std::io::ErrorKind::NotFound.into()))?;
    Ok(dir)
}

/// Switch into the launcher's own directory. Falls back to the caller's
/// directory when the executable path can't be resolved.
pub fn enter() -> PathBuf {
    match env::current_exe()
        .map_err(LaunchError::from)
        .and_then(|exe| resolve(&exe))
    {
        Ok(dir) => match env::set_current_dir(&dir) {
            Ok(()) => dir,
            Err(err) => {
                tracing::warn!("cannot enter {}: {err}", dir.display());
                caller_dir()
            }
        },
        Err(err) => {
            tracing::warn!("{err}; staying in caller directory");
            caller_dir()
        }
    }
}

fn caller_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
