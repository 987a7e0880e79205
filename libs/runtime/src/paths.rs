use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("could not determine the user's home directory")]
    NoHome,
    #[error("could not determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the server home directory to an absolute path.
///
/// `configured` wins when present: a leading `~` is expanded and a relative
/// path is anchored at the current directory. Otherwise the platform base
/// directory is used (`%APPDATA%` on Windows, `$HOME` elsewhere) joined with
/// `default_subdir`. With `create` set the directory is created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        Some(raw) => absolutize(expand_tilde(&raw)?)?,
        None => platform_base()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.clone(),
            source,
        })?;
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return dirs::home_dir().ok_or(HomeDirError::NoHome);
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(dirs::home_dir().ok_or(HomeDirError::NoHome)?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf, HomeDirError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(HomeDirError::CurrentDir)?;
    Ok(cwd.join(path))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Result<PathBuf, HomeDirError> {
    dirs::data_dir().ok_or(HomeDirError::NoHome)
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::NoHome)
}

/// Join `relative` onto `base` unless it is already absolute.
pub fn resolve_under(base: &Path, relative: &str) -> PathBuf {
    let p = Path::new(relative);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
