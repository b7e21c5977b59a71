use crate::errors::RetroInstaCliError;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session";

/**
 * Gets the path to the ~/.retroinsta directory, creating it if needed
 *
 * @returns {PathBuf} path to ~/.retroinsta if successful
 */
pub fn get_storage_path() -> Result<PathBuf, RetroInstaCliError> {
    let dir = match std::env::var("HOME") {
        Ok(home) => Path::new(&home).join(".retroinsta"),
        Err(_) => {
            return Err(RetroInstaCliError::FsError(String::from(
                "Couldn't find home directory",
            )))
        }
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| RetroInstaCliError::FsError(e.to_string()))?;
    }
    Ok(dir)
}

fn session_path() -> Result<PathBuf, RetroInstaCliError> {
    Ok(get_storage_path()?.join(SESSION_FILE))
}

/// The persisted session is a single user-id string; absence means logged out
pub fn read_session_user_id() -> Result<Option<String>, RetroInstaCliError> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        std::fs::read_to_string(&path).map_err(|e| RetroInstaCliError::FsError(e.to_string()))?;
    let id = contents.trim().to_string();
    if id.is_empty() {
        return Ok(None);
    }
    Ok(Some(id))
}

pub fn write_session_user_id(user_id: &str) -> Result<(), RetroInstaCliError> {
    let path = session_path()?;
    std::fs::write(&path, user_id).map_err(|e| RetroInstaCliError::FsError(e.to_string()))
}

pub fn clear_session() -> Result<(), RetroInstaCliError> {
    let path = session_path()?;
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| RetroInstaCliError::FsError(e.to_string()))?;
    }
    Ok(())
}
