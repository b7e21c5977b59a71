#[derive(Debug)]
pub enum RetroInstaCliError {
    NotLoggedIn,
    ServerError(String),
    FsError(String),
    InvalidId(String),
    FileError(String),
}

impl std::fmt::Display for RetroInstaCliError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RetroInstaCliError::NotLoggedIn => {
                write!(f, "Not logged in. Run `retroinsta login` first")
            }
            RetroInstaCliError::ServerError(msg) => write!(f, "Server error: {}", msg),
            RetroInstaCliError::FsError(msg) => write!(f, "Filesystem error: {}", msg),
            RetroInstaCliError::InvalidId(msg) => write!(f, "Invalid id \"{}\"", msg),
            RetroInstaCliError::FileError(msg) => write!(f, "File error: {}", msg),
        }
    }
}

impl std::error::Error for RetroInstaCliError {}
