use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RetroInstaError {
    InvalidObjectId(String),
    UserNotFound(String),
    PostNotFound(String),
    MissingIdToken,
    InvalidToken(String),
    MissingClaim(String),
    KeySetError(String),
    SelfFollow,
    UserExists(String),
    MongoError(String),
    StorageError(String),
    UploadTooLarge,
    InternalError,
}

impl std::fmt::Display for RetroInstaError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RetroInstaError::InvalidObjectId(msg) => write!(f, "Invalid id: {}", msg),
            RetroInstaError::UserNotFound(msg) => write!(f, "User {} not found", msg),
            RetroInstaError::PostNotFound(msg) => write!(f, "Post {} not found", msg),
            RetroInstaError::MissingIdToken => write!(f, "Missing idToken in request body"),
            RetroInstaError::InvalidToken(msg) => write!(f, "Invalid Google token: {}", msg),
            RetroInstaError::MissingClaim(msg) => {
                write!(f, "Invalid Google token: missing claim `{}`", msg)
            }
            RetroInstaError::KeySetError(msg) => {
                write!(f, "Could not retrieve Google signing keys: {}", msg)
            }
            RetroInstaError::SelfFollow => write!(f, "A user cannot follow themselves"),
            RetroInstaError::UserExists(msg) => {
                write!(f, "User already exists for Google account {}", msg)
            }
            RetroInstaError::MongoError(msg) => write!(f, "Mongo error: {}", msg),
            RetroInstaError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            RetroInstaError::UploadTooLarge => write!(f, "Uploaded file exceeds 10 MiB"),
            RetroInstaError::InternalError => write!(f, "Unknown internal server error"),
        }
    }
}

impl std::error::Error for RetroInstaError {}
