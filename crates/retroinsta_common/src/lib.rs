pub mod errors;
pub mod http;
pub mod models;

pub use models::{Post, User};

/// Hard cap on uploaded image size, enforced again by the server's form limits
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
