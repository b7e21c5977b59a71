use crate::models::User;
use serde::{Deserialize, Serialize};

/// JSON error body shared by every non-2xx response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoogleConfigResponse {
    #[serde(rename = "clientId")]
    pub client_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LikeToggleResponse {
    pub message: String,
    pub likes: i64,
}

/**
 * Returned by the follow toggle so clients can apply the updated follower
 * document directly instead of reacting to an untyped "something changed"
 * broadcast.
 */
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FollowToggleResponse {
    pub message: String,
    pub following: bool,
    pub user: User,
}
