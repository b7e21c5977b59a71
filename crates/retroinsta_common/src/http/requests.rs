use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoogleLoginRequest {
    // optional so an absent field maps to 400 instead of a deserialization failure
    #[serde(rename = "idToken")]
    pub id_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LikeToggleRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FollowToggleRequest {
    #[serde(rename = "targetUserID")]
    pub target_user_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateBioRequest {
    #[serde(rename = "newBio")]
    pub new_bio: String,
}
