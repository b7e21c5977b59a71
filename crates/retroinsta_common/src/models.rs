use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

// Field names follow the wire format consumed by the client (camelCase)

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "googleId")]
    pub google_id: String,
    pub username: String,
    #[serde(rename = "profilePicPath", skip_serializing_if = "Option::is_none")]
    pub profile_pic_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "followingUserIDs")]
    pub following_user_ids: Vec<ObjectId>, // directed follow edges, stored on the follower
    #[serde(rename = "followerCount")]
    pub follower_count: i64, // maintained in the same transaction as the edge flip
    #[serde(rename = "likedPostIDs")]
    pub liked_post_ids: Vec<ObjectId>,
    #[serde(rename = "authoredPostIDs")]
    pub authored_post_ids: Vec<ObjectId>, // convenience index; posts are the source of truth
}

impl User {
    /**
     * Builds the user document inserted on first successful Google login.
     * All social graph fields start empty.
     */
    pub fn new(google_id: String, username: String, profile_pic_path: Option<String>) -> Self {
        Self {
            id: None,
            google_id,
            username,
            profile_pic_path,
            bio: None,
            following_user_ids: vec![],
            follower_count: 0,
            liked_post_ids: vec![],
            authored_post_ids: vec![],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "authorID")]
    pub author_id: ObjectId,
    #[serde(rename = "imagePath", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub likes: i64,
    #[serde(rename = "createdAt")]
    pub created_at: bson::DateTime, // assigned at insert, immutable afterwards
}

impl Post {
    pub fn new(author_id: ObjectId, image_path: Option<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            author_id,
            image_path,
            description,
            likes: 0,
            created_at: bson::DateTime::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn user_serializes_with_wire_field_names() {
        let user = User::new(
            String::from("108234"),
            String::from("alice"),
            Some(String::from("https://lh3.googleusercontent.com/a/pic")),
        );
        let value = serde_json::to_value(&user).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("googleId"));
        assert!(obj.contains_key("followingUserIDs"));
        assert!(obj.contains_key("followerCount"));
        assert!(obj.contains_key("likedPostIDs"));
        assert!(obj.contains_key("authoredPostIDs"));
        // no id before insert
        assert!(!obj.contains_key("_id"));
        assert_eq!(obj["followerCount"], 0);
    }

    #[test]
    fn post_omits_image_path_when_absent() {
        let post = Post::new(ObjectId::new(), None, Some(String::from("no image here")));
        let value = serde_json::to_value(&post).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("imagePath"));
        assert!(obj.contains_key("authorID"));
        assert!(obj.contains_key("createdAt"));
        assert_eq!(obj["likes"], 0);
    }

    #[test]
    fn post_round_trips_through_json() {
        let post = Post::new(
            ObjectId::new(),
            Some(String::from("http://localhost:9000/media/abc-cat.png")),
            None,
        );
        let json = serde_json::to_string(&post).unwrap();
        let parsed: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.author_id, post.author_id);
        assert_eq!(parsed.image_path, post.image_path);
        assert_eq!(parsed.likes, 0);
    }
}
