use crate::{DATABASE_NAME, MONGODB_URI};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, ServerApi,
    ServerApiVersion,
};
use mongodb::{Client, ClientSession, Collection, IndexModel};
use retroinsta_common::errors::RetroInstaError;
use retroinsta_common::models::{Post, User};

pub struct RetroInstaDB {
    client: Client,
    users: Collection<User>,
    posts: Collection<Post>,
}

/// Outcome of a like toggle: whether the like was added and the new counter
pub struct LikeToggle {
    pub added: bool,
    pub likes: i64,
}

/// Outcome of a follow toggle: whether the edge now exists and the updated follower
pub struct FollowToggle {
    pub following: bool,
    pub follower: User,
}

fn mongo_err(e: mongodb::error::Error) -> RetroInstaError {
    RetroInstaError::MongoError(e.to_string())
}

/**
 * Checks whether an insert failed because a unique index rejected the
 * document, which happens when two first-time logins race each other.
 */
fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match *e.kind {
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref write)) => {
            write.code == 11000
        }
        _ => false,
    }
}

/**
 * The set of author ids whose posts belong in a user's personal feed:
 * everyone the user follows plus the user themselves.
 */
pub fn personal_feed_authors(user: &User) -> Vec<ObjectId> {
    let mut authors = user.following_user_ids.clone();
    if let Some(id) = user.id {
        authors.push(id);
    }
    authors
}

/// Like counter after a toggle, floored at zero
pub fn next_like_count(likes: i64, added: bool) -> i64 {
    if added {
        likes + 1
    } else {
        (likes - 1).max(0)
    }
}

impl RetroInstaDB {
    pub async fn init() -> Result<Self, RetroInstaError> {
        let mut client_options = ClientOptions::parse(&**MONGODB_URI).await.map_err(mongo_err)?;
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        let client = Client::with_options(client_options).map_err(mongo_err)?;
        let db = client.database(&**DATABASE_NAME);
        let users = db.collection("users");
        let posts = db.collection("posts");
        Ok(Self {
            client,
            users,
            posts,
        })
    }

    /**
     * Creates the unique index on googleId that turns a concurrent
     * first-login race into a duplicate-key error the auth route can
     * resolve by re-fetching.
     */
    pub async fn ensure_indexes(&self) -> Result<(), RetroInstaError> {
        let index = IndexModel::builder()
            .keys(doc! { "googleId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index, None).await.map_err(mongo_err)?;
        Ok(())
    }

    /// USER FUNCTIONS ///

    pub async fn find_user_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, RetroInstaError> {
        let filter = doc! { "googleId": google_id };
        self.users.find_one(filter, None).await.map_err(mongo_err)
    }

    pub async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, RetroInstaError> {
        let filter = doc! { "_id": *id };
        self.users.find_one(filter, None).await.map_err(mongo_err)
    }

    /**
     * Insert a new user into the database
     *
     * @param user - the user document built from verified Google claims
     * @returns - the inserted user with its id set, UserExists if the
     *            unique index rejected the googleId, or a mongo error
     */
    pub async fn create_user(&self, mut user: User) -> Result<User, RetroInstaError> {
        match self.users.insert_one(&user, None).await {
            Ok(result) => {
                user.id = result.inserted_id.as_object_id();
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => {
                Err(RetroInstaError::UserExists(user.google_id.clone()))
            }
            Err(e) => Err(mongo_err(e)),
        }
    }

    /// Overwrites the bio and returns the updated document
    pub async fn update_bio(
        &self,
        user_id: &ObjectId,
        new_bio: &str,
    ) -> Result<Option<User>, RetroInstaError> {
        let filter = doc! { "_id": *user_id };
        let update = doc! { "$set": { "bio": new_bio } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.users
            .find_one_and_update(filter, update, options)
            .await
            .map_err(mongo_err)
    }

    /// POST FUNCTIONS ///

    /// All posts, newest first. Popularity ranking stays client-side.
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, RetroInstaError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.posts.find(doc! {}, options).await.map_err(mongo_err)?;
        cursor.try_collect().await.map_err(mongo_err)
    }

    /// Posts by one author, resolved through the author's denormalized post list
    pub async fn get_posts_by_author(&self, author: &User) -> Result<Vec<Post>, RetroInstaError> {
        if author.authored_post_ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = doc! { "_id": { "$in": author.authored_post_ids.clone() } };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.posts.find(filter, options).await.map_err(mongo_err)?;
        cursor.try_collect().await.map_err(mongo_err)
    }

    /// Posts authored by the viewer or anyone the viewer follows, newest first
    pub async fn get_personal_feed(&self, viewer: &User) -> Result<Vec<Post>, RetroInstaError> {
        let authors = personal_feed_authors(viewer);
        let filter = doc! { "authorID": { "$in": authors } };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.posts.find(filter, options).await.map_err(mongo_err)?;
        cursor.try_collect().await.map_err(mongo_err)
    }

    /**
     * Insert a new post and reference it in the author's authoredPostIDs.
     * The posts collection remains the source of truth for authorship;
     * the user-side list is a convenience index.
     */
    pub async fn create_post(&self, mut post: Post) -> Result<Post, RetroInstaError> {
        let result = self.posts.insert_one(&post, None).await.map_err(mongo_err)?;
        let post_oid = result
            .inserted_id
            .as_object_id()
            .ok_or(RetroInstaError::InternalError)?;
        post.id = Some(post_oid);
        let query = doc! { "_id": post.author_id };
        let update = doc! { "$push": { "authoredPostIDs": post_oid } };
        self.users
            .update_one(query, update, None)
            .await
            .map_err(mongo_err)?;
        Ok(post)
    }

    /// SOCIAL GRAPH MUTATIONS ///

    async fn start_transaction(&self) -> Result<ClientSession, RetroInstaError> {
        let mut session = self.client.start_session(None).await.map_err(mongo_err)?;
        session.start_transaction(None).await.map_err(mongo_err)?;
        Ok(session)
    }

    /**
     * Flip membership of the post in the user's likedPostIDs and adjust the
     * post's like counter in a single transaction. The decrement is guarded
     * so the counter never drops below zero.
     *
     * @param post_id - the post being liked or unliked
     * @param user_id - the user toggling the like
     * @returns - whether the like was added and the resulting counter value
     */
    pub async fn toggle_like(
        &self,
        post_id: &ObjectId,
        user_id: &ObjectId,
    ) -> Result<LikeToggle, RetroInstaError> {
        let mut session = self.start_transaction().await?;
        let user = self
            .users
            .find_one_with_session(doc! { "_id": *user_id }, None, &mut session)
            .await
            .map_err(mongo_err)?
            .ok_or_else(|| RetroInstaError::UserNotFound(user_id.to_hex()))?;
        let post = self
            .posts
            .find_one_with_session(doc! { "_id": *post_id }, None, &mut session)
            .await
            .map_err(mongo_err)?
            .ok_or_else(|| RetroInstaError::PostNotFound(post_id.to_hex()))?;

        let added = !user.liked_post_ids.contains(post_id);
        if added {
            self.users
                .update_one_with_session(
                    doc! { "_id": *user_id },
                    doc! { "$addToSet": { "likedPostIDs": *post_id } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
            self.posts
                .update_one_with_session(
                    doc! { "_id": *post_id },
                    doc! { "$inc": { "likes": 1 } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
        } else {
            self.users
                .update_one_with_session(
                    doc! { "_id": *user_id },
                    doc! { "$pull": { "likedPostIDs": *post_id } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
            // no-op when the counter is already at the floor
            self.posts
                .update_one_with_session(
                    doc! { "_id": *post_id, "likes": { "$gt": 0 } },
                    doc! { "$inc": { "likes": -1 } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
        }
        session.commit_transaction().await.map_err(mongo_err)?;

        Ok(LikeToggle {
            added,
            likes: next_like_count(post.likes, added),
        })
    }

    /**
     * Flip membership of the followee in the follower's followingUserIDs
     * and adjust the followee's follower count, both in one transaction so
     * the count stays consistent with the edge set.
     *
     * @returns - whether the follow edge now exists and the updated follower
     */
    pub async fn toggle_follow(
        &self,
        follower_id: &ObjectId,
        followee_id: &ObjectId,
    ) -> Result<FollowToggle, RetroInstaError> {
        let mut session = self.start_transaction().await?;
        let follower = self
            .users
            .find_one_with_session(doc! { "_id": *follower_id }, None, &mut session)
            .await
            .map_err(mongo_err)?
            .ok_or_else(|| RetroInstaError::UserNotFound(follower_id.to_hex()))?;
        // verify the followee exists before creating an edge to it
        self.users
            .find_one_with_session(doc! { "_id": *followee_id }, None, &mut session)
            .await
            .map_err(mongo_err)?
            .ok_or_else(|| RetroInstaError::UserNotFound(followee_id.to_hex()))?;

        let following = !follower.following_user_ids.contains(followee_id);
        if following {
            self.users
                .update_one_with_session(
                    doc! { "_id": *follower_id },
                    doc! { "$addToSet": { "followingUserIDs": *followee_id } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
            self.users
                .update_one_with_session(
                    doc! { "_id": *followee_id },
                    doc! { "$inc": { "followerCount": 1 } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
        } else {
            self.users
                .update_one_with_session(
                    doc! { "_id": *follower_id },
                    doc! { "$pull": { "followingUserIDs": *followee_id } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
            self.users
                .update_one_with_session(
                    doc! { "_id": *followee_id, "followerCount": { "$gt": 0 } },
                    doc! { "$inc": { "followerCount": -1 } },
                    None,
                    &mut session,
                )
                .await
                .map_err(mongo_err)?;
        }
        session.commit_transaction().await.map_err(mongo_err)?;

        let mut updated = follower;
        if following {
            updated.following_user_ids.push(*followee_id);
        } else {
            updated.following_user_ids.retain(|id| id != followee_id);
        }
        Ok(FollowToggle {
            following,
            follower: updated,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn personal_feed_includes_the_viewer() {
        let mut user = User::new(String::from("g1"), String::from("alice"), None);
        let own_id = ObjectId::new();
        user.id = Some(own_id);
        let followed = ObjectId::new();
        user.following_user_ids.push(followed);

        let authors = personal_feed_authors(&user);
        assert!(authors.contains(&own_id));
        assert!(authors.contains(&followed));
        assert_eq!(authors.len(), 2);
    }

    #[test]
    fn personal_feed_of_loner_is_just_the_viewer() {
        let mut user = User::new(String::from("g2"), String::from("bob"), None);
        user.id = Some(ObjectId::new());
        assert_eq!(personal_feed_authors(&user).len(), 1);
    }

    #[test]
    fn like_counter_never_goes_negative() {
        assert_eq!(next_like_count(0, true), 1);
        assert_eq!(next_like_count(1, false), 0);
        assert_eq!(next_like_count(0, false), 0);
        // toggling twice returns to the original count
        let original = 7;
        assert_eq!(next_like_count(next_like_count(original, true), false), original);
    }
}
