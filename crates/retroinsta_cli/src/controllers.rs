use crate::cache::UserCache;
use crate::errors::RetroInstaCliError;
use crate::http;
use crate::utils::fs;
use bson::oid::ObjectId;
use retroinsta_common::models::{Post, User};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/**
 * Per-invocation client state. Construction mirrors the app's startup
 * sequence: fetch the Google client id first, then try to restore the
 * persisted session, then serve the command.
 */
pub struct AppContext {
    pub client_id: String,
    pub user: Option<User>,
    pub cache: UserCache,
}

impl AppContext {
    pub async fn init() -> Result<Self, RetroInstaCliError> {
        let client_id = http::get_google_config_req().await?;
        let mut cache = UserCache::default();
        let user = match fs::read_session_user_id()? {
            Some(id) => match http::get_user_req(&id).await {
                Ok(user) => {
                    cache.put(user.clone());
                    Some(user)
                }
                Err(_) => {
                    // the stored id no longer resolves; drop the session
                    fs::clear_session()?;
                    None
                }
            },
            None => None,
        };
        Ok(Self {
            client_id,
            user,
            cache,
        })
    }

    fn require_login(&self) -> Result<&User, RetroInstaCliError> {
        self.user.as_ref().ok_or(RetroInstaCliError::NotLoggedIn)
    }

    fn session_user_id(&self) -> Result<String, RetroInstaCliError> {
        self.require_login()?
            .id
            .map(|id| id.to_hex())
            .ok_or(RetroInstaCliError::NotLoggedIn)
    }
}

/// Popularity ordering for the explore feed, applied client-side over the
/// recency-ordered page the server returns
pub fn rank_by_popularity(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.likes.cmp(&a.likes));
    posts
}

/// Join posts with their authors; posts whose author could not be resolved
/// are dropped from the rendering, matching the web client
pub fn render_posts(posts: &[Post], authors: &HashMap<ObjectId, User>) -> String {
    let mut lines = vec![];
    for post in posts {
        let Some(author) = authors.get(&post.author_id) else {
            continue;
        };
        let id = post.id.map(|id| id.to_hex()).unwrap_or_default();
        let when = post
            .created_at
            .try_to_rfc3339_string()
            .unwrap_or_default();
        let mut line = format!("[{}] {} ♥{} @{}", id, when, post.likes, author.username);
        if let Some(description) = post.description.as_deref() {
            line.push_str(&format!("  \"{}\"", description));
        }
        if let Some(image) = post.image_path.as_deref() {
            line.push_str(&format!("  {}", image));
        }
        lines.push(line);
    }
    if lines.is_empty() {
        return String::from("(no posts)");
    }
    lines.join("\n")
}

/**
 * Resolve the author of every post, consulting the cache first and
 * fetching the remaining ids concurrently. Failed lookups are skipped.
 */
async fn resolve_authors(
    cache: &mut UserCache,
    posts: &[Post],
) -> HashMap<ObjectId, User> {
    let unique: HashSet<ObjectId> = posts.iter().map(|post| post.author_id).collect();
    let mut authors = HashMap::new();
    let mut to_fetch = vec![];
    for id in unique {
        match cache.get(&id) {
            Some(user) => {
                authors.insert(id, user.clone());
            }
            None => to_fetch.push(id),
        }
    }
    let lookups = to_fetch.iter().map(|id| {
        let hex = id.to_hex();
        async move { http::get_user_req(&hex).await }
    });
    for user in futures::future::join_all(lookups).await.into_iter().flatten() {
        if let Some(id) = user.id {
            cache.put(user.clone());
            authors.insert(id, user);
        }
    }
    authors
}

pub async fn health() -> Result<String, RetroInstaCliError> {
    http::health_req().await
}

/// Server address and the Google client id it is configured with
pub async fn config() -> Result<String, RetroInstaCliError> {
    let ctx = AppContext::init().await?;
    Ok(format!(
        "Server: {}\nGoogle client id: {}",
        &**http::SERVER_URL,
        ctx.client_id
    ))
}

pub async fn login(id_token: String) -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let (user, created) = http::login_req(id_token).await?;
    let user_id = user
        .id
        .map(|id| id.to_hex())
        .ok_or_else(|| RetroInstaCliError::ServerError(String::from("login returned no id")))?;
    fs::write_session_user_id(&user_id)?;
    ctx.cache.put(user.clone());
    match created {
        true => Ok(format!("Welcome to RetroInsta, @{}!", user.username)),
        false => Ok(format!("Logged in as @{}", user.username)),
    }
}

pub async fn logout() -> Result<String, RetroInstaCliError> {
    fs::clear_session()?;
    Ok(String::from("Logged out"))
}

pub async fn whoami() -> Result<String, RetroInstaCliError> {
    let ctx = AppContext::init().await?;
    match &ctx.user {
        Some(user) => Ok(format!(
            "@{} (following {}, followers {})",
            user.username,
            user.following_user_ids.len(),
            user.follower_count
        )),
        None => Ok(String::from("Not logged in")),
    }
}

/// Global feed, optionally re-ranked by popularity with `--top`
pub async fn explore(top: Option<usize>) -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let mut posts = http::get_all_posts_req().await?;
    if let Some(count) = top {
        posts = rank_by_popularity(posts);
        posts.truncate(count);
    }
    let authors = resolve_authors(&mut ctx.cache, &posts).await;
    Ok(render_posts(&posts, &authors))
}

/// Personal feed: own posts plus posts from followed users
pub async fn home() -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let user_id = ctx.session_user_id()?;
    let posts = http::get_personal_posts_req(&user_id).await?;
    let authors = resolve_authors(&mut ctx.cache, &posts).await;
    Ok(render_posts(&posts, &authors))
}

/// A user's profile: header plus their posts, defaulting to the session user
pub async fn profile(user_id: Option<String>) -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let user_id = match user_id {
        Some(id) => id,
        None => ctx.session_user_id()?,
    };
    let oid = ObjectId::parse_str(&user_id)
        .map_err(|_| RetroInstaCliError::InvalidId(user_id.clone()))?;
    let user = match ctx.cache.get(&oid) {
        Some(user) => user.clone(),
        None => {
            let user = http::get_user_req(&user_id).await?;
            ctx.cache.put(user.clone());
            user
        }
    };
    let posts = http::get_user_posts_req(&user_id).await?;
    let authors = resolve_authors(&mut ctx.cache, &posts).await;
    let mut out = format!(
        "@{}  following {}  followers {}\n",
        user.username,
        user.following_user_ids.len(),
        user.follower_count
    );
    if let Some(bio) = user.bio.as_deref() {
        out.push_str(&format!("{}\n", bio));
    }
    out.push_str(&render_posts(&posts, &authors));
    Ok(out)
}

pub async fn create_post(
    image: Option<PathBuf>,
    description: Option<String>,
) -> Result<String, RetroInstaCliError> {
    let ctx = AppContext::init().await?;
    let user_id = ctx.session_user_id()?;
    let post = http::create_post_req(&user_id, image.as_deref(), description).await?;
    let id = post.id.map(|id| id.to_hex()).unwrap_or_default();
    match post.image_path {
        Some(url) => Ok(format!("Posted {} ({})", id, url)),
        None => Ok(format!("Posted {}", id)),
    }
}

pub async fn like(post_id: String) -> Result<String, RetroInstaCliError> {
    let ctx = AppContext::init().await?;
    let user_id = ctx.session_user_id()?;
    let response = http::like_post_req(&post_id, &user_id).await?;
    Ok(format!("{} ({} likes)", response.message, response.likes))
}

/**
 * Toggle a follow edge. The server responds with the updated follower
 * document, which is applied to the session and cache directly; no
 * re-fetch and no broadcast event.
 */
pub async fn follow(target_user_id: String) -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let user_id = ctx.session_user_id()?;
    let response = http::follow_req(&user_id, &target_user_id).await?;
    ctx.cache.put(response.user.clone());
    ctx.user = Some(response.user);
    Ok(format!(
        "{} (now following {})",
        response.message,
        ctx.user
            .as_ref()
            .map(|user| user.following_user_ids.len())
            .unwrap_or_default()
    ))
}

/// Usernames of everyone the session user follows
pub async fn following() -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let user = ctx.require_login()?.clone();
    if user.following_user_ids.is_empty() {
        return Ok(String::from("(not following anyone)"));
    }
    let lookups = user.following_user_ids.iter().map(|id| {
        let hex = id.to_hex();
        async move { http::get_user_req(&hex).await }
    });
    let mut names = vec![];
    for followed in futures::future::join_all(lookups).await.into_iter().flatten() {
        names.push(format!("@{}", followed.username));
        ctx.cache.put(followed);
    }
    Ok(names.join("\n"))
}

pub async fn set_bio(new_bio: String) -> Result<String, RetroInstaCliError> {
    let mut ctx = AppContext::init().await?;
    let user_id = ctx.session_user_id()?;
    let user = http::update_bio_req(&user_id, new_bio).await?;
    ctx.cache.put(user.clone());
    ctx.user = Some(user);
    Ok(String::from("Bio updated"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn post_with_likes(author: ObjectId, likes: i64) -> Post {
        let mut post = Post::new(author, None, None);
        post.id = Some(ObjectId::new());
        post.likes = likes;
        post
    }

    #[test]
    fn popularity_ranking_sorts_by_likes_descending() {
        let author = ObjectId::new();
        let posts = vec![
            post_with_likes(author, 1),
            post_with_likes(author, 9),
            post_with_likes(author, 4),
        ];
        let ranked = rank_by_popularity(posts);
        let likes: Vec<i64> = ranked.iter().map(|post| post.likes).collect();
        assert_eq!(likes, vec![9, 4, 1]);
    }

    #[test]
    fn rendering_drops_posts_with_unresolved_authors() {
        let known = ObjectId::new();
        let unknown = ObjectId::new();
        let mut author = User::new(String::from("g"), String::from("alice"), None);
        author.id = Some(known);
        let mut authors = HashMap::new();
        authors.insert(known, author);

        let posts = vec![post_with_likes(known, 2), post_with_likes(unknown, 5)];
        let rendered = render_posts(&posts, &authors);
        assert!(rendered.contains("@alice"));
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn rendering_an_empty_feed_is_not_an_error() {
        let rendered = render_posts(&[], &HashMap::new());
        assert_eq!(rendered, "(no posts)");
    }
}
