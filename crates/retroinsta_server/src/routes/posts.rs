use crate::catchers::ErrorResponse;
use crate::mongo::RetroInstaDB;
use crate::storage::MediaStore;
use bson::oid::ObjectId;
use retroinsta_common::errors::RetroInstaError;
use retroinsta_common::http::requests::LikeToggleRequest;
use retroinsta_common::http::responses::LikeToggleResponse;
use retroinsta_common::models::Post;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

#[derive(Responder)]
#[response(status = 201)]
pub struct PostCreated(Json<Post>);

#[derive(FromForm)]
pub struct CreatePostForm<'r> {
    #[field(name = "authorID")]
    pub author_id: String,
    pub description: Option<String>,
    // the field carries the file itself; the stored URL lands on the post
    #[field(name = "imagePath")]
    pub image: Option<TempFile<'r>>,
}

/**
 * Explore feed: every post, newest first. Popularity ordering is applied
 * by the client over this page.
 *
 * @return status:
 *             * 200 with the post list
 *             * 500 if the db fails
 */
#[get("/")]
pub async fn get_posts(db: &State<RetroInstaDB>) -> Result<Json<Vec<Post>>, ErrorResponse> {
    match db.get_all_posts().await {
        Ok(posts) => Ok(Json(posts)),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

/**
 * All posts by one author, newest first
 *
 * @return status:
 *             * 200 with the posts (empty if the author has none)
 *             * 400 if the id is not a valid ObjectId
 *             * 404 if no such user exists
 *             * 500 if the db fails
 */
#[get("/user/<user_id>")]
pub async fn get_posts_by_user(
    user_id: &str,
    db: &State<RetroInstaDB>,
) -> Result<Json<Vec<Post>>, ErrorResponse> {
    let user_oid = match ObjectId::parse_str(user_id) {
        Ok(oid) => oid,
        Err(_) => return Err(ErrorResponse::bad_request("Invalid user ID.")),
    };
    let user = match db.find_user_by_id(&user_oid).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ErrorResponse::not_found("User not found")),
        Err(e) => return Err(ErrorResponse::from_error(&e)),
    };
    match db.get_posts_by_author(&user).await {
        Ok(posts) => Ok(Json(posts)),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

/**
 * Personal feed: posts authored by the viewer or anyone the viewer
 * follows, newest first. A viewer following nobody with no posts of their
 * own gets an empty list, not an error.
 *
 * @return status: 200 | 400 invalid id | 404 unknown user | 500
 */
#[get("/personal/<user_id>")]
pub async fn personal_feed(
    user_id: &str,
    db: &State<RetroInstaDB>,
) -> Result<Json<Vec<Post>>, ErrorResponse> {
    let user_oid = match ObjectId::parse_str(user_id) {
        Ok(oid) => oid,
        Err(_) => return Err(ErrorResponse::bad_request("Invalid user ID.")),
    };
    let viewer = match db.find_user_by_id(&user_oid).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ErrorResponse::not_found("User not found")),
        Err(e) => return Err(ErrorResponse::from_error(&e)),
    };
    match db.get_personal_feed(&viewer).await {
        Ok(posts) => Ok(Json(posts)),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

/**
 * Create a post from a multipart form. The image field is optional; when
 * present it is pushed to object storage and the resulting URL recorded
 * on the post.
 *
 * @param form - multipart CreatePostForm containing:
 *             * authorID: the posting user's id
 *             * description: optional caption
 *             * imagePath: optional image file, capped at 10 MiB
 * @return status:
 *             * 201 with the created post
 *             * 400 if the author id is malformed
 *             * 413 if the upload exceeds the file limit
 *             * 500 if storage or the db fails
 */
#[post("/", data = "<form>")]
pub async fn create_post(
    mut form: Form<CreatePostForm<'_>>,
    db: &State<RetroInstaDB>,
    media: &State<MediaStore>,
) -> Result<PostCreated, ErrorResponse> {
    let author_id = match ObjectId::parse_str(&form.author_id) {
        Ok(oid) => oid,
        Err(_) => return Err(ErrorResponse::bad_request("Invalid format for authorID")),
    };

    let image_path = match form.image.as_mut() {
        Some(file) if file.len() > 0 => {
            let filename = file
                .raw_name()
                .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
                .unwrap_or_else(|| String::from("upload"));
            let content_type = file
                .content_type()
                .map(|ct| ct.to_string())
                .unwrap_or_else(|| String::from("application/octet-stream"));
            let url = stage_and_store(file, &filename, &content_type, media).await?;
            tracing::info!(url = %url, "image uploaded");
            Some(url)
        }
        _ => None,
    };

    let description = form
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(String::from);
    let post = Post::new(author_id, image_path, description);
    match db.create_post(post).await {
        Ok(created) => Ok(PostCreated(Json(created))),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

// TempFile may be buffered in memory or already on disk; copying to a
// staging path covers both before the bytes go to object storage
async fn stage_and_store(
    file: &mut TempFile<'_>,
    filename: &str,
    content_type: &str,
    media: &State<MediaStore>,
) -> Result<String, ErrorResponse> {
    let staging = std::env::temp_dir().join(format!("retroinsta-upload-{}", Uuid::new_v4()));
    if let Err(e) = file.copy_to(&staging).await {
        return Err(ErrorResponse::internal_error(format!(
            "Failed to read upload: {}",
            e
        )));
    }
    let bytes = match rocket::tokio::fs::read(&staging).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Err(ErrorResponse::internal_error(format!(
                "Failed to read upload: {}",
                e
            )))
        }
    };
    let _ = rocket::tokio::fs::remove_file(&staging).await;
    media
        .store_image(bytes, filename, content_type)
        .await
        .map_err(|e| ErrorResponse::from_error(&e))
}

/**
 * Toggle a like: flips membership in the user's liked set and moves the
 * post counter by one, never below zero.
 *
 * @param request - the LikeToggleRequest containing:
 *             * userID: the user flipping the like
 * @return status:
 *             * 200 with { message, likes }
 *             * 400 if either id is malformed
 *             * 404 if the user or post does not exist
 *             * 500 if the db fails
 */
#[patch("/<post_id>/like", format = "json", data = "<request>")]
pub async fn like_post(
    post_id: &str,
    request: Json<LikeToggleRequest>,
    db: &State<RetroInstaDB>,
) -> Result<Json<LikeToggleResponse>, ErrorResponse> {
    let (post_oid, user_oid) = match (
        ObjectId::parse_str(post_id),
        ObjectId::parse_str(&request.user_id),
    ) {
        (Ok(post_oid), Ok(user_oid)) => (post_oid, user_oid),
        _ => return Err(ErrorResponse::bad_request("Invalid format for id or userID")),
    };

    match db.toggle_like(&post_oid, &user_oid).await {
        Ok(toggle) => {
            let message = if toggle.added {
                "Like added successfully"
            } else {
                "Like removed successfully"
            };
            Ok(Json(LikeToggleResponse {
                message: String::from(message),
                likes: toggle.likes,
            }))
        }
        Err(
            RetroInstaError::UserNotFound(_) | RetroInstaError::PostNotFound(_),
        ) => Err(ErrorResponse::not_found("User or Post not found")),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}
