use crate::errors::RetroInstaCliError;
use lazy_static::lazy_static;
use reqwest::{Client, Response, StatusCode};
use retroinsta_common::http::requests::{
    FollowToggleRequest, GoogleLoginRequest, LikeToggleRequest, UpdateBioRequest,
};
use retroinsta_common::http::responses::{
    ErrorBody, FollowToggleResponse, GoogleConfigResponse, LikeToggleResponse,
};
use retroinsta_common::models::{Post, User};
use std::path::Path;

lazy_static! {
    pub static ref SERVER_URL: String = std::env::var("RETROINSTA_SERVER_URL")
        .unwrap_or_else(|_| String::from("http://localhost:8000"));
}

fn net_err(e: reqwest::Error) -> RetroInstaCliError {
    RetroInstaCliError::ServerError(e.to_string())
}

/// Pull the JSON { error } body off a failed response, falling back to the
/// status line
async fn error_message(res: Response) -> RetroInstaCliError {
    let status = res.status();
    match res.json::<ErrorBody>().await {
        Ok(body) => RetroInstaCliError::ServerError(body.error),
        Err(_) => RetroInstaCliError::ServerError(format!("request failed with {}", status)),
    }
}

/// GET REQUESTS ///

pub async fn health_req() -> Result<String, RetroInstaCliError> {
    let url = format!("{}/health", &**SERVER_URL);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.text().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

/**
 * Fetches the Google OAuth client id the server is configured with. This
 * runs before anything else so a misconfigured server fails fast.
 */
pub async fn get_google_config_req() -> Result<String, RetroInstaCliError> {
    let url = format!("{}/api/auth/google/config", &**SERVER_URL);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => {
            let config = res.json::<GoogleConfigResponse>().await.map_err(net_err)?;
            Ok(config.client_id)
        }
        _ => Err(error_message(res).await),
    }
}

pub async fn get_user_req(user_id: &str) -> Result<User, RetroInstaCliError> {
    let url = format!("{}/api/users/{}", &**SERVER_URL, user_id);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<User>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

pub async fn get_all_posts_req() -> Result<Vec<Post>, RetroInstaCliError> {
    let url = format!("{}/api/posts", &**SERVER_URL);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<Vec<Post>>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

pub async fn get_personal_posts_req(user_id: &str) -> Result<Vec<Post>, RetroInstaCliError> {
    let url = format!("{}/api/posts/personal/{}", &**SERVER_URL, user_id);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<Vec<Post>>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

pub async fn get_user_posts_req(user_id: &str) -> Result<Vec<Post>, RetroInstaCliError> {
    let url = format!("{}/api/posts/user/{}", &**SERVER_URL, user_id);
    let res = reqwest::get(&url).await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<Vec<Post>>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

/// POST/PATCH REQUESTS ///

/**
 * Makes an HTTP request to log in with a Google ID token
 *
 * @param id_token - the assertion obtained from Google Sign-In
 * @returns - the user plus whether the account was created on this login
 */
pub async fn login_req(id_token: String) -> Result<(User, bool), RetroInstaCliError> {
    let url = format!("{}/api/auth/google/login", &**SERVER_URL);
    let body = GoogleLoginRequest {
        id_token: Some(id_token),
    };
    let client = Client::new();
    let res = client.post(&url).json(&body).send().await.map_err(net_err)?;
    match res.status() {
        StatusCode::OK => Ok((res.json::<User>().await.map_err(net_err)?, false)),
        StatusCode::CREATED => Ok((res.json::<User>().await.map_err(net_err)?, true)),
        _ => Err(error_message(res).await),
    }
}

/**
 * Makes an HTTP request to create a post, streaming the image as one part
 * of a multipart form when present
 */
pub async fn create_post_req(
    author_id: &str,
    image_path: Option<&Path>,
    description: Option<String>,
) -> Result<Post, RetroInstaCliError> {
    let url = format!("{}/api/posts", &**SERVER_URL);
    let mut form = reqwest::multipart::Form::new().text("authorID", author_id.to_string());
    if let Some(description) = description {
        form = form.text("description", description);
    }
    if let Some(path) = image_path {
        let bytes =
            std::fs::read(path).map_err(|e| RetroInstaCliError::FileError(e.to_string()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime.as_ref())
            .map_err(net_err)?;
        form = form.part("imagePath", part);
    }

    let client = Client::new();
    let res = client
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(net_err)?;
    match res.status() {
        StatusCode::CREATED => res.json::<Post>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

pub async fn like_post_req(
    post_id: &str,
    user_id: &str,
) -> Result<LikeToggleResponse, RetroInstaCliError> {
    let url = format!("{}/api/posts/{}/like", &**SERVER_URL, post_id);
    let body = LikeToggleRequest {
        user_id: user_id.to_string(),
    };
    let client = Client::new();
    let res = client
        .patch(&url)
        .json(&body)
        .send()
        .await
        .map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<LikeToggleResponse>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

/**
 * Makes an HTTP request to toggle a follow edge. The response carries the
 * updated follower document so callers can propagate it straight into
 * their caches instead of re-fetching.
 */
pub async fn follow_req(
    user_id: &str,
    target_user_id: &str,
) -> Result<FollowToggleResponse, RetroInstaCliError> {
    let url = format!("{}/api/users/{}/follow", &**SERVER_URL, user_id);
    let body = FollowToggleRequest {
        target_user_id: target_user_id.to_string(),
    };
    let client = Client::new();
    let res = client
        .patch(&url)
        .json(&body)
        .send()
        .await
        .map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<FollowToggleResponse>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}

pub async fn update_bio_req(user_id: &str, new_bio: String) -> Result<User, RetroInstaCliError> {
    let url = format!("{}/api/users/{}/bio", &**SERVER_URL, user_id);
    let body = UpdateBioRequest { new_bio };
    let client = Client::new();
    let res = client
        .patch(&url)
        .json(&body)
        .send()
        .await
        .map_err(net_err)?;
    match res.status() {
        StatusCode::OK => res.json::<User>().await.map_err(net_err),
        _ => Err(error_message(res).await),
    }
}
