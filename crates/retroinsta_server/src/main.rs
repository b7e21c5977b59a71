#[macro_use]
extern crate rocket;

use crate::catchers::{bad_request, not_found, payload_too_large, unauthorized, unprocessable_entity};
use crate::google::GoogleVerifier;
use crate::mongo::RetroInstaDB;
use crate::routes::{AUTH_ROUTES, POST_ROUTES, USER_ROUTES};
use crate::storage::MediaStore;
use lazy_static::lazy_static;
use retroinsta_common::MAX_UPLOAD_BYTES;
use rocket::data::{Limits, ToByteUnit};
use rocket::{Build, Rocket};

mod catchers;
mod google;
mod mongo;
mod routes;
mod storage;

lazy_static! {
    pub static ref MONGODB_URI: String = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| String::from("mongodb://localhost:27017"));
    pub static ref DATABASE_NAME: String =
        std::env::var("RETROINSTA_DB").unwrap_or_else(|_| String::from("retroinsta"));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    // GOOGLE_CLIENT_ID and MEDIA_BUCKET are startup-fatal when absent
    let client_id =
        std::env::var("GOOGLE_CLIENT_ID").map_err(|_| "GOOGLE_CLIENT_ID env variable not set")?;
    let verifier = GoogleVerifier::new(client_id);
    let media = MediaStore::init().await?;

    let db = RetroInstaDB::init().await?;
    db.ensure_indexes().await?;

    build_rocket(db, media, verifier).launch().await?;
    Ok(())
}

fn build_rocket(db: RetroInstaDB, media: MediaStore, verifier: GoogleVerifier) -> Rocket<Build> {
    // multipart uploads carry at most one 10 MiB image plus small fields
    let limits = Limits::default()
        .limit("file", MAX_UPLOAD_BYTES.bytes())
        .limit("data-form", 12.mebibytes());
    let figment = rocket::Config::figment().merge(("limits", limits));
    rocket::custom(figment)
        .manage(db)
        .manage(media)
        .manage(verifier)
        .mount("/", routes![health])
        .mount("/api/auth", AUTH_ROUTES.clone())
        .mount("/api/posts", POST_ROUTES.clone())
        .mount("/api/users", USER_ROUTES.clone())
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                payload_too_large,
                unprocessable_entity
            ],
        )
}

#[get("/health")]
async fn health() -> &'static str {
    "RetroInsta server up"
}

#[cfg(test)]
mod test {
    use super::*;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    struct RetroInstaTestContext {
        client: Client,
    }

    impl RetroInstaTestContext {
        async fn init() -> Self {
            std::env::set_var("MEDIA_BUCKET", "retroinsta-test-media");
            std::env::set_var("STORAGE_REGION", "us-east-1");
            let db = RetroInstaDB::init().await.unwrap();
            let media = MediaStore::init().await.unwrap();
            let verifier = GoogleVerifier::new(String::from("test-client-id"));
            let rocket = build_rocket(db, media, verifier);
            RetroInstaTestContext {
                client: Client::tracked(rocket).await.unwrap(),
            }
        }
    }

    #[rocket::async_test]
    async fn test_health() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client.get("/health").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_google_config_reflects_environment() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;

        std::env::set_var("GOOGLE_CLIENT_ID", "test-client-id.apps.googleusercontent.com");
        let res = client.get("/api/auth/google/config").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("test-client-id.apps.googleusercontent.com"));
        assert!(body.contains("clientId"));

        std::env::remove_var("GOOGLE_CLIENT_ID");
        let res = client.get("/api/auth/google/config").dispatch().await;
        assert_eq!(res.status(), Status::InternalServerError);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("error"));
    }

    #[rocket::async_test]
    async fn test_login_without_token_is_a_validation_error() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client
            .post("/api/auth/google/login")
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("Missing idToken"));
    }

    #[rocket::async_test]
    async fn test_login_with_garbage_token_is_unauthorized() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client
            .post("/api/auth/google/login")
            .header(ContentType::JSON)
            .body(r#"{"idToken":"definitely-not-a-jwt"}"#)
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::Unauthorized);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("error"));
    }

    #[rocket::async_test]
    async fn test_posts_by_user_rejects_malformed_id() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client.get("/api/posts/user/not-an-oid").dispatch().await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("Invalid user ID."));
    }

    #[rocket::async_test]
    async fn test_personal_feed_rejects_malformed_id() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client.get("/api/posts/personal/zzz").dispatch().await;
        assert_eq!(res.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_like_rejects_malformed_ids() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client
            .patch("/api/posts/bad/like")
            .header(ContentType::JSON)
            .body(r#"{"userID":"also-bad"}"#)
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("Invalid format for id or userID"));
    }

    #[rocket::async_test]
    async fn test_self_follow_is_rejected() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let oid = "65f1a2b3c4d5e6f7a8b9c0d1";
        let res = client
            .patch(format!("/api/users/{}/follow", oid))
            .header(ContentType::JSON)
            .body(format!(r#"{{"targetUserID":"{}"}}"#, oid))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("cannot follow themselves"));
    }

    #[rocket::async_test]
    async fn test_bio_update_rejects_malformed_id() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client
            .patch("/api/users/nope/bio")
            .header(ContentType::JSON)
            .body(r#"{"newBio":"hello"}"#)
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_create_post_rejects_malformed_author() {
        let RetroInstaTestContext { client } = RetroInstaTestContext::init().await;
        let res = client
            .post("/api/posts")
            .header(ContentType::Form)
            .body("authorID=not-an-oid&description=hi")
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::BadRequest);
        let body = res.into_string().await.unwrap();
        assert!(body.contains("Invalid format for authorID"));
    }
}
