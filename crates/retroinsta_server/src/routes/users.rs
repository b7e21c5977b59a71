use crate::catchers::ErrorResponse;
use crate::mongo::RetroInstaDB;
use bson::oid::ObjectId;
use retroinsta_common::errors::RetroInstaError;
use retroinsta_common::http::requests::{FollowToggleRequest, UpdateBioRequest};
use retroinsta_common::http::responses::FollowToggleResponse;
use retroinsta_common::models::User;
use rocket::serde::json::Json;
use rocket::State;

/**
 * Look a user up by id
 *
 * @return status:
 *             * 200 with the user document
 *             * 400 if the id is not a valid ObjectId
 *             * 404 if no such user exists
 *             * 500 if the db fails
 */
#[get("/<user_id>")]
pub async fn get_user(
    user_id: &str,
    db: &State<RetroInstaDB>,
) -> Result<Json<User>, ErrorResponse> {
    let user_oid = match ObjectId::parse_str(user_id) {
        Ok(oid) => oid,
        Err(_) => return Err(ErrorResponse::bad_request("Invalid user ID.")),
    };
    match db.find_user_by_id(&user_oid).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(ErrorResponse::not_found("User not found")),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

/**
 * Toggle a follow edge. The follower's following set and the followee's
 * follower count move together in one transaction, and the updated
 * follower document rides back on the response so clients can refresh
 * their view of the social graph without a second fetch.
 *
 * @param request - the FollowToggleRequest containing:
 *             * targetUserID: the user being followed or unfollowed
 * @return status:
 *             * 200 with { message, following, user }
 *             * 400 if either id is malformed or follower == followee
 *             * 404 if either user does not exist
 *             * 500 if the db fails
 */
#[patch("/<user_id>/follow", format = "json", data = "<request>")]
pub async fn follow_user(
    user_id: &str,
    request: Json<FollowToggleRequest>,
    db: &State<RetroInstaDB>,
) -> Result<Json<FollowToggleResponse>, ErrorResponse> {
    let (follower_oid, followee_oid) = match (
        ObjectId::parse_str(user_id),
        ObjectId::parse_str(&request.target_user_id),
    ) {
        (Ok(follower), Ok(followee)) => (follower, followee),
        _ => {
            return Err(ErrorResponse::bad_request(
                "Invalid format for id or targetUserID",
            ))
        }
    };
    if follower_oid == followee_oid {
        return Err(ErrorResponse::bad_request(
            RetroInstaError::SelfFollow.to_string(),
        ));
    }

    match db.toggle_follow(&follower_oid, &followee_oid).await {
        Ok(toggle) => {
            let message = if toggle.following {
                "Follow added successfully"
            } else {
                "Follow removed successfully"
            };
            Ok(Json(FollowToggleResponse {
                message: String::from(message),
                following: toggle.following,
                user: toggle.follower,
            }))
        }
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

/**
 * Overwrite the user's bio
 *
 * @param request - the UpdateBioRequest containing:
 *             * newBio: the replacement text
 * @return status:
 *             * 200 with the updated user
 *             * 400 if the id is malformed
 *             * 404 if no such user exists
 *             * 500 if the db fails
 */
#[patch("/<user_id>/bio", format = "json", data = "<request>")]
pub async fn update_bio(
    user_id: &str,
    request: Json<UpdateBioRequest>,
    db: &State<RetroInstaDB>,
) -> Result<Json<User>, ErrorResponse> {
    let user_oid = match ObjectId::parse_str(user_id) {
        Ok(oid) => oid,
        Err(_) => return Err(ErrorResponse::bad_request("Invalid user ID.")),
    };
    match db.update_bio(&user_oid, &request.new_bio).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(ErrorResponse::not_found("User not found")),
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}
