use crate::catchers::ErrorResponse;
use crate::google::GoogleVerifier;
use crate::mongo::RetroInstaDB;
use retroinsta_common::errors::RetroInstaError;
use retroinsta_common::http::requests::GoogleLoginRequest;
use retroinsta_common::http::responses::GoogleConfigResponse;
use retroinsta_common::models::User;
use rocket::serde::json::Json;
use rocket::State;

/// Distinguishes a returning login (200) from a first-time signup (201)
#[derive(Responder)]
pub enum LoginResponse {
    #[response(status = 200)]
    Existing(Json<User>),
    #[response(status = 201)]
    Created(Json<User>),
}

/// Username shown for a fresh account: the local part of the email
pub fn derive_username(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/**
 * Expose the Google OAuth client id the frontend needs to render the
 * sign-in button
 *
 * @return status:
 *             * 200 with { clientId } if configured
 *             * 500 if GOOGLE_CLIENT_ID is not set on the server
 */
#[get("/google/config")]
pub async fn google_config() -> Result<Json<GoogleConfigResponse>, ErrorResponse> {
    match std::env::var("GOOGLE_CLIENT_ID") {
        Ok(client_id) if !client_id.is_empty() => Ok(Json(GoogleConfigResponse { client_id })),
        _ => {
            tracing::error!("config request failed: GOOGLE_CLIENT_ID not set");
            Err(ErrorResponse::internal_error("Server configuration error."))
        }
    }
}

/**
 * Verify a Google ID token and log the account in, creating the user on
 * first sight. A concurrent first login racing the insert is resolved by
 * re-fetching, so login stays idempotent.
 *
 * @param request - the GoogleLoginRequest containing:
 *             * idToken: the signed assertion from Google Sign-In
 * @return status:
 *             * 200 with the existing user
 *             * 201 with the newly created user
 *             * 400 if the token field is missing or empty
 *             * 401 if verification fails or required claims are absent
 *             * 409 if a uniqueness conflict could not be resolved
 *             * 500 if the db or key retrieval fails
 */
#[post("/google/login", format = "json", data = "<request>")]
pub async fn google_login(
    request: Json<GoogleLoginRequest>,
    verifier: &State<GoogleVerifier>,
    db: &State<RetroInstaDB>,
) -> Result<LoginResponse, ErrorResponse> {
    let id_token = match request.id_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(ErrorResponse::bad_request(
                RetroInstaError::MissingIdToken.to_string(),
            ))
        }
    };

    let claims = match verifier.verify(id_token).await {
        Ok(claims) => claims,
        Err(e) => return Err(ErrorResponse::from_error(&e)),
    };
    if claims.sub.is_empty() {
        return Err(ErrorResponse::unauthorized(
            RetroInstaError::MissingClaim(String::from("sub")).to_string(),
        ));
    }
    let email = match claims.email.as_deref() {
        Some(email) if !email.is_empty() => email,
        _ => {
            return Err(ErrorResponse::unauthorized(
                RetroInstaError::MissingClaim(String::from("email")).to_string(),
            ))
        }
    };

    match db.find_user_by_google_id(&claims.sub).await {
        Ok(Some(user)) => {
            tracing::info!(username = %user.username, "user found");
            return Ok(LoginResponse::Existing(Json(user)));
        }
        Ok(None) => (),
        Err(e) => return Err(ErrorResponse::from_error(&e)),
    };

    let user = User::new(
        claims.sub.clone(),
        derive_username(email),
        claims.picture.clone(),
    );
    match db.create_user(user).await {
        Ok(created) => {
            tracing::info!(username = %created.username, "new user created");
            Ok(LoginResponse::Created(Json(created)))
        }
        Err(RetroInstaError::UserExists(_)) => {
            // lost the race to a concurrent login; return the winner
            match db.find_user_by_google_id(&claims.sub).await {
                Ok(Some(user)) => Ok(LoginResponse::Existing(Json(user))),
                Ok(None) => Err(ErrorResponse::conflict(
                    "User creation failed: googleId must be unique.",
                )),
                Err(e) => Err(ErrorResponse::from_error(&e)),
            }
        }
        Err(e) => Err(ErrorResponse::from_error(&e)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn username_is_the_email_local_part() {
        assert_eq!(derive_username("jane.doe@gmail.com"), "jane.doe");
        assert_eq!(derive_username("x@y.z"), "x");
        // degenerate input still yields a string rather than a panic
        assert_eq!(derive_username("@nodomain"), "");
    }
}
