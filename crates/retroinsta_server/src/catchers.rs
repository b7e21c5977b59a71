use retroinsta_common::errors::RetroInstaError;
use retroinsta_common::http::responses::ErrorBody;
use rocket::request::Request;
use rocket::serde::json::Json;

/// Maps the error taxonomy onto status codes, always with a JSON body
#[derive(Responder)]
pub enum ErrorResponse {
    #[response(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[response(status = 401)]
    Unauthorized(Json<ErrorBody>),
    #[response(status = 404)]
    NotFound(Json<ErrorBody>),
    #[response(status = 409)]
    Conflict(Json<ErrorBody>),
    #[response(status = 413)]
    TooLarge(Json<ErrorBody>),
    #[response(status = 500)]
    InternalError(Json<ErrorBody>),
}

fn body(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
    })
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ErrorResponse::BadRequest(body(message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ErrorResponse::Unauthorized(body(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ErrorResponse::NotFound(body(message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ErrorResponse::Conflict(body(message))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ErrorResponse::InternalError(body(message))
    }

    /// Default translation for errors bubbling out of the store and
    /// verifier layers
    pub fn from_error(e: &RetroInstaError) -> Self {
        match e {
            RetroInstaError::InvalidObjectId(_) | RetroInstaError::MissingIdToken => {
                ErrorResponse::bad_request(e.to_string())
            }
            RetroInstaError::SelfFollow => ErrorResponse::bad_request(e.to_string()),
            RetroInstaError::InvalidToken(_) | RetroInstaError::MissingClaim(_) => {
                ErrorResponse::unauthorized(e.to_string())
            }
            RetroInstaError::UserNotFound(_) | RetroInstaError::PostNotFound(_) => {
                ErrorResponse::not_found(e.to_string())
            }
            RetroInstaError::UserExists(_) => ErrorResponse::conflict(e.to_string()),
            RetroInstaError::UploadTooLarge => ErrorResponse::TooLarge(body(e.to_string())),
            _ => ErrorResponse::internal_error(e.to_string()),
        }
    }
}

pub struct ErrorMessage(pub Option<String>);

#[catch(400)]
pub fn bad_request(req: &Request) -> ErrorResponse {
    match req.local_cache(|| ErrorMessage(None)) {
        ErrorMessage(Some(msg)) => ErrorResponse::bad_request(msg.to_string()),
        ErrorMessage(None) => ErrorResponse::bad_request("Malformed request"),
    }
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> ErrorResponse {
    match req.local_cache(|| ErrorMessage(None)) {
        ErrorMessage(Some(msg)) => ErrorResponse::unauthorized(msg.to_string()),
        ErrorMessage(None) => ErrorResponse::unauthorized("Unauthorized"),
    }
}

#[catch(404)]
pub fn not_found(req: &Request) -> ErrorResponse {
    match req.local_cache(|| ErrorMessage(None)) {
        ErrorMessage(Some(msg)) => ErrorResponse::not_found(msg.to_string()),
        ErrorMessage(None) => ErrorResponse::not_found("Resource not found"),
    }
}

#[catch(413)]
pub fn payload_too_large(_req: &Request) -> ErrorResponse {
    ErrorResponse::TooLarge(body(RetroInstaError::UploadTooLarge.to_string()))
}

// Rocket reports body deserialization failures as 422; the API contract
// treats them as plain validation errors
#[catch(422)]
pub fn unprocessable_entity(_req: &Request) -> ErrorResponse {
    ErrorResponse::bad_request("Malformed request body")
}
