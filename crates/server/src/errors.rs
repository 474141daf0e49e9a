use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Request body is missing something or names an unknown value.
    BadRequest(String),
    Deck(deck_core::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "{msg}"),
            ApiError::Deck(deck_core::Error::ConfigError(_)) => {
                write!(f, "Server is not configured for generation (GEMINI_API_KEY missing)")
            }
            ApiError::Deck(e) => write!(f, "{e}"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        use deck_core::Error;
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Deck(Error::InvalidDeck(_) | Error::UnknownTheme(_)) => StatusCode::BAD_REQUEST,
            ApiError::Deck(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("rejected request: {self}");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: &self.to_string(),
        })
    }
}

impl From<deck_core::Error> for ApiError {
    fn from(e: deck_core::Error) -> Self {
        ApiError::Deck(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Error;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(Error::UnknownTheme("neon".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::GenerationFailed("503".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(Error::MalformedResponse("no json".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_key_message() {
        let e = ApiError::from(Error::ConfigError("GEMINI_API_KEY is not set".into()));
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }
}
