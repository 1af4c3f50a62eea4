use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};

use crate::core::ValidationError;
use crate::models::ErrorResponse;

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl ResponseError for ErrorResponse {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl ResponseError for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ErrorResponse::new("invalid_json", format!("Invalid JSON: {}", err), 400).into()
}

/// JSON extractor config that reports decode failures as `ErrorResponse`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}
