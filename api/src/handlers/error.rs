//! Translation of domain errors into HTTP responses
//!
//! Every error body is an `otp_shared::ErrorResponse`. Backend failures get
//! an opaque message; the detail only goes to the log.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::header,
    HttpRequest, HttpResponse,
};
use validator::ValidationErrors;

use otp_core::errors::{DomainError, OtpError, StoreError};
use otp_shared::{error_codes, ErrorResponse};

/// Map a domain error to its HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Otp(OtpError::MissingInput { field }) => {
            tracing::debug!(field, "Rejected request with missing input");
            HttpResponse::BadRequest()
                .json(ErrorResponse::new(error_codes::MISSING_INPUT, format!("{} is required", field))
                    .add_detail("field", field))
        }
        DomainError::Validation { message } => {
            tracing::debug!(%message, "Rejected request with invalid input");
            HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::VALIDATION_FAILED, message))
        }
        DomainError::Otp(OtpError::RateLimitExceeded {
            retry_after_seconds,
            limit,
            window_seconds,
        }) => HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
            .json(
                ErrorResponse::new(
                    error_codes::RATE_LIMIT_EXCEEDED,
                    format!(
                        "Too many codes requested. Please try again in {} seconds",
                        retry_after_seconds
                    ),
                )
                .add_detail("retry_after", retry_after_seconds)
                .add_detail("limit", limit)
                .add_detail("window_seconds", window_seconds),
            ),
        DomainError::Otp(OtpError::NotificationFailed { reason }) => {
            tracing::error!(error = %reason, "Passcode delivery failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::DELIVERY_FAILED,
                "The passcode could not be delivered. Please try again later",
            ))
        }
        DomainError::Store(store_error) => {
            match &store_error {
                StoreError::Corrupt { .. } => tracing::error!(error = %store_error, "Corrupt row in store"),
                _ => tracing::error!(error = %store_error, "Row store failure"),
            }
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "The service is temporarily unavailable. Please try again later",
            ))
        }
        DomainError::Internal { message } => {
            tracing::error!(%message, "Internal error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}

/// Map request validation failures to a 400 listing the offending fields
pub fn handle_validation_errors(errors: ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_FAILED, "Request validation failed");
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
        response = response.add_detail(field, codes);
    }
    HttpResponse::BadRequest().json(response)
}

/// `JsonConfig` hook so malformed bodies get the standard error shape
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = match &error {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ErrorResponse::new(
                error_codes::VALIDATION_FAILED,
                "Request body is too large",
            ))
        }
        _ => HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::VALIDATION_FAILED,
            format!("Malformed request body: {}", error),
        )),
    };
    InternalError::from_response(error, response).into()
}
