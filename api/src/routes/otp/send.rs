use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::{Channel, DomainError};

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

/// Handler for POST /api/v1/otp/send
///
/// # Request Body
///
/// ```json
/// { "destination": "+61412345678", "channel": "phone" }
/// ```
///
/// # Responses
///
/// - 200 `{ "message": "...", "expires_in": 180 }`
/// - 400 missing or invalid destination or channel
/// - 429 too many codes requested; `Retry-After` is set
/// - 503 delivery or store failure
pub async fn send_code(
    state: web::Data<AppState>,
    request: web::Json<SendCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    // Destination is checked first so an empty body names it
    if request.destination.trim().is_empty() {
        return handle_domain_error(DomainError::missing("destination"));
    }
    if request.channel.trim().is_empty() {
        return handle_domain_error(DomainError::missing("channel"));
    }
    let channel = match request.channel.parse::<Channel>() {
        Ok(channel) => channel,
        Err(e) => return handle_domain_error(e),
    };

    match state
        .otp_service
        .issue_and_send(&request.destination, channel)
        .await
    {
        Ok(receipt) => HttpResponse::Ok().json(SendCodeResponse {
            message: "Verification code sent".to_string(),
            expires_in: receipt.expires_in_seconds,
        }),
        Err(e) => handle_domain_error(e),
    }
}
