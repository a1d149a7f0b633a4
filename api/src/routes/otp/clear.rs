use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::ClearCodeRequest;
use crate::handlers::{handle_domain_error, handle_validation_errors};

/// Handler for POST /api/v1/otp/clear
///
/// Idempotent; answers 204 whether or not a code was outstanding.
pub async fn clear_code(
    state: web::Data<AppState>,
    request: web::Json<ClearCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    match state.otp_service.clear(&request.subject).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => handle_domain_error(e),
    }
}
