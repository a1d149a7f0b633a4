use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

/// Handler for POST /api/v1/otp/verify
///
/// Wrong, expired, locked out and unknown codes all answer
/// `{ "verified": false }` with status 200.
pub async fn verify_code(
    state: web::Data<AppState>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    match state.otp_service.verify(&request.subject, &request.code).await {
        Ok(verified) => HttpResponse::Ok().json(VerifyCodeResponse { verified }),
        Err(e) => handle_domain_error(e),
    }
}
