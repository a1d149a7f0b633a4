//! Route registration under `/api/v1`

use actix_web::web;

pub mod otp;

/// Register every versioned route on `cfg`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/otp")
            .route("/send", web::post().to(otp::send::send_code))
            .route("/verify", web::post().to(otp::verify::verify_code))
            .route("/clear", web::post().to(otp::clear::clear_code)),
    );
}
