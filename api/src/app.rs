//! Application state and factory
//!
//! This module holds the shared state handed to every handler and builds
//! the actix-web `App` with middleware and routes wired up.

use std::sync::Arc;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use otp_core::OtpService;
use otp_infra::InfrastructureServices;
use otp_shared::{error_codes, ErrorResponse};

use crate::handlers::error::json_error_handler;
use crate::middleware::cors::create_cors;
use crate::routes;

/// Application state that holds shared services
pub struct AppState {
    pub otp_service: Arc<OtpService>,
    /// Backing infrastructure; `None` when the service was assembled by hand
    pub infrastructure: Option<InfrastructureServices>,
    /// Maximum accepted JSON body size in bytes
    pub max_payload_size: usize,
}

impl AppState {
    pub fn new(otp_service: Arc<OtpService>) -> Self {
        Self {
            otp_service,
            infrastructure: None,
            max_payload_size: 16 * 1024,
        }
    }

    pub fn with_infrastructure(mut self, infrastructure: InfrastructureServices) -> Self {
        self.infrastructure = Some(infrastructure);
        self
    }

    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(app_state.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Last wrap runs first, so the request span covers CORS rejections
        .wrap(create_cors())
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(web::scope("/api/v1").configure(routes::configure))
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_ok = match &state.infrastructure {
        Some(infrastructure) => match infrastructure.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!(event = "health_check_failed", error = %e, "Store health check failed");
                false
            }
        },
        None => true,
    };

    let body = serde_json::json!({
        "status": if store_ok { "healthy" } else { "degraded" },
        "service": "otp-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if store_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
