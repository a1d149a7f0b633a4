use std::sync::Arc;

use actix_web::{web, HttpServer};

use otp_api::{create_app, telemetry, AppState};
use otp_core::{OtpService, OtpServiceConfig, StaticPolicy};
use otp_shared::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration file, falling back to environment: {}", e);
            AppConfig::from_env()
        }
    };
    telemetry::init_tracing(&config.logging);

    tracing::info!(environment = %config.environment, "Starting passcode API server");

    let infrastructure = otp_infra::initialize(&config.cache)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let policy = StaticPolicy::from_config(&config.policy, config.environment);
    if !policy.is_empty() {
        tracing::warn!("Passcode carve-outs are active for this environment");
    }

    let otp_service = Arc::new(OtpService::new(
        infrastructure.store.clone(),
        infrastructure.notifier.clone(),
        Arc::new(policy),
        OtpServiceConfig::from(&config.otp),
    ));

    let state = web::Data::new(
        AppState::new(otp_service)
            .with_infrastructure(infrastructure)
            .with_max_payload_size(config.server.max_payload_size),
    );

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server binding");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await
}
