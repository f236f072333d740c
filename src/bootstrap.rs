use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::AppState;
use crate::config::Config;
use crate::database::Database;
use crate::services::converter::DocumentConverter;
use crate::services::payment_gateway::{MockGateway, PaymentGateway, RazorpayGateway};
use crate::services::pricing::PricingService;
use crate::services::printer::{LpPrintSystem, MockPrintSystem, PrintSubmitter, PrintSubsystem};
use crate::services::reconciler::PaymentReconciler;
use crate::workers::JobWorker;

pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.upload_dir)?;

    let db = Arc::new(db);

    // The pricing store must always answer; seed it from config if empty.
    db.seed_default_pricing(config.price_per_page).await?;

    let gateway: Arc<dyn PaymentGateway> = if config.gateway_configured() {
        tracing::info!("Payment gateway configured, running in live mode");
        Arc::new(RazorpayGateway::new(
            config.gateway_key_id.clone(),
            config.gateway_key_secret.clone(),
            config.gateway_webhook_secret.clone(),
            config.currency.clone(),
        ))
    } else {
        tracing::warn!("Gateway credentials missing, payment service running in MOCK mode");
        Arc::new(MockGateway)
    };

    let print_system: Arc<dyn PrintSubsystem> = if config.mock_printing {
        tracing::warn!("MOCK_PRINTING enabled, submissions will not reach a physical printer");
        Arc::new(MockPrintSystem::new())
    } else {
        Arc::new(LpPrintSystem)
    };

    let reconciler = PaymentReconciler::new(db.clone(), gateway.clone());
    let pricing = PricingService::new(db.clone(), config.price_per_page);

    Ok(AppState {
        db,
        gateway,
        print_system,
        reconciler,
        pricing,
        upload_dir: PathBuf::from(&config.upload_dir),
        currency: config.currency.clone(),
    })
}

/// Spawn the single background worker that drives paid jobs through
/// conversion and printing, independent of request handling.
pub fn start_worker(state: &AppState, config: &Config) {
    let worker = JobWorker::new(
        state.db.clone(),
        DocumentConverter::new(),
        PrintSubmitter::new(state.print_system.clone(), config.printer_name.clone()),
        Duration::from_secs(config.worker_poll_secs),
    );

    tokio::spawn(worker.run());
    tracing::info!("Job worker started");
}
