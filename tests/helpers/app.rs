use printkiosk::api::AppState;
use printkiosk::database::Database;
use printkiosk::services::payment_gateway::PaymentGateway;
use printkiosk::services::pricing::PricingService;
use printkiosk::services::printer::MockPrintSystem;
use printkiosk::services::reconciler::PaymentReconciler;
use std::sync::Arc;

/// Application state wired against a mock print system and the given
/// gateway, with a fresh scratch upload directory.
pub fn build_state(
    db: Arc<Database>,
    gateway: Arc<dyn PaymentGateway>,
) -> (AppState, Arc<MockPrintSystem>) {
    let print_system = Arc::new(MockPrintSystem::new());

    let state = AppState {
        db: db.clone(),
        gateway: gateway.clone(),
        print_system: print_system.clone(),
        reconciler: PaymentReconciler::new(db.clone(), gateway),
        pricing: PricingService::new(db, 5.0),
        upload_dir: super::test_db::scratch_dir(),
        currency: "INR".to_string(),
    };

    (state, print_system)
}
