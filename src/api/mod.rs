pub mod middleware;
pub mod payments;
pub mod router;
pub mod settings;
pub mod status;
pub mod upload;

pub use middleware::*;

use std::path::PathBuf;
use std::sync::Arc;

use crate::database::Database;
use crate::services::payment_gateway::PaymentGateway;
use crate::services::printer::PrintSubsystem;
use crate::services::pricing::PricingService;
use crate::services::reconciler::PaymentReconciler;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub print_system: Arc<dyn PrintSubsystem>,
    pub reconciler: PaymentReconciler,
    pub pricing: PricingService,
    pub upload_dir: PathBuf,
    pub currency: String,
}
