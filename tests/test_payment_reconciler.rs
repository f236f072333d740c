mod helpers;

use async_trait::async_trait;
use helpers::test_db::{configure_job, seed_job, setup_test_db};
use printkiosk::models::JobStatus;
use printkiosk::services::payment_gateway::{
    GatewayError, MockGateway, PaymentGateway, PaymentLink, PaymentLinkStatus,
};
use printkiosk::services::reconciler::PaymentReconciler;
use std::sync::Arc;

/// Gateway stub whose poll endpoint reports a settled payment.
struct PaidGateway;

#[async_trait]
impl PaymentGateway for PaidGateway {
    fn is_live(&self) -> bool {
        false
    }

    async fn create_payment_link(
        &self,
        _amount: f64,
        _description: &str,
        _reference: &str,
    ) -> Result<PaymentLink, GatewayError> {
        unimplemented!("not used by these tests")
    }

    async fn fetch_link_status(&self, _link_id: &str) -> Result<PaymentLinkStatus, GatewayError> {
        Ok(PaymentLinkStatus::Paid)
    }

    fn verify_signature(&self, _raw_body: &[u8], _signature: &str) -> bool {
        true
    }
}

/// Gateway stub that is unreachable when polled.
struct DownGateway;

#[async_trait]
impl PaymentGateway for DownGateway {
    fn is_live(&self) -> bool {
        true
    }

    async fn create_payment_link(
        &self,
        _amount: f64,
        _description: &str,
        _reference: &str,
    ) -> Result<PaymentLink, GatewayError> {
        unimplemented!("not used by these tests")
    }

    async fn fetch_link_status(&self, _link_id: &str) -> Result<PaymentLinkStatus, GatewayError> {
        Err(GatewayError::Unavailable("connection refused".to_string()))
    }

    fn verify_signature(&self, _raw_body: &[u8], _signature: &str) -> bool {
        false
    }
}

#[tokio::test]
async fn test_duplicate_confirmation_is_idempotent() {
    let db = Arc::new(setup_test_db().await);
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(MockGateway));

    let job = seed_job(&db, JobStatus::Uploaded, "/tmp/doc.pdf", 3).await;
    configure_job(&db, &job.id, 1, "", false, "plink_test_1").await;

    // First delivery advances the job, the duplicate is a no-op.
    assert!(reconciler.confirm_paid("plink_test_1").await.unwrap());
    assert!(!reconciler.confirm_paid("plink_test_1").await.unwrap());

    let fresh = db.get_job_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, JobStatus::Paid);
}

#[tokio::test]
async fn test_unknown_reference_is_an_error() {
    let db = Arc::new(setup_test_db().await);
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(MockGateway));

    assert!(reconciler.confirm_paid("plink_nope").await.is_err());
}

#[tokio::test]
async fn test_confirmation_after_worker_claim_is_a_noop() {
    let db = Arc::new(setup_test_db().await);
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(MockGateway));

    let job = seed_job(&db, JobStatus::Uploaded, "/tmp/doc.pdf", 3).await;
    configure_job(&db, &job.id, 1, "", false, "plink_test_2").await;

    assert!(reconciler.confirm_paid("plink_test_2").await.unwrap());
    let claimed = db.claim_next_paid_job().await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);

    // A late duplicate webhook must not disturb the in-flight job.
    assert!(!reconciler.confirm_paid("plink_test_2").await.unwrap());
    let fresh = db.get_job_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, JobStatus::Processing);
}

#[tokio::test]
async fn test_poll_path_applies_the_same_transition() {
    let db = Arc::new(setup_test_db().await);
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(PaidGateway));

    let job = seed_job(&db, JobStatus::Uploaded, "/tmp/doc.pdf", 3).await;
    configure_job(&db, &job.id, 1, "", false, "plink_poll_1").await;

    let status = reconciler.check_payment("plink_poll_1").await.unwrap();
    assert_eq!(status, JobStatus::Paid);

    // Polling again is safe and does not regress or double-apply.
    let status = reconciler.check_payment("plink_poll_1").await.unwrap();
    assert_eq!(status, JobStatus::Paid);
}

#[tokio::test]
async fn test_poll_survives_gateway_outage() {
    let db = Arc::new(setup_test_db().await);
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(DownGateway));

    let job = seed_job(&db, JobStatus::Uploaded, "/tmp/doc.pdf", 3).await;
    configure_job(&db, &job.id, 1, "", false, "plink_down_1").await;

    // The user-facing poll reports the unchanged state instead of failing.
    let status = reconciler.check_payment("plink_down_1").await.unwrap();
    assert_eq!(status, JobStatus::PaymentPending);
}
