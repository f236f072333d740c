use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::services::{payment_signature, qr};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected gateway response: {0}")]
    BadResponse(String),
}

/// Everything the kiosk needs to collect a payment: the link to open, the
/// gateway's reference for correlating webhooks/polls, and a QR image.
#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub url: String,
    pub link_id: String,
    pub qr_png_base64: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentLinkStatus {
    Created,
    Paid,
    Cancelled,
    Expired,
}

impl PaymentLinkStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentLinkStatus::Paid)
    }
}

impl From<&str> for PaymentLinkStatus {
    fn from(s: &str) -> Self {
        match s {
            "paid" => PaymentLinkStatus::Paid,
            "cancelled" => PaymentLinkStatus::Cancelled,
            "expired" => PaymentLinkStatus::Expired,
            _ => PaymentLinkStatus::Created,
        }
    }
}

/// Payment gateway boundary. A live implementation talks to the real
/// gateway; the mock keeps the whole pipeline exercisable with no
/// credentials configured.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Live gateways enforce webhook signatures; a mock does not.
    fn is_live(&self) -> bool;

    async fn create_payment_link(
        &self,
        amount: f64,
        description: &str,
        reference: &str,
    ) -> Result<PaymentLink, GatewayError>;

    async fn fetch_link_status(&self, link_id: &str) -> Result<PaymentLinkStatus, GatewayError>;

    fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool;
}

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Razorpay payment-links adapter.
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkEntity {
    id: String,
    short_url: String,
    status: String,
}

impl RazorpayGateway {
    pub fn new(
        key_id: String,
        key_secret: String,
        webhook_secret: String,
        currency: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            key_id,
            key_secret,
            webhook_secret,
            currency,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn is_live(&self) -> bool {
        true
    }

    async fn create_payment_link(
        &self,
        amount: f64,
        description: &str,
        reference: &str,
    ) -> Result<PaymentLink, GatewayError> {
        // The gateway counts in the currency's smallest unit.
        let amount_paise = (amount * 100.0).round() as i64;

        let body = json!({
            "amount": amount_paise,
            "currency": self.currency,
            "accept_partial": false,
            "description": description,
            "reference_id": reference,
            "notify": { "sms": false, "email": false },
            "reminder_enable": false,
        });

        let response = self
            .client
            .post(format!("{}/payment_links", RAZORPAY_API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::BadResponse(format!(
                "payment link creation returned HTTP {}",
                response.status()
            )));
        }

        let entity: PaymentLinkEntity = response
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;

        let qr_png_base64 = qr::png_base64(&entity.short_url)
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;

        tracing::info!(
            "Payment link created: id={}, reference={}",
            entity.id,
            reference
        );

        Ok(PaymentLink {
            url: entity.short_url,
            link_id: entity.id,
            qr_png_base64,
        })
    }

    async fn fetch_link_status(&self, link_id: &str) -> Result<PaymentLinkStatus, GatewayError> {
        let response = self
            .client
            .get(format!("{}/payment_links/{}", RAZORPAY_API_BASE, link_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::BadResponse(format!(
                "payment link fetch returned HTTP {}",
                response.status()
            )));
        }

        let entity: PaymentLinkEntity = response
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;

        Ok(PaymentLinkStatus::from(entity.status.as_str()))
    }

    fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        payment_signature::verify_signature(raw_body, signature, &self.webhook_secret)
    }
}

/// Deterministic stand-in used when no gateway credentials are configured.
/// Produces a locally-resolvable fake link so the pipeline stays
/// exercisable end to end.
pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    fn is_live(&self) -> bool {
        false
    }

    async fn create_payment_link(
        &self,
        amount: f64,
        _description: &str,
        reference: &str,
    ) -> Result<PaymentLink, GatewayError> {
        let link_id = format!("plink_mock_{}", reference);
        let url = format!(
            "http://localhost/mock-pay?ref={}&amount={:.2}",
            reference, amount
        );

        let qr_png_base64 =
            qr::png_base64(&url).map_err(|e| GatewayError::BadResponse(e.to_string()))?;

        tracing::info!("Created MOCK payment link {} for {:.2}", link_id, amount);

        Ok(PaymentLink {
            url,
            link_id,
            qr_png_base64,
        })
    }

    async fn fetch_link_status(&self, _link_id: &str) -> Result<PaymentLinkStatus, GatewayError> {
        // The mock never auto-approves; payment is confirmed by posting a
        // (unsigned) webhook event to the local endpoint.
        Ok(PaymentLinkStatus::Created)
    }

    fn verify_signature(&self, _raw_body: &[u8], _signature: &str) -> bool {
        true
    }
}
