use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub upload_dir: String,
    pub printer_name: String,
    pub mock_printing: bool,
    pub price_per_page: f64,
    pub currency: String,
    pub gateway_key_id: String,
    pub gateway_key_secret: String,
    pub gateway_webhook_secret: String,
    pub worker_poll_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://printkiosk.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let printer_name =
            env::var("PRINTER_NAME").unwrap_or_else(|_| "Canon_LBP122dw".to_string());

        let mock_printing = env::var("MOCK_PRINTING")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let price_per_page = env::var("PRICE_PER_PAGE")
            .unwrap_or_else(|_| "5.0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPrice)?;

        let currency = env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string());

        // Empty gateway credentials put the payment service in mock mode.
        let gateway_key_id = env::var("RAZORPAY_KEY_ID").unwrap_or_default();
        let gateway_key_secret = env::var("RAZORPAY_KEY_SECRET").unwrap_or_default();
        let gateway_webhook_secret = env::var("RAZORPAY_WEBHOOK_SECRET").unwrap_or_default();

        let worker_poll_secs = env::var("WORKER_POLL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            upload_dir,
            printer_name,
            mock_printing,
            price_per_page,
            currency,
            gateway_key_id,
            gateway_key_secret,
            gateway_webhook_secret,
            worker_poll_secs,
        })
    }

    pub fn gateway_configured(&self) -> bool {
        !self.gateway_key_id.is_empty() && !self.gateway_key_secret.is_empty()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid PRICE_PER_PAGE value")]
    InvalidPrice,
}
