use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a print job. Only the worker and the payment
/// reconciler advance it, and only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    PaymentPending,
    Paid,
    Processing,
    Printing,
    Completed,
    FailedConversion,
    FailedPrinter,
    Failed,
}

impl JobStatus {
    /// Terminal states admit no further automated transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed
                | JobStatus::FailedConversion
                | JobStatus::FailedPrinter
                | JobStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::PaymentPending => "payment_pending",
            JobStatus::Paid => "paid",
            JobStatus::Processing => "processing",
            JobStatus::Printing => "printing",
            JobStatus::Completed => "completed",
            JobStatus::FailedConversion => "failed_conversion",
            JobStatus::FailedPrinter => "failed_printer",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Convert from string (for SQLx)
impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "payment_pending" => JobStatus::PaymentPending,
            "paid" => JobStatus::Paid,
            "processing" => JobStatus::Processing,
            "printing" => JobStatus::Printing,
            "completed" => JobStatus::Completed,
            "failed_conversion" => JobStatus::FailedConversion,
            "failed_printer" => JobStatus::FailedPrinter,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Uploaded,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub filename: String,
    pub file_path: String,
    pub converted_path: Option<String>,
    pub page_count: i64,
    pub copies: i64,
    pub page_range: String,
    pub duplex: bool,
    pub status: JobStatus,
    pub total_cost: f64,
    pub gateway_link_id: Option<String>,
    pub print_job_id: Option<i64>,
    pub failure_reason: Option<String>,
    pub created_at: String, // RFC3339 string from DB
}

impl Job {
    pub fn new(filename: String, file_path: String, page_count: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename,
            file_path,
            converted_path: None,
            page_count,
            copies: 1,
            page_range: String::new(),
            duplex: false,
            status: JobStatus::Uploaded,
            total_cost: 0.0,
            gateway_link_id: None,
            print_job_id: None,
            failure_reason: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: String,
    pub filename: String,
    pub page_count: i64,
    pub copies: i64,
    pub page_range: String,
    pub duplex: bool,
    pub status: JobStatus,
    pub total_cost: f64,
    pub failure_reason: Option<String>,
    pub created_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            filename: job.filename,
            page_count: job.page_count,
            copies: job.copies,
            page_range: job.page_range,
            duplex: job.duplex,
            status: job.status,
            total_cost: job.total_cost,
            failure_reason: job.failure_reason,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintSettingsRequest {
    pub job_id: String,
    pub copies: i64,
    #[serde(default)]
    pub page_range: String,
    #[serde(default)]
    pub duplex: bool,
}

/// Returned from settings confirmation: everything the kiosk needs to
/// render the payment screen.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSessionResponse {
    pub job_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_url: String,
    pub gateway_link_id: String,
    pub qr_png_base64: String,
}

/// Coarse machine state consumed by the kiosk display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Idle,
    Uploading,
    Printing,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineStatusResponse {
    pub status: String,
    pub state: MachineState,
    pub is_online: bool,
}
