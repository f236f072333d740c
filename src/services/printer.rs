use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::process::Command;

use crate::services::{page_range, pdf};

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("no printers available")]
    NoPrinterAvailable,

    #[error("page selection resolves to no pages")]
    EmptyPageSelection,

    #[error("print submission failed: {0}")]
    SubmissionFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplexMode {
    OneSided,
    TwoSidedLongEdge,
}

impl DuplexMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplexMode::OneSided => "one-sided",
            DuplexMode::TwoSidedLongEdge => "two-sided-long-edge",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub copies: u32,
    pub media: String,
    pub duplex: DuplexMode,
}

/// Boundary to the physical print subsystem. `print_file` returning
/// `Ok(None)` means the subsystem accepted the call but produced no job
/// id, which callers must treat as failure.
#[async_trait]
pub trait PrintSubsystem: Send + Sync {
    async fn list_printers(&self) -> Result<Vec<String>, PrintError>;

    async fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> Result<Option<i64>, PrintError>;
}

/// CUPS via its command-line tools: `lpstat -e` to enumerate destinations
/// and `lp` to submit.
pub struct LpPrintSystem;

#[async_trait]
impl PrintSubsystem for LpPrintSystem {
    async fn list_printers(&self) -> Result<Vec<String>, PrintError> {
        let out = Command::new("lpstat")
            .arg("-e")
            .output()
            .await
            .map_err(|e| PrintError::SubmissionFailed(format!("failed to run lpstat: {}", e)))?;

        // lpstat exits non-zero when no destinations are configured.
        if !out.status.success() {
            return Ok(Vec::new());
        }

        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    async fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> Result<Option<i64>, PrintError> {
        let out = Command::new("lp")
            .arg("-d")
            .arg(printer)
            .arg("-n")
            .arg(options.copies.to_string())
            .arg("-t")
            .arg(title)
            .arg("-o")
            .arg(format!("media={}", options.media))
            .arg("-o")
            .arg(format!("sides={}", options.duplex.as_str()))
            .arg(path)
            .output()
            .await
            .map_err(|e| PrintError::SubmissionFailed(format!("failed to run lp: {}", e)))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(PrintError::SubmissionFailed(format!(
                "lp exited with {}: {}",
                out.status,
                stderr.trim()
            )));
        }

        Ok(parse_lp_job_id(&String::from_utf8_lossy(&out.stdout)))
    }
}

/// Record of one submission accepted by [`MockPrintSystem`].
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub printer: String,
    pub path: PathBuf,
    pub title: String,
    pub copies: u32,
    pub sides: String,
}

/// In-memory stand-in used when printing is disabled and in tests. It
/// records every submission and hands out sequential job ids.
pub struct MockPrintSystem {
    printers: Vec<String>,
    fail_submission: bool,
    next_id: AtomicI64,
    submissions: Mutex<Vec<SubmittedJob>>,
}

impl MockPrintSystem {
    pub fn new() -> Self {
        Self::with_printers(vec!["kiosk-mock".to_string()])
    }

    pub fn with_printers(printers: Vec<String>) -> Self {
        Self {
            printers,
            fail_submission: false,
            next_id: AtomicI64::new(1),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// A system that accepts the call but never yields a job id.
    pub fn failing() -> Self {
        Self {
            fail_submission: true,
            ..Self::new()
        }
    }

    pub fn submissions(&self) -> Vec<SubmittedJob> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Default for MockPrintSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrintSubsystem for MockPrintSystem {
    async fn list_printers(&self) -> Result<Vec<String>, PrintError> {
        Ok(self.printers.clone())
    }

    async fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> Result<Option<i64>, PrintError> {
        self.submissions.lock().unwrap().push(SubmittedJob {
            printer: printer.to_string(),
            path: path.to_path_buf(),
            title: title.to_string(),
            copies: options.copies,
            sides: options.duplex.as_str().to_string(),
        });

        if self.fail_submission {
            return Ok(None);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing::info!("[MOCK PRINT] {} -> {} (job id {})", path.display(), printer, id);
        Ok(Some(id))
    }
}

/// Slices a PDF down to the resolved page set and hands the result to the
/// physical print subsystem with the job's copy count and duplex mode.
#[derive(Clone)]
pub struct PrintSubmitter {
    subsystem: Arc<dyn PrintSubsystem>,
    printer_name: String,
}

impl PrintSubmitter {
    pub fn new(subsystem: Arc<dyn PrintSubsystem>, printer_name: String) -> Self {
        Self {
            subsystem,
            printer_name,
        }
    }

    pub async fn submit(
        &self,
        pdf_path: &Path,
        job_id: &str,
        copies: i64,
        duplex: bool,
        page_range_spec: &str,
    ) -> Result<i64, PrintError> {
        let total = {
            let path = pdf_path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf::page_count(&path))
                .await
                .map_err(|e| PrintError::SubmissionFailed(e.to_string()))?
                .map_err(|e| PrintError::SubmissionFailed(e.to_string()))?
        };

        let resolved = page_range::resolve(page_range_spec, total);
        if resolved.is_empty() {
            return Err(PrintError::EmptyPageSelection);
        }

        // Printing every page needs no rewrite; otherwise derive a sliced
        // copy beside the original and print that. The derived file is
        // left for housekeeping to clean up.
        let to_print = if page_range::is_full_selection(&resolved, total) {
            pdf_path.to_path_buf()
        } else {
            let src = pdf_path.to_path_buf();
            let dest = pdf_path.with_extension("pages.pdf");
            let out = dest.clone();
            tokio::task::spawn_blocking(move || pdf::extract_pages(&src, &out, &resolved))
                .await
                .map_err(|e| PrintError::SubmissionFailed(e.to_string()))?
                .map_err(|e| PrintError::SubmissionFailed(e.to_string()))?;
            dest
        };

        let options = PrintOptions {
            copies: copies.max(1) as u32,
            media: "iso_a4_210x297mm".to_string(),
            duplex: if duplex {
                DuplexMode::TwoSidedLongEdge
            } else {
                DuplexMode::OneSided
            },
        };

        let printers = self.subsystem.list_printers().await?;
        if printers.is_empty() {
            return Err(PrintError::NoPrinterAvailable);
        }

        let target = if printers.iter().any(|p| p == &self.printer_name) {
            self.printer_name.clone()
        } else {
            let fallback = printers[0].clone();
            tracing::warn!(
                "Printer {} not registered, falling back to {}",
                self.printer_name,
                fallback
            );
            fallback
        };

        let title = format!("kiosk-job-{}", job_id);
        let submitted = self
            .subsystem
            .print_file(&target, &to_print, &title, &options)
            .await?;

        submitted.ok_or_else(|| {
            PrintError::SubmissionFailed("print subsystem returned no job id".to_string())
        })
    }
}

fn parse_lp_job_id(stdout: &str) -> Option<i64> {
    // lp reports: "request id is Office_Printer-42 (1 file(s))"
    let rest = stdout.split("request id is").nth(1)?;
    let token = rest.split_whitespace().next()?;
    token.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lp_job_id() {
        assert_eq!(
            parse_lp_job_id("request id is Office_Printer-42 (1 file(s))\n"),
            Some(42)
        );
        assert_eq!(parse_lp_job_id("request id is a-b-17 (1 file(s))"), Some(17));
        assert_eq!(parse_lp_job_id("lp: unexpected output"), None);
        assert_eq!(parse_lp_job_id(""), None);
    }
}
