use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

use crate::services::pdf;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported file type: .{0}")]
    UnsupportedFormat(String),

    #[error("conversion failed: {0}")]
    ConversionFailed(String),
}

/// Turns an arbitrary uploaded document into a page-addressable PDF.
///
/// PDFs pass through untouched, raster images are wrapped losslessly, and
/// office documents go through a headless LibreOffice invocation. Either a
/// complete PDF exists at the returned path or the call fails; there is no
/// partial success.
#[derive(Clone, Default)]
pub struct DocumentConverter;

impl DocumentConverter {
    pub fn new() -> Self {
        Self
    }

    pub async fn convert(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "pdf" => Ok(input.to_path_buf()),
            "jpg" | "jpeg" => {
                let src = input.to_path_buf();
                let dest = input.with_extension("pdf");
                run_blocking(move || pdf::wrap_jpeg(&src, &dest).map(|_| dest)).await
            }
            "png" => {
                let src = input.to_path_buf();
                let dest = input.with_extension("pdf");
                run_blocking(move || pdf::wrap_png(&src, &dest).map(|_| dest)).await
            }
            "doc" | "docx" | "txt" => self.convert_office(input).await,
            _ => Err(ConvertError::UnsupportedFormat(ext)),
        }
    }

    async fn convert_office(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        let outdir = input.parent().unwrap_or_else(|| Path::new("."));
        let output = input.with_extension("pdf");

        tracing::debug!("Converting {} via libreoffice", input.display());

        let result = Command::new("libreoffice")
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(outdir)
            .arg(input)
            .output()
            .await
            .map_err(|e| {
                ConvertError::ConversionFailed(format!("failed to launch libreoffice: {}", e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConvertError::ConversionFailed(format!(
                "libreoffice exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        // Exit code zero alone is not proof; the output file must exist.
        if !output.exists() {
            return Err(ConvertError::ConversionFailed(format!(
                "expected output {} was not produced",
                output.display()
            )));
        }

        Ok(output)
    }
}

async fn run_blocking<F>(work: F) -> Result<PathBuf, ConvertError>
where
    F: FnOnce() -> Result<PathBuf, pdf::PdfError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ConvertError::ConversionFailed(e.to_string()))?
        .map_err(|e| ConvertError::ConversionFailed(e.to_string()))
}
