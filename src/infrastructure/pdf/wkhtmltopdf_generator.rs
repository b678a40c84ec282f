use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::PdfGenerator;
use crate::domain::invoice::{Invoice, InvoiceNumber};

/// Renders invoice HTML to PDF with the `wkhtmltopdf` binary.
///
/// The HTML is streamed over stdin, so no HTTP round-trip to this server is
/// needed. Files land in `output_dir` named after the invoice number.
pub struct WkHtmlToPdfGenerator {
  output_dir: PathBuf,
  wkhtmltopdf_path: String,
}

impl WkHtmlToPdfGenerator {
  pub fn new(output_dir: PathBuf, wkhtmltopdf_path: Option<String>) -> Self {
    Self {
      output_dir,
      wkhtmltopdf_path: wkhtmltopdf_path.unwrap_or_else(|| "wkhtmltopdf".to_string()),
    }
  }

  fn output_path(&self, invoice_number: &InvoiceNumber) -> PathBuf {
    // Invoice numbers may contain '/', which must not create subdirectories
    let file_stem = invoice_number.value().replace('/', "_");
    self.output_dir.join(format!("{}.pdf", file_stem))
  }

  async fn run(&self, html: &str, output_path: &Path) -> Result<(), InvoiceError> {
    let mut child = Command::new(&self.wkhtmltopdf_path)
      .args([
        "--page-size",
        "A4",
        "--margin-top",
        "10mm",
        "--margin-bottom",
        "10mm",
        "--margin-left",
        "10mm",
        "--margin-right",
        "10mm",
        "--encoding",
        "utf-8",
        "--quiet",
        "-",
      ])
      .arg(output_path)
      .stdin(Stdio::piped())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| {
        InvoiceError::PdfGenerationFailed(format!(
          "Could not start {}: {}",
          self.wkhtmltopdf_path, e
        ))
      })?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
      InvoiceError::PdfGenerationFailed("wkhtmltopdf stdin unavailable".to_string())
    })?;
    let write_html = async move {
      let written = stdin.write_all(html.as_bytes()).await;
      // Closing stdin signals end of input
      drop(stdin);
      written
    };

    // stderr is drained while the HTML is written, so a chatty converter cannot
    // block on a full pipe while we block on its stdin
    let (written, output) = tokio::join!(write_html, child.wait_with_output());
    let output = output
      .map_err(|e| InvoiceError::PdfGenerationFailed(format!("wkhtmltopdf failed: {}", e)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(InvoiceError::PdfGenerationFailed(format!(
        "wkhtmltopdf exited with {}: {}",
        output.status,
        stderr.trim()
      )));
    }
    written
      .map_err(|e| InvoiceError::PdfGenerationFailed(format!("Writing HTML failed: {}", e)))?;

    Ok(())
  }
}

#[async_trait]
impl PdfGenerator for WkHtmlToPdfGenerator {
  async fn generate_invoice_pdf(
    &self,
    invoice: &Invoice,
    html: &str,
  ) -> Result<String, InvoiceError> {
    tokio::fs::create_dir_all(&self.output_dir)
      .await
      .map_err(|e| {
        InvoiceError::PdfGenerationFailed(format!(
          "Cannot create {}: {}",
          self.output_dir.display(),
          e
        ))
      })?;

    let output_path = self.output_path(&invoice.invoice_number);
    tracing::info!(
      invoice_number = %invoice.invoice_number,
      path = %output_path.display(),
      "Generating invoice PDF"
    );

    self.run(html, &output_path).await?;

    if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
      return Err(InvoiceError::PdfGenerationFailed(
        "PDF file was not created".to_string(),
      ));
    }

    Ok(output_path.to_string_lossy().to_string())
  }
}
