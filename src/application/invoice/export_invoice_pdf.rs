use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::get_invoice_details::InvoiceDetailsResponse;
use crate::domain::invoice::{InvoiceError, InvoiceService, PdfGenerator};

/// Turns invoice details into a standalone HTML document.
pub trait InvoiceHtmlRenderer: Send + Sync {
  fn render_invoice(&self, invoice: &InvoiceDetailsResponse) -> Result<String, InvoiceError>;
}

#[derive(Debug, Deserialize)]
pub struct ExportInvoicePdfCommand {
  pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ExportInvoicePdfResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub pdf_path: String,
}

pub struct ExportInvoicePdfUseCase {
  invoice_service: Arc<InvoiceService>,
  renderer: Arc<dyn InvoiceHtmlRenderer>,
  pdf_generator: Arc<dyn PdfGenerator>,
}

impl ExportInvoicePdfUseCase {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    renderer: Arc<dyn InvoiceHtmlRenderer>,
    pdf_generator: Arc<dyn PdfGenerator>,
  ) -> Self {
    Self {
      invoice_service,
      renderer,
      pdf_generator,
    }
  }

  /// Renders the invoice as HTML without producing a PDF.
  pub async fn render_html(&self, invoice_id: Uuid) -> Result<String, InvoiceError> {
    let (invoice, totals) = self
      .invoice_service
      .get_invoice_with_totals(invoice_id)
      .await?;
    let details = InvoiceDetailsResponse::from_invoice(&invoice, &totals)?;

    self.renderer.render_invoice(&details)
  }

  pub async fn execute(
    &self,
    command: ExportInvoicePdfCommand,
  ) -> Result<ExportInvoicePdfResponse, InvoiceError> {
    let (invoice, totals) = self
      .invoice_service
      .get_invoice_with_totals(command.invoice_id)
      .await?;
    let details = InvoiceDetailsResponse::from_invoice(&invoice, &totals)?;
    let html = self.renderer.render_invoice(&details)?;

    let pdf_path = self
      .pdf_generator
      .generate_invoice_pdf(&invoice, &html)
      .await?;

    tracing::info!(
      invoice_id = %invoice.id,
      pdf_path = %pdf_path,
      "Invoice PDF exported"
    );

    Ok(ExportInvoicePdfResponse {
      invoice_id: invoice.id,
      invoice_number: invoice.invoice_number.into_inner(),
      pdf_path,
    })
  }
}
