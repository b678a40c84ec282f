use async_trait::async_trait;
use uuid::Uuid;

use super::entities::Invoice;
use super::errors::InvoiceError;
use super::value_objects::{InvoiceNumber, InvoiceStatus};

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Inserts the invoice and its line items atomically. A taken invoice number
  /// is reported as `InvoiceError::InvoiceNumberAlreadyExists`.
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;
  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;
  async fn find_all(&self) -> Result<Vec<Invoice>, InvoiceError>;
  async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError>;
}

/// Existing-number lookup consulted before a candidate number is handed out.
#[async_trait]
pub trait InvoiceNumberLookup: Send + Sync {
  async fn exists_by_number(&self, number: &InvoiceNumber) -> Result<bool, InvoiceError>;
}

/// Storage-owned counter, incremented atomically per prefix and year.
#[async_trait]
pub trait InvoiceNumberSequence: Send + Sync {
  async fn next_value(&self, prefix: &str, year: i32) -> Result<i64, InvoiceError>;
}

#[async_trait]
pub trait PdfGenerator: Send + Sync {
  /// Converts rendered invoice HTML to a PDF and returns the file path.
  async fn generate_invoice_pdf(&self, invoice: &Invoice, html: &str)
  -> Result<String, InvoiceError>;
}
