use thiserror::Error;
use uuid::Uuid;

use super::value_objects::{InvoiceStatus, ValidationError};

/// Raised when no unused invoice number could be assigned within the retry budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error("Could not assign a unique invoice number after {attempts} attempts")]
  Exhausted { attempts: u32 },
}

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValidationError),

  #[error("Invoice number generation failed: {0}")]
  Generation(#[from] GenerationError),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Invoice number '{0}' already exists")]
  InvoiceNumberAlreadyExists(String),

  #[error("Invalid status transition from {from} to {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("PDF generation failed: {0}")]
  PdfGenerationFailed(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
