use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Deserialize)]
pub struct ChangeInvoiceStatusCommand {
  pub invoice_id: Uuid,
  pub new_status: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeInvoiceStatusResponse {
  pub invoice_id: Uuid,
  pub status: String,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MarkOverdueResponse {
  pub invoice_ids: Vec<Uuid>,
}

pub struct ChangeInvoiceStatusUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ChangeInvoiceStatusUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ChangeInvoiceStatusCommand,
  ) -> Result<ChangeInvoiceStatusResponse, InvoiceError> {
    let new_status = InvoiceStatus::from_str(&command.new_status)?;

    let invoice = self
      .invoice_service
      .change_invoice_status(command.invoice_id, new_status)
      .await?;

    Ok(ChangeInvoiceStatusResponse {
      invoice_id: invoice.id,
      status: invoice.status.as_str().to_string(),
      updated_at: invoice.updated_at,
    })
  }

  /// Moves every sent invoice whose due date lies before `current_date` to overdue.
  pub async fn mark_overdue(
    &self,
    current_date: NaiveDate,
  ) -> Result<MarkOverdueResponse, InvoiceError> {
    let invoices = self
      .invoice_service
      .mark_overdue_invoices(current_date)
      .await?;

    Ok(MarkOverdueResponse {
      invoice_ids: invoices.into_iter().map(|i| i.id).collect(),
    })
  }
}
