use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesCommand {
  pub status_filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListItemDto {
  pub id: Uuid,
  pub invoice_number: String,
  pub client_name: String,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub currency: String,
  pub status: String,
  pub total: Decimal,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceListItemDto>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let status_filter = command
      .status_filter
      .as_deref()
      .map(InvoiceStatus::from_str)
      .transpose()?;

    let invoices = self.invoice_service.list_invoices(status_filter).await?;

    let invoice_dtos = invoices
      .into_iter()
      .map(|(i, totals)| InvoiceListItemDto {
        id: i.id,
        invoice_number: i.invoice_number.to_string(),
        client_name: i.client.name.value().to_string(),
        issue_date: i.issue_date,
        due_date: i.due_date,
        currency: i.currency.as_str().to_string(),
        status: i.status.as_str().to_string(),
        total: totals.total,
        created_at: i.created_at,
      })
      .collect();

    Ok(ListInvoicesResponse {
      invoices: invoice_dtos,
    })
  }
}
