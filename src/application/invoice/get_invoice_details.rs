use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{Currency, Invoice, InvoiceError, InvoiceService, InvoiceTotals};

#[derive(Debug, Deserialize)]
pub struct GetInvoiceDetailsCommand {
  pub invoice_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLineItemDto {
  pub line_order: i32,
  pub description: String,
  pub quantity: u32,
  pub unit_price: Decimal,
  pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTotalsDto {
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub total: Decimal,
  pub currency: String,
}

impl InvoiceTotalsDto {
  pub fn new(totals: &InvoiceTotals, currency: Currency) -> Self {
    Self {
      subtotal: totals.subtotal,
      tax_amount: totals.tax_amount,
      total: totals.total,
      currency: currency.as_str().to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetailsDto {
  pub name: String,
  pub email: Option<String>,
  pub address_lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetailsResponse {
  pub id: Uuid,
  pub invoice_number: String,
  pub client: ClientDetailsDto,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub currency: String,
  pub currency_symbol: String,
  pub tax_rate: Decimal,
  pub status: String,
  pub notes: Option<String>,
  pub line_items: Vec<InvoiceLineItemDto>,
  pub totals: InvoiceTotalsDto,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl InvoiceDetailsResponse {
  pub fn from_invoice(invoice: &Invoice, totals: &InvoiceTotals) -> Result<Self, InvoiceError> {
    let line_items = invoice
      .line_items
      .iter()
      .enumerate()
      .map(|(i, item)| {
        let line_order = i32::try_from(i + 1)
          .map_err(|_| InvoiceError::Internal("Too many line items".to_string()))?;
        Ok(InvoiceLineItemDto {
          line_order,
          description: item.description.value().to_string(),
          quantity: item.quantity.value(),
          unit_price: item.unit_price.value(),
          amount: item.amount()?,
        })
      })
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    Ok(Self {
      id: invoice.id,
      invoice_number: invoice.invoice_number.to_string(),
      client: ClientDetailsDto {
        name: invoice.client.name.value().to_string(),
        email: invoice.client.email.clone(),
        address_lines: invoice
          .client
          .address_lines()
          .into_iter()
          .map(str::to_string)
          .collect(),
      },
      issue_date: invoice.issue_date,
      due_date: invoice.due_date,
      currency: invoice.currency.as_str().to_string(),
      currency_symbol: invoice.currency.symbol().to_string(),
      tax_rate: invoice.tax_rate.value(),
      status: invoice.status.as_str().to_string(),
      notes: invoice.notes.clone(),
      line_items,
      totals: InvoiceTotalsDto::new(totals, invoice.currency),
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    })
  }
}

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: GetInvoiceDetailsCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let (invoice, totals) = self
      .invoice_service
      .get_invoice_with_totals(command.invoice_id)
      .await?;

    InvoiceDetailsResponse::from_invoice(&invoice, &totals)
  }
}
