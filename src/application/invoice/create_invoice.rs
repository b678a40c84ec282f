use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::get_invoice_details::InvoiceTotalsDto;
use crate::domain::invoice::{
  ClientDetails, ClientName, Currency, InvoiceDraft, InvoiceError, InvoiceService, LineItem,
  LineItemDescription, Quantity, TaxRate, UnitPrice, check_invoice_date,
};

/// Values applied when a request leaves them out.
#[derive(Debug, Clone)]
pub struct InvoiceDefaults {
  pub tax_rate: TaxRate,
  pub payment_days: u32,
  pub currency: Currency,
}

impl Default for InvoiceDefaults {
  fn default() -> Self {
    Self {
      tax_rate: TaxRate::default(),
      payment_days: 14,
      currency: Currency::EUR,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceLineItemDto {
  pub description: String,
  pub quantity: i64,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceCommand {
  pub client_name: String,
  pub client_email: Option<String>,
  pub client_address: Option<String>,
  pub issue_date: Option<NaiveDate>,
  pub payment_days: Option<u32>,
  pub currency: Option<String>,
  pub tax_rate: Option<Decimal>,
  pub notes: Option<String>,
  pub line_items: Vec<CreateInvoiceLineItemDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
  pub invoice_id: Uuid,
  pub invoice_number: String,
  pub totals: InvoiceTotalsDto,
  pub created_at: DateTime<Utc>,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
  defaults: InvoiceDefaults,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, defaults: InvoiceDefaults) -> Self {
    Self {
      invoice_service,
      defaults,
    }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<CreateInvoiceResponse, InvoiceError> {
    let draft = self.build_draft(command)?;

    let (invoice, totals) = self.invoice_service.create_invoice(draft).await?;

    Ok(CreateInvoiceResponse {
      invoice_id: invoice.id,
      totals: InvoiceTotalsDto::new(&totals, invoice.currency),
      invoice_number: invoice.invoice_number.into_inner(),
      created_at: invoice.created_at,
    })
  }

  fn build_draft(&self, command: CreateInvoiceCommand) -> Result<InvoiceDraft, InvoiceError> {
    let currency = match command.currency.as_deref() {
      Some(code) => Currency::from_str(code)?,
      None => self.defaults.currency,
    };
    let tax_rate = match command.tax_rate {
      Some(rate) => TaxRate::new(rate)?,
      None => self.defaults.tax_rate,
    };

    let line_items = command
      .line_items
      .into_iter()
      .map(|item| {
        Ok(LineItem::new(
          LineItemDescription::new(item.description)?,
          Quantity::new(item.quantity)?,
          UnitPrice::new(item.unit_price)?,
        ))
      })
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    let client = ClientDetails::new(
      ClientName::new(command.client_name)?,
      command.client_email,
      command.client_address,
    );
    let issue_date = match command.issue_date {
      Some(date) => check_invoice_date(date)?,
      None => Utc::now().date_naive(),
    };

    Ok(InvoiceDraft {
      client,
      issue_date,
      payment_days: command.payment_days.unwrap_or(self.defaults.payment_days),
      currency,
      tax_rate,
      notes: command
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty()),
      line_items,
    })
  }
}
