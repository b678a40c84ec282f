use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceError;
use super::totals::{InvoiceTotals, compute_totals};
use super::value_objects::{
  ClientDetails, Currency, InvoiceNumber, InvoiceStatus, LineItemDescription, Quantity, TaxRate,
  UnitPrice, ValidationError, check_invoice_date,
};

// Line Item - owned by its invoice, never persisted on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: UnitPrice,
}

impl LineItem {
  pub fn new(description: LineItemDescription, quantity: Quantity, unit_price: UnitPrice) -> Self {
    Self {
      description,
      quantity,
      unit_price,
    }
  }

  /// `quantity * unit_price`, exact.
  pub fn amount(&self) -> Result<Decimal, ValidationError> {
    self
      .unit_price
      .value()
      .checked_mul(self.quantity.as_decimal())
      .ok_or(ValidationError::AmountOverflow)
  }
}

// Invoice - aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub invoice_number: InvoiceNumber,
  pub client: ClientDetails,
  pub issue_date: NaiveDate,
  pub due_date: NaiveDate,
  pub currency: Currency,
  pub tax_rate: TaxRate,
  pub status: InvoiceStatus,
  pub notes: Option<String>,
  pub line_items: Vec<LineItem>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Everything needed to create an invoice except its number.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
  pub client: ClientDetails,
  pub issue_date: NaiveDate,
  pub payment_days: u32,
  pub currency: Currency,
  pub tax_rate: TaxRate,
  pub notes: Option<String>,
  pub line_items: Vec<LineItem>,
}

impl InvoiceDraft {
  /// Issue date plus payment days. Both dates must fall in a four-digit year.
  pub fn due_date(&self) -> Result<NaiveDate, ValidationError> {
    let issue_date = check_invoice_date(self.issue_date)?;
    let due_date = issue_date
      .checked_add_days(Days::new(u64::from(self.payment_days)))
      .ok_or_else(|| {
        ValidationError::InvalidDate(format!(
          "{} plus {} days is out of range",
          issue_date, self.payment_days
        ))
      })?;
    check_invoice_date(due_date)
  }
}

impl Invoice {
  pub fn new(invoice_number: InvoiceNumber, draft: InvoiceDraft) -> Result<Self, ValidationError> {
    let now = Utc::now();
    let due_date = draft.due_date()?;

    Ok(Self {
      id: Uuid::new_v4(),
      invoice_number,
      client: draft.client,
      issue_date: draft.issue_date,
      due_date,
      currency: draft.currency,
      tax_rate: draft.tax_rate,
      status: InvoiceStatus::Draft,
      notes: draft.notes,
      line_items: draft.line_items,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn totals(&self) -> Result<InvoiceTotals, ValidationError> {
    compute_totals(&self.line_items, &self.tax_rate)
  }

  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), InvoiceError> {
    if !self.status.can_transition_to(new_status) {
      return Err(InvoiceError::InvalidStatusTransition {
        from: self.status,
        to: new_status,
      });
    }

    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn is_overdue(&self, current_date: NaiveDate) -> bool {
    self.status == InvoiceStatus::Sent && self.due_date < current_date
  }
}
