use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::invoice::{CreateInvoiceCommand, CreateInvoiceLineItemDto};

/// One billable line in a create-invoice request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
  #[validate(length(
    min = 1,
    max = 500,
    message = "Description must be between 1 and 500 characters"
  ))]
  pub description: String,

  #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
  pub quantity: i64,

  /// Non-negative, checked by the domain
  pub unit_price: Decimal,
}

/// Request for creating an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
  #[validate(length(
    min = 1,
    max = 255,
    message = "Client name must be between 1 and 255 characters"
  ))]
  pub client_name: String,

  #[validate(
    email(message = "Invalid client email format"),
    length(max = 255, message = "Client email cannot exceed 255 characters")
  )]
  pub client_email: Option<String>,

  pub client_address: Option<String>,

  /// Defaults to today
  pub issue_date: Option<NaiveDate>,

  #[validate(range(max = 365, message = "Payment days cannot exceed 365"))]
  pub payment_days: Option<u32>,

  #[validate(length(equal = 3, message = "Currency must be a 3-letter ISO code"))]
  pub currency: Option<String>,

  /// Percentage, e.g. 20.00
  pub tax_rate: Option<Decimal>,

  #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
  pub notes: Option<String>,

  #[validate(length(min = 1, message = "At least one line item is required"), nested)]
  pub line_items: Vec<LineItemRequest>,
}

impl From<CreateInvoiceRequest> for CreateInvoiceCommand {
  fn from(request: CreateInvoiceRequest) -> Self {
    Self {
      client_name: request.client_name,
      client_email: request.client_email,
      client_address: request.client_address,
      issue_date: request.issue_date,
      payment_days: request.payment_days,
      currency: request.currency,
      tax_rate: request.tax_rate,
      notes: request.notes,
      line_items: request
        .line_items
        .into_iter()
        .map(|item| CreateInvoiceLineItemDto {
          description: item.description,
          quantity: item.quantity,
          unit_price: item.unit_price,
        })
        .collect(),
    }
  }
}

/// Request for moving an invoice to a new status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeStatusRequest {
  #[validate(length(min = 1, message = "Status is required"))]
  pub status: String,
}

/// Query string for listing invoices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesQuery {
  pub status: Option<String>,
}

/// Optional reference date for the overdue sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkOverdueQuery {
  pub as_of: Option<NaiveDate>,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}
