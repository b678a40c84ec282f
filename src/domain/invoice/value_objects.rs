use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
  static ref PREFIX_PATTERN: Regex = Regex::new(r"^[A-Z][A-Z0-9]{0,9}$").expect("valid regex");
  static ref NUMBER_PATTERN: Regex =
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/_\-]*$").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("An invoice needs at least one line item")]
  NoLineItems,
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid invoice number prefix: {0}")]
  InvalidPrefix(String),
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid unit price: {0}")]
  InvalidUnitPrice(String),
  #[error("Invalid line item description: {0}")]
  InvalidDescription(String),
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid tax rate: {0}")]
  InvalidTaxRate(String),
  #[error("Invalid client: {0}")]
  InvalidClient(String),
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
  #[error("Invalid date: {0}")]
  InvalidDate(String),
  #[error("Amount is too large to be represented")]
  AmountOverflow,
}

/// Invoice dates keep a four-digit year so numbers stay `PREFIX-YYYY-…`.
pub const MIN_INVOICE_YEAR: i32 = 1;
pub const MAX_INVOICE_YEAR: i32 = 9999;

pub fn check_invoice_date(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
  if !(MIN_INVOICE_YEAR..=MAX_INVOICE_YEAR).contains(&date.year()) {
    return Err(ValidationError::InvalidDate(format!(
      "{} is outside years {}..={}",
      date, MIN_INVOICE_YEAR, MAX_INVOICE_YEAR
    )));
  }
  Ok(date)
}

// Invoice Number - assigned once by the numbering generator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValidationError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValidationError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    if !NUMBER_PATTERN.is_match(trimmed) {
      return Err(ValidationError::InvalidInvoiceNumber(format!(
        "Invoice number contains unsupported characters: {}",
        trimmed
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Leading part of every generated invoice number, e.g. `INV` in `INV-2026-000001`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePrefix(String);

impl InvoicePrefix {
  pub fn new(value: String) -> Result<Self, ValidationError> {
    let trimmed = value.trim();
    if !PREFIX_PATTERN.is_match(trimmed) {
      return Err(ValidationError::InvalidPrefix(format!(
        "'{}' must be 1-10 upper-case letters or digits starting with a letter",
        trimmed
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl Default for InvoicePrefix {
  fn default() -> Self {
    Self("INV".to_string())
  }
}

impl fmt::Display for InvoicePrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Paid,
  Overdue,
  Cancelled,
}

impl InvoiceStatus {
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    match (self, new_status) {
      (InvoiceStatus::Draft, InvoiceStatus::Sent) => true,
      (InvoiceStatus::Draft, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Sent, InvoiceStatus::Paid) => true,
      (InvoiceStatus::Sent, InvoiceStatus::Overdue) => true,
      (InvoiceStatus::Sent, InvoiceStatus::Cancelled) => true,
      (InvoiceStatus::Overdue, InvoiceStatus::Paid) => true,
      (InvoiceStatus::Overdue, InvoiceStatus::Cancelled) => true,
      // Paid and Cancelled are terminal
      _ => false,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "draft",
      InvoiceStatus::Sent => "sent",
      InvoiceStatus::Paid => "paid",
      InvoiceStatus::Overdue => "overdue",
      InvoiceStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "sent" => Ok(InvoiceStatus::Sent),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Ok(InvoiceStatus::Overdue),
      "cancelled" => Ok(InvoiceStatus::Cancelled),
      _ => Err(ValidationError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Currency - ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
  USD,
  EUR,
  GBP,
  DKK,
  SEK,
  NOK,
}

impl Currency {
  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::USD => "USD",
      Currency::EUR => "EUR",
      Currency::GBP => "GBP",
      Currency::DKK => "DKK",
      Currency::SEK => "SEK",
      Currency::NOK => "NOK",
    }
  }

  pub fn symbol(&self) -> &'static str {
    match self {
      Currency::USD => "$",
      Currency::EUR => "€",
      Currency::GBP => "£",
      Currency::DKK | Currency::SEK | Currency::NOK => "kr",
    }
  }
}

impl FromStr for Currency {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "USD" => Ok(Currency::USD),
      "EUR" => Ok(Currency::EUR),
      "GBP" => Ok(Currency::GBP),
      "DKK" => Ok(Currency::DKK),
      "SEK" => Ok(Currency::SEK),
      "NOK" => Ok(Currency::NOK),
      _ => Err(ValidationError::InvalidCurrency(format!(
        "Unsupported currency: {}",
        s
      ))),
    }
  }
}

// Line Item Description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDescription(String);

impl LineItemDescription {
  pub fn new(value: String) -> Result<Self, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValidationError::InvalidDescription(
        "Description cannot be empty".to_string(),
      ));
    }
    if trimmed.chars().count() > 500 {
      return Err(ValidationError::InvalidDescription(
        "Description cannot exceed 500 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

/// Whole number of billed units. Stored as a Postgres INTEGER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
  pub fn new(value: i64) -> Result<Self, ValidationError> {
    if value < 1 {
      return Err(ValidationError::InvalidQuantity(format!(
        "Quantity must be a positive integer, got {}",
        value
      )));
    }
    if value > i32::MAX as i64 {
      return Err(ValidationError::InvalidQuantity(format!(
        "Quantity cannot exceed {}",
        i32::MAX
      )));
    }
    Ok(Self(value as u32))
  }

  pub fn value(&self) -> u32 {
    self.0
  }

  pub fn as_decimal(&self) -> Decimal {
    Decimal::from(self.0)
  }
}

// Unit Price - non-negative, currency is carried by the invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
  pub fn new(value: Decimal) -> Result<Self, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValidationError::InvalidUnitPrice(
        "Unit price cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

/// Tax rate as a percentage: `20.00` means 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
  pub const DEFAULT_PERCENT: Decimal = dec!(20.00);

  pub fn new(value: Decimal) -> Result<Self, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValidationError::InvalidTaxRate(
        "Tax rate cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

impl Default for TaxRate {
  fn default() -> Self {
    Self(Self::DEFAULT_PERCENT)
  }
}

// Client Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
  pub fn new(value: String) -> Result<Self, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValidationError::InvalidClient(
        "Client name cannot be empty".to_string(),
      ));
    }
    if trimmed.chars().count() > 255 {
      return Err(ValidationError::InvalidClient(
        "Client name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

/// Who the invoice is addressed to. Email format is checked at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
  pub name: ClientName,
  pub email: Option<String>,
  pub address: Option<String>,
}

impl ClientDetails {
  pub fn new(name: ClientName, email: Option<String>, address: Option<String>) -> Self {
    let non_blank = |value: Option<String>| {
      value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };

    Self {
      name,
      email: non_blank(email),
      address: non_blank(address),
    }
  }

  pub fn address_lines(&self) -> Vec<&str> {
    self
      .address
      .as_deref()
      .map(|a| a.lines().map(str::trim).filter(|l| !l.is_empty()).collect())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_invoice_number() {
    assert!(InvoiceNumber::new("INV-2026-000001".to_string()).is_ok());
    assert!(InvoiceNumber::new("".to_string()).is_err());
    assert!(InvoiceNumber::new("   ".to_string()).is_err());
    assert!(InvoiceNumber::new("INV 001".to_string()).is_err());
    assert_eq!(
      InvoiceNumber::new(" INV-005 ".to_string())
        .unwrap()
        .to_string(),
      "INV-005"
    );
  }

  #[test]
  fn test_invoice_prefix() {
    assert!(InvoicePrefix::new("INV".to_string()).is_ok());
    assert!(InvoicePrefix::new("F2".to_string()).is_ok());
    assert!(InvoicePrefix::new("inv".to_string()).is_err());
    assert!(InvoicePrefix::new("2INV".to_string()).is_err());
    assert!(InvoicePrefix::new("TOOLONGPREFIX".to_string()).is_err());
    assert_eq!(InvoicePrefix::default().value(), "INV");
  }

  #[test]
  fn test_invoice_status_transitions() {
    assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
    assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Cancelled));
    assert!(!InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Paid));

    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Paid));
    assert!(InvoiceStatus::Sent.can_transition_to(InvoiceStatus::Overdue));
    assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));

    assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Sent));
    assert!(!InvoiceStatus::Cancelled.can_transition_to(InvoiceStatus::Draft));
  }

  #[test]
  fn test_invoice_status_parsing() {
    assert_eq!(InvoiceStatus::from_str("PAID").unwrap(), InvoiceStatus::Paid);
    assert_eq!(
      InvoiceStatus::from_str("nope"),
      Err(ValidationError::InvalidStatus("Unknown status: nope".to_string()))
    );
  }

  #[test]
  fn test_currency() {
    assert_eq!(Currency::USD.as_str(), "USD");
    assert_eq!(Currency::EUR.symbol(), "€");
    assert_eq!(Currency::from_str("usd").unwrap(), Currency::USD);
    assert!(Currency::from_str("JPY").is_err());
  }

  #[test]
  fn test_quantity() {
    assert_eq!(Quantity::new(3).unwrap().value(), 3);
    assert!(Quantity::new(0).is_err());
    assert!(Quantity::new(-1).is_err());
    assert!(Quantity::new(i64::from(i32::MAX) + 1).is_err());
  }

  #[test]
  fn test_unit_price() {
    assert!(UnitPrice::new(dec!(0)).is_ok());
    assert!(UnitPrice::new(dec!(10.50)).is_ok());
    assert!(UnitPrice::new(dec!(-0.01)).is_err());
  }

  #[test]
  fn test_tax_rate() {
    assert!(TaxRate::new(dec!(0)).is_ok());
    assert!(TaxRate::new(dec!(25.5)).is_ok());
    assert!(TaxRate::new(dec!(-1)).is_err());
    assert_eq!(TaxRate::default().value(), dec!(20.00));
  }

  #[test]
  fn test_invoice_date_range() {
    let ok = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
    assert_eq!(check_invoice_date(ok), Ok(ok));
    assert!(check_invoice_date(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()).is_ok());

    assert!(matches!(
      check_invoice_date(NaiveDate::from_ymd_opt(10000, 1, 1).unwrap()),
      Err(ValidationError::InvalidDate(_))
    ));
    assert!(check_invoice_date(NaiveDate::from_ymd_opt(0, 12, 31).unwrap()).is_err());
    assert!(check_invoice_date(NaiveDate::from_ymd_opt(-1, 1, 1).unwrap()).is_err());
  }

  #[test]
  fn test_text_limits_count_characters() {
    // 'é' is two bytes in UTF-8
    assert!(LineItemDescription::new("é".repeat(500)).is_ok());
    assert!(LineItemDescription::new("é".repeat(501)).is_err());
    assert!(ClientName::new("ø".repeat(255)).is_ok());
    assert!(ClientName::new("ø".repeat(256)).is_err());
  }

  #[test]
  fn test_client_details_drops_blank_fields() {
    let client = ClientDetails::new(
      ClientName::new("Acme Ltd".to_string()).unwrap(),
      Some("  ".to_string()),
      Some("1 Main St\n\nCopenhagen".to_string()),
    );
    assert_eq!(client.email, None);
    assert_eq!(client.address_lines(), vec!["1 Main St", "Copenhagen"]);
    assert!(ClientName::new(" ".to_string()).is_err());
  }
}
