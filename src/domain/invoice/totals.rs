use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::entities::LineItem;
use super::value_objects::{TaxRate, ValidationError};

/// Currency precision for derived monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Totals derived from an invoice's line items and tax rate. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub subtotal: Decimal,
  pub tax_amount: Decimal,
  pub total: Decimal,
}

/// Computes subtotal, tax and grand total for a list of line items.
///
/// The subtotal is the exact sum of `quantity * unit_price`. The tax amount is
/// `subtotal * rate / 100` rounded half-up to two places, and the total is
/// their sum, so `total == subtotal + tax_amount` always holds.
pub fn compute_totals(items: &[LineItem], tax_rate: &TaxRate) -> Result<InvoiceTotals, ValidationError> {
  if items.is_empty() {
    return Err(ValidationError::NoLineItems);
  }

  let subtotal = items.iter().try_fold(Decimal::ZERO, |acc, item| {
    acc
      .checked_add(item.amount()?)
      .ok_or(ValidationError::AmountOverflow)
  })?;

  let tax_amount = tax_for(subtotal, tax_rate)?;
  let total = subtotal
    .checked_add(tax_amount)
    .ok_or(ValidationError::AmountOverflow)?;

  Ok(InvoiceTotals {
    subtotal,
    tax_amount,
    total,
  })
}

fn tax_for(subtotal: Decimal, tax_rate: &TaxRate) -> Result<Decimal, ValidationError> {
  let raw = subtotal
    .checked_mul(tax_rate.value())
    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
    .ok_or(ValidationError::AmountOverflow)?;

  // Amounts are non-negative, so away-from-zero is half-up.
  Ok(raw.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
