use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::invoice::{errors::InvoiceError, ports::InvoiceNumberSequence};

/// Per-prefix, per-year counter stored in `invoice_number_sequences`.
///
/// The upsert takes a row lock, so concurrent callers are serialized by
/// PostgreSQL and each one receives a distinct value.
pub struct PostgresInvoiceNumberSequence {
  pool: PgPool,
}

impl PostgresInvoiceNumberSequence {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceNumberSequence for PostgresInvoiceNumberSequence {
  async fn next_value(&self, prefix: &str, year: i32) -> Result<i64, InvoiceError> {
    let value = sqlx::query_scalar::<_, i64>(
      r#"
            INSERT INTO invoice_number_sequences (prefix, year, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (prefix, year)
            DO UPDATE SET last_value = invoice_number_sequences.last_value + 1
            RETURNING last_value
            "#,
    )
    .bind(prefix)
    .bind(year)
    .fetch_one(&self.pool)
    .await?;

    Ok(value)
  }
}
