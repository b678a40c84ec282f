use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  ClientDetails, ClientName, Currency, Invoice, InvoiceNumber, InvoiceStatus, LineItem,
  LineItemDescription, Quantity, TaxRate, UnitPrice,
  errors::InvoiceError,
  ports::{InvoiceNumberLookup, InvoiceRepository},
};

const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_number_unique";

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  invoice_number: String,
  client_name: String,
  client_email: Option<String>,
  client_address: Option<String>,
  issue_date: NaiveDate,
  due_date: NaiveDate,
  currency: String,
  tax_rate: Decimal,
  status: String,
  notes: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl InvoiceRow {
  fn into_invoice(self, line_items: Vec<LineItem>) -> Result<Invoice, InvoiceError> {
    let client = ClientDetails::new(
      ClientName::new(self.client_name)?,
      self.client_email,
      self.client_address,
    );

    Ok(Invoice {
      id: self.id,
      invoice_number: InvoiceNumber::new(self.invoice_number)?,
      client,
      issue_date: self.issue_date,
      due_date: self.due_date,
      currency: Currency::from_str(&self.currency)?,
      tax_rate: TaxRate::new(self.tax_rate)?,
      status: InvoiceStatus::from_str(&self.status)?,
      notes: self.notes,
      line_items,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
  invoice_id: Uuid,
  description: String,
  quantity: i32,
  unit_price: Decimal,
}

impl TryFrom<LineItemRow> for LineItem {
  type Error = InvoiceError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    Ok(LineItem::new(
      LineItemDescription::new(row.description)?,
      Quantity::new(i64::from(row.quantity))?,
      UnitPrice::new(row.unit_price)?,
    ))
  }
}

/// PostgreSQL storage for invoices and their line items.
///
/// Line items are written in the same transaction as their invoice and read
/// back in `line_order`. Totals are never stored.
pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn load_line_items(
    &self,
    invoice_ids: &[Uuid],
  ) -> Result<HashMap<Uuid, Vec<LineItem>>, InvoiceError> {
    let rows = sqlx::query_as::<_, LineItemRow>(
      r#"
            SELECT invoice_id, description, quantity, unit_price
            FROM invoice_line_items
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, line_order
            "#,
    )
    .bind(invoice_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut items: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
    for row in rows {
      let invoice_id = row.invoice_id;
      items.entry(invoice_id).or_default().push(row.try_into()?);
    }
    Ok(items)
  }

  async fn hydrate(&self, rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>, InvoiceError> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut items = self.load_line_items(&ids).await?;

    rows
      .into_iter()
      .map(|row| {
        let line_items = items.remove(&row.id).unwrap_or_default();
        row.into_invoice(line_items)
      })
      .collect()
  }
}

fn map_insert_error(e: sqlx::Error, invoice_number: &str) -> InvoiceError {
  if let sqlx::Error::Database(db_err) = &e {
    // PostgreSQL unique violation code
    if db_err.code().as_deref() == Some("23505")
      && db_err.constraint() == Some(INVOICE_NUMBER_CONSTRAINT)
    {
      return InvoiceError::InvoiceNumberAlreadyExists(invoice_number.to_string());
    }
  }
  InvoiceError::Database(e)
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let invoice_number = invoice.invoice_number.value().to_string();
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            INSERT INTO invoices (
                id, invoice_number, client_name, client_email, client_address,
                issue_date, due_date, currency, tax_rate, status, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, invoice_number, client_name, client_email, client_address,
                      issue_date, due_date, currency, tax_rate, status, notes,
                      created_at, updated_at
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.client.name.value())
    .bind(invoice.client.email.as_deref())
    .bind(invoice.client.address.as_deref())
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.currency.as_str())
    .bind(invoice.tax_rate.value())
    .bind(invoice.status.as_str())
    .bind(invoice.notes.as_deref())
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_insert_error(e, &invoice_number))?;

    for (index, item) in invoice.line_items.iter().enumerate() {
      let line_order = i32::try_from(index + 1)
        .map_err(|_| InvoiceError::Internal("Too many line items".to_string()))?;
      let quantity = i32::try_from(item.quantity.value())
        .map_err(|_| InvoiceError::Internal("Quantity out of range".to_string()))?;

      sqlx::query(
        r#"
            INSERT INTO invoice_line_items (invoice_id, line_order, description, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
      )
      .bind(invoice.id)
      .bind(line_order)
      .bind(item.description.value())
      .bind(quantity)
      .bind(item.unit_price.value())
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await?;

    row.into_invoice(invoice.line_items)
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            UPDATE invoices
            SET status = $2, notes = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, invoice_number, client_name, client_email, client_address,
                      issue_date, due_date, currency, tax_rate, status, notes,
                      created_at, updated_at
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.status.as_str())
    .bind(invoice.notes.as_deref())
    .bind(invoice.updated_at)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(InvoiceError::InvoiceNotFound(invoice.id))?;

    // Line items are immutable once the invoice exists
    row.into_invoice(invoice.line_items)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, client_name, client_email, client_address,
                   issue_date, due_date, currency, tax_rate, status, notes,
                   created_at, updated_at
            FROM invoices
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    match row {
      Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn find_all(&self) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, client_name, client_email, client_address,
                   issue_date, due_date, currency, tax_rate, status, notes,
                   created_at, updated_at
            FROM invoices
            ORDER BY issue_date DESC, invoice_number DESC
            "#,
    )
    .fetch_all(&self.pool)
    .await?;

    self.hydrate(rows).await
  }

  async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, invoice_number, client_name, client_email, client_address,
                   issue_date, due_date, currency, tax_rate, status, notes,
                   created_at, updated_at
            FROM invoices
            WHERE status = $1
            ORDER BY issue_date DESC, invoice_number DESC
            "#,
    )
    .bind(status.as_str())
    .fetch_all(&self.pool)
    .await?;

    self.hydrate(rows).await
  }
}

#[async_trait]
impl InvoiceNumberLookup for PostgresInvoiceRepository {
  async fn exists_by_number(&self, number: &InvoiceNumber) -> Result<bool, InvoiceError> {
    let exists = sqlx::query_scalar::<_, bool>(
      "SELECT EXISTS(SELECT 1 FROM invoices WHERE invoice_number = $1)",
    )
    .bind(number.value())
    .fetch_one(&self.pool)
    .await?;

    Ok(exists)
  }
}
