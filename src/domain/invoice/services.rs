use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Invoice, InvoiceDraft};
use super::errors::{GenerationError, InvoiceError};
use super::numbering::InvoiceNumberGenerator;
use super::ports::InvoiceRepository;
use super::totals::{InvoiceTotals, compute_totals};
use super::value_objects::InvoiceStatus;

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  number_generator: InvoiceNumberGenerator,
}

impl InvoiceService {
  pub fn new(
    invoice_repo: Arc<dyn InvoiceRepository>,
    number_generator: InvoiceNumberGenerator,
  ) -> Self {
    Self {
      invoice_repo,
      number_generator,
    }
  }

  /// Computes totals, assigns a number and persists the invoice.
  ///
  /// Totals and dates are validated before a number is drawn, so invalid
  /// input never consumes a sequence value. If the insert loses a race on the
  /// number's unique constraint a fresh number is drawn, within the same
  /// attempt budget as the generator itself.
  pub async fn create_invoice(
    &self,
    draft: InvoiceDraft,
  ) -> Result<(Invoice, InvoiceTotals), InvoiceError> {
    let totals = compute_totals(&draft.line_items, &draft.tax_rate)?;
    draft.due_date()?;
    let attempts = self.number_generator.policy().attempts();

    for attempt in 1..=attempts {
      let invoice_number = self.number_generator.generate(draft.issue_date).await?;
      let invoice = Invoice::new(invoice_number, draft.clone())?;

      match self.invoice_repo.create(invoice).await {
        Ok(created) => {
          tracing::info!(
            invoice_id = %created.id,
            invoice_number = %created.invoice_number,
            total = %totals.total,
            "Invoice created"
          );
          return Ok((created, totals));
        }
        Err(InvoiceError::InvoiceNumberAlreadyExists(number)) => {
          tracing::warn!(
            invoice_number = %number,
            attempt,
            "Invoice number claimed concurrently, retrying"
          );
        }
        Err(e) => return Err(e),
      }
    }

    Err(GenerationError::Exhausted { attempts }.into())
  }

  pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  pub async fn get_invoice_with_totals(
    &self,
    invoice_id: Uuid,
  ) -> Result<(Invoice, InvoiceTotals), InvoiceError> {
    let invoice = self.get_invoice(invoice_id).await?;
    let totals = invoice.totals()?;
    Ok((invoice, totals))
  }

  pub async fn list_invoices(
    &self,
    status_filter: Option<InvoiceStatus>,
  ) -> Result<Vec<(Invoice, InvoiceTotals)>, InvoiceError> {
    let invoices = match status_filter {
      Some(status) => self.invoice_repo.find_by_status(status).await?,
      None => self.invoice_repo.find_all().await?,
    };

    invoices
      .into_iter()
      .map(|invoice| {
        let totals = invoice.totals()?;
        Ok((invoice, totals))
      })
      .collect()
  }

  pub async fn change_invoice_status(
    &self,
    invoice_id: Uuid,
    new_status: InvoiceStatus,
  ) -> Result<Invoice, InvoiceError> {
    let mut invoice = self.get_invoice(invoice_id).await?;
    let previous = invoice.status;

    invoice.change_status(new_status)?;
    let updated = self.invoice_repo.update(invoice).await?;

    tracing::info!(
      invoice_id = %invoice_id,
      from = %previous,
      to = %new_status,
      "Invoice status changed"
    );
    Ok(updated)
  }

  pub async fn mark_overdue_invoices(
    &self,
    current_date: NaiveDate,
  ) -> Result<Vec<Invoice>, InvoiceError> {
    let sent = self
      .invoice_repo
      .find_by_status(InvoiceStatus::Sent)
      .await?;

    let mut updated_invoices = Vec::new();
    for mut invoice in sent {
      if invoice.is_overdue(current_date) {
        invoice.change_status(InvoiceStatus::Overdue)?;
        updated_invoices.push(self.invoice_repo.update(invoice).await?);
      }
    }

    tracing::info!(count = updated_invoices.len(), "Marked invoices overdue");
    Ok(updated_invoices)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::invoice::entities::LineItem;
  use crate::domain::invoice::numbering::NumberingPolicy;
  use crate::domain::invoice::numbering::tests::{InMemorySequence, TakenNumbers};
  use crate::domain::invoice::ports::InvoiceNumberLookup;
  use crate::domain::invoice::value_objects::{
    ClientDetails, ClientName, Currency, InvoiceNumber, LineItemDescription, Quantity, TaxRate,
    UnitPrice, ValidationError,
  };
  use async_trait::async_trait;
  use rust_decimal_macros::dec;
  use std::sync::Mutex;

  /// Invoice store with a unique number constraint, like the invoices table.
  #[derive(Default)]
  pub(crate) struct InMemoryInvoiceRepository {
    invoices: Mutex<Vec<Invoice>>,
    /// Numbers that a competing writer claims just before our insert.
    raced_numbers: Mutex<Vec<String>>,
  }

  impl InMemoryInvoiceRepository {
    fn racing_on(numbers: &[&str]) -> Self {
      Self {
        invoices: Mutex::default(),
        raced_numbers: Mutex::new(numbers.iter().map(|n| n.to_string()).collect()),
      }
    }

    fn count(&self) -> usize {
      self.invoices.lock().unwrap().len()
    }
  }

  #[async_trait]
  impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
      let number = invoice.invoice_number.value().to_string();
      if self.raced_numbers.lock().unwrap().contains(&number) {
        return Err(InvoiceError::InvoiceNumberAlreadyExists(number));
      }
      let mut invoices = self.invoices.lock().unwrap();
      if invoices.iter().any(|i| i.invoice_number == invoice.invoice_number) {
        return Err(InvoiceError::InvoiceNumberAlreadyExists(number));
      }
      invoices.push(invoice.clone());
      Ok(invoice)
    }

    async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
      let mut invoices = self.invoices.lock().unwrap();
      let slot = invoices
        .iter_mut()
        .find(|i| i.id == invoice.id)
        .ok_or(InvoiceError::InvoiceNotFound(invoice.id))?;
      *slot = invoice.clone();
      Ok(invoice)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
      Ok(self.invoices.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Invoice>, InvoiceError> {
      Ok(self.invoices.lock().unwrap().clone())
    }

    async fn find_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>, InvoiceError> {
      Ok(
        self
          .invoices
          .lock()
          .unwrap()
          .iter()
          .filter(|i| i.status == status)
          .cloned()
          .collect(),
      )
    }
  }

  #[async_trait]
  impl InvoiceNumberLookup for InMemoryInvoiceRepository {
    async fn exists_by_number(&self, number: &InvoiceNumber) -> Result<bool, InvoiceError> {
      Ok(
        self
          .invoices
          .lock()
          .unwrap()
          .iter()
          .any(|i| &i.invoice_number == number),
      )
    }
  }

  pub(crate) fn service_with(repo: Arc<InMemoryInvoiceRepository>) -> InvoiceService {
    let generator = InvoiceNumberGenerator::new(
      Arc::new(InMemorySequence::default()),
      repo.clone(),
      NumberingPolicy::default(),
    );
    InvoiceService::new(repo, generator)
  }

  pub(crate) fn sample_draft(items: Vec<(i64, rust_decimal::Decimal)>) -> InvoiceDraft {
    InvoiceDraft {
      client: ClientDetails::new(
        ClientName::new("Acme Ltd".to_string()).unwrap(),
        Some("billing@acme.test".to_string()),
        None,
      ),
      issue_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
      payment_days: 14,
      currency: Currency::EUR,
      tax_rate: TaxRate::default(),
      notes: None,
      line_items: items
        .into_iter()
        .map(|(quantity, price)| {
          LineItem::new(
            LineItemDescription::new("Service".to_string()).unwrap(),
            Quantity::new(quantity).unwrap(),
            UnitPrice::new(price).unwrap(),
          )
        })
        .collect(),
    }
  }

  #[tokio::test]
  async fn test_create_invoice_assigns_number_and_totals() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo.clone());

    let (invoice, totals) = service
      .create_invoice(sample_draft(vec![(2, dec!(10.00)), (1, dec!(5.50))]))
      .await
      .unwrap();

    assert_eq!(invoice.invoice_number.value(), "INV-2026-000001");
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 1, 24).unwrap());
    assert_eq!(totals.subtotal, dec!(25.50));
    assert_eq!(totals.tax_amount, dec!(5.10));
    assert_eq!(totals.total, dec!(30.60));
    assert_eq!(repo.count(), 1);
  }

  #[tokio::test]
  async fn test_out_of_range_dates_do_not_consume_numbers() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo.clone());

    let mut far_future = sample_draft(vec![(1, dec!(1))]);
    far_future.issue_date = NaiveDate::from_ymd_opt(262142, 12, 31).unwrap();
    let mut past_year_end = sample_draft(vec![(1, dec!(1))]);
    past_year_end.issue_date = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();

    for draft in [far_future, past_year_end] {
      assert!(matches!(
        service.create_invoice(draft).await,
        Err(InvoiceError::Validation(ValidationError::InvalidDate(_)))
      ));
    }
    assert_eq!(repo.count(), 0);

    let (invoice, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();
    assert_eq!(invoice.invoice_number.value(), "INV-2026-000001");
  }

  #[tokio::test]
  async fn test_create_invoice_without_items_persists_nothing() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo.clone());

    let result = service.create_invoice(sample_draft(vec![])).await;

    assert!(matches!(
      result,
      Err(InvoiceError::Validation(ValidationError::NoLineItems))
    ));
    assert_eq!(repo.count(), 0);

    // The failed attempt did not consume a number
    let (invoice, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();
    assert_eq!(invoice.invoice_number.value(), "INV-2026-000001");
  }

  #[tokio::test]
  async fn test_two_invoices_get_distinct_numbers() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo.clone());

    let (first, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();
    let (second, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();

    assert_ne!(first.invoice_number, second.invoice_number);
    assert_eq!(repo.count(), 2);
  }

  #[tokio::test]
  async fn test_insert_race_retries_with_next_number() {
    let repo = Arc::new(InMemoryInvoiceRepository::racing_on(&["INV-2026-000001"]));
    let service = service_with(repo.clone());

    let (invoice, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();

    assert_eq!(invoice.invoice_number.value(), "INV-2026-000002");
  }

  #[tokio::test]
  async fn test_insert_race_is_bounded() {
    let raced: Vec<String> = (1..=5).map(|n| format!("INV-2026-{:06}", n)).collect();
    let raced: Vec<&str> = raced.iter().map(String::as_str).collect();
    let repo = Arc::new(InMemoryInvoiceRepository::racing_on(&raced));
    let service = service_with(repo.clone());

    let result = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await;

    assert!(matches!(
      result,
      Err(InvoiceError::Generation(GenerationError::Exhausted { attempts: 5 }))
    ));
    assert_eq!(repo.count(), 0);
  }

  #[tokio::test]
  async fn test_generator_skips_numbers_seen_by_lookup() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let generator = InvoiceNumberGenerator::new(
      Arc::new(InMemorySequence::default()),
      Arc::new(TakenNumbers::with(&["INV-2026-000001"])),
      NumberingPolicy::default(),
    );
    let service = InvoiceService::new(repo, generator);

    let (invoice, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(1))]))
      .await
      .unwrap();

    assert_eq!(invoice.invoice_number.value(), "INV-2026-000002");
  }

  #[tokio::test]
  async fn test_change_status_and_list_filter() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo);

    let (invoice, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(100))]))
      .await
      .unwrap();
    service
      .create_invoice(sample_draft(vec![(1, dec!(50))]))
      .await
      .unwrap();

    let sent = service
      .change_invoice_status(invoice.id, InvoiceStatus::Sent)
      .await
      .unwrap();
    assert_eq!(sent.status, InvoiceStatus::Sent);

    let listed = service
      .list_invoices(Some(InvoiceStatus::Sent))
      .await
      .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1.total, dec!(120));
    assert_eq!(service.list_invoices(None).await.unwrap().len(), 2);

    let err = service
      .change_invoice_status(invoice.id, InvoiceStatus::Draft)
      .await
      .unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidStatusTransition { .. }));
  }

  #[tokio::test]
  async fn test_get_missing_invoice() {
    let service = service_with(Arc::new(InMemoryInvoiceRepository::default()));
    let id = Uuid::new_v4();

    let err = service.get_invoice_with_totals(id).await.unwrap_err();

    assert!(matches!(err, InvoiceError::InvoiceNotFound(missing) if missing == id));
  }

  #[tokio::test]
  async fn test_mark_overdue_invoices() {
    let repo = Arc::new(InMemoryInvoiceRepository::default());
    let service = service_with(repo);

    let (due, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(10))]))
      .await
      .unwrap();
    let (draft_only, _) = service
      .create_invoice(sample_draft(vec![(1, dec!(10))]))
      .await
      .unwrap();
    service
      .change_invoice_status(due.id, InvoiceStatus::Sent)
      .await
      .unwrap();

    let updated = service
      .mark_overdue_invoices(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
      .await
      .unwrap();

    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, due.id);
    assert_eq!(updated[0].status, InvoiceStatus::Overdue);
    let untouched = service.get_invoice(draft_only.id).await.unwrap();
    assert_eq!(untouched.status, InvoiceStatus::Draft);
  }
}
