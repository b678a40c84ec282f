use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use super::errors::{GenerationError, InvoiceError};
use super::ports::{InvoiceNumberLookup, InvoiceNumberSequence};
use super::value_objects::{InvoiceNumber, InvoicePrefix};

pub const DEFAULT_SEQUENCE_WIDTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Shape of generated numbers and how hard to try for a free one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingPolicy {
  pub prefix: InvoicePrefix,
  pub sequence_width: usize,
  pub max_attempts: u32,
}

impl Default for NumberingPolicy {
  fn default() -> Self {
    Self {
      prefix: InvoicePrefix::default(),
      sequence_width: DEFAULT_SEQUENCE_WIDTH,
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }
}

impl NumberingPolicy {
  /// `PREFIX-YEAR-SEQUENCE`, sequence zero-padded so numbers sort within a year.
  pub fn format(&self, year: i32, sequence: i64) -> Result<InvoiceNumber, InvoiceError> {
    let number = format!(
      "{}-{:04}-{:0width$}",
      self.prefix,
      year,
      sequence,
      width = self.sequence_width
    );
    Ok(InvoiceNumber::new(number)?)
  }

  /// At least one attempt is always made.
  pub fn attempts(&self) -> u32 {
    self.max_attempts.max(1)
  }
}

/// Hands out invoice numbers backed by a storage sequence.
///
/// The sequence guarantees that concurrent callers never receive the same
/// candidate. Candidates that already exist (for example numbers imported or
/// entered by hand) are skipped, up to `max_attempts` times.
pub struct InvoiceNumberGenerator {
  sequence: Arc<dyn InvoiceNumberSequence>,
  lookup: Arc<dyn InvoiceNumberLookup>,
  policy: NumberingPolicy,
}

impl InvoiceNumberGenerator {
  pub fn new(
    sequence: Arc<dyn InvoiceNumberSequence>,
    lookup: Arc<dyn InvoiceNumberLookup>,
    policy: NumberingPolicy,
  ) -> Self {
    Self {
      sequence,
      lookup,
      policy,
    }
  }

  pub fn policy(&self) -> &NumberingPolicy {
    &self.policy
  }

  pub async fn generate(&self, issue_date: NaiveDate) -> Result<InvoiceNumber, InvoiceError> {
    let year = issue_date.year();
    let attempts = self.policy.attempts();

    for attempt in 1..=attempts {
      let sequence = self
        .sequence
        .next_value(self.policy.prefix.value(), year)
        .await?;
      let candidate = self.policy.format(year, sequence)?;

      if !self.lookup.exists_by_number(&candidate).await? {
        tracing::debug!(invoice_number = %candidate, attempt, "Assigned invoice number");
        return Ok(candidate);
      }

      tracing::warn!(
        invoice_number = %candidate,
        attempt,
        max_attempts = attempts,
        "Invoice number already taken, drawing the next one"
      );
    }

    Err(GenerationError::Exhausted { attempts }.into())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::collections::{HashMap, HashSet};
  use std::sync::Mutex;

  /// Per-period counter kept in memory, standing in for the database sequence.
  #[derive(Default)]
  pub(crate) struct InMemorySequence {
    counters: Mutex<HashMap<(String, i32), i64>>,
  }

  #[async_trait]
  impl InvoiceNumberSequence for InMemorySequence {
    async fn next_value(&self, prefix: &str, year: i32) -> Result<i64, InvoiceError> {
      let mut counters = self.counters.lock().unwrap();
      let counter = counters.entry((prefix.to_string(), year)).or_insert(0);
      *counter += 1;
      Ok(*counter)
    }
  }

  #[derive(Default)]
  pub(crate) struct TakenNumbers {
    pub(crate) numbers: Mutex<HashSet<String>>,
  }

  impl TakenNumbers {
    pub(crate) fn with(numbers: &[&str]) -> Self {
      Self {
        numbers: Mutex::new(numbers.iter().map(|n| n.to_string()).collect()),
      }
    }
  }

  #[async_trait]
  impl InvoiceNumberLookup for TakenNumbers {
    async fn exists_by_number(&self, number: &InvoiceNumber) -> Result<bool, InvoiceError> {
      Ok(self.numbers.lock().unwrap().contains(number.value()))
    }
  }

  fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 6, 15).unwrap()
  }

  fn generator(taken: TakenNumbers, policy: NumberingPolicy) -> InvoiceNumberGenerator {
    InvoiceNumberGenerator::new(
      Arc::new(InMemorySequence::default()),
      Arc::new(taken),
      policy,
    )
  }

  #[test]
  fn test_format() {
    let policy = NumberingPolicy::default();
    assert_eq!(policy.format(2026, 42).unwrap().value(), "INV-2026-000042");

    let policy = NumberingPolicy {
      prefix: InvoicePrefix::new("F".to_string()).unwrap(),
      sequence_width: 3,
      max_attempts: 0,
    };
    assert_eq!(policy.format(2026, 7).unwrap().value(), "F-2026-007");
    assert_eq!(policy.format(2026, 12345).unwrap().value(), "F-2026-12345");
    assert_eq!(policy.attempts(), 1);
  }

  #[tokio::test]
  async fn test_successive_numbers_are_distinct() {
    let generator = generator(TakenNumbers::default(), NumberingPolicy::default());

    let first = generator.generate(date(2026)).await.unwrap();
    let second = generator.generate(date(2026)).await.unwrap();

    assert_eq!(first.value(), "INV-2026-000001");
    assert_eq!(second.value(), "INV-2026-000002");
  }

  #[tokio::test]
  async fn test_sequence_restarts_per_year() {
    let generator = generator(TakenNumbers::default(), NumberingPolicy::default());

    generator.generate(date(2025)).await.unwrap();
    generator.generate(date(2025)).await.unwrap();
    let next_year = generator.generate(date(2026)).await.unwrap();

    assert_eq!(next_year.value(), "INV-2026-000001");
  }

  #[tokio::test]
  async fn test_taken_numbers_are_skipped() {
    let taken = TakenNumbers::with(&["INV-2026-000001", "INV-2026-000002"]);
    let generator = generator(taken, NumberingPolicy::default());

    let number = generator.generate(date(2026)).await.unwrap();

    assert_eq!(number.value(), "INV-2026-000003");
  }

  #[tokio::test]
  async fn test_gives_up_after_max_attempts() {
    let taken = TakenNumbers::with(&["INV-2026-000001", "INV-2026-000002", "INV-2026-000003"]);
    let policy = NumberingPolicy {
      max_attempts: 3,
      ..NumberingPolicy::default()
    };
    let generator = generator(taken, policy);

    let result = generator.generate(date(2026)).await;

    assert!(matches!(
      result,
      Err(InvoiceError::Generation(GenerationError::Exhausted { attempts: 3 }))
    ));
  }

  #[tokio::test]
  async fn test_concurrent_generation_yields_unique_numbers() {
    let generator = Arc::new(generator(
      TakenNumbers::default(),
      NumberingPolicy::default(),
    ));

    let handles: Vec<_> = (0..32)
      .map(|_| {
        let generator = generator.clone();
        tokio::spawn(async move { generator.generate(date(2026)).await.unwrap() })
      })
      .collect();

    let mut numbers = HashSet::new();
    for handle in handles {
      assert!(numbers.insert(handle.await.unwrap().into_inner()));
    }
    assert_eq!(numbers.len(), 32);
  }
}
