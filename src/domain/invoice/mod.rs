pub mod entities;
pub mod errors;
pub mod numbering;
pub mod ports;
pub mod services;
pub mod totals;
pub mod value_objects;

pub use entities::{Invoice, InvoiceDraft, LineItem};
pub use errors::{GenerationError, InvoiceError};
pub use numbering::{InvoiceNumberGenerator, NumberingPolicy};
pub use ports::{InvoiceNumberLookup, InvoiceNumberSequence, InvoiceRepository, PdfGenerator};
pub use services::InvoiceService;
pub use totals::{InvoiceTotals, compute_totals};
pub use value_objects::{
  ClientDetails, ClientName, Currency, InvoiceNumber, InvoicePrefix, InvoiceStatus,
  LineItemDescription, Quantity, TaxRate, UnitPrice, ValidationError, check_invoice_date,
};
