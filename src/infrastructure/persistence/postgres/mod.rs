pub mod invoice_number_sequence;
pub mod invoice_repository;

pub use invoice_number_sequence::PostgresInvoiceNumberSequence;
pub use invoice_repository::PostgresInvoiceRepository;
