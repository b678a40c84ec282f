pub mod change_invoice_status;
pub mod create_invoice;
pub mod export_invoice_pdf;
pub mod get_invoice_details;
pub mod list_invoices;

pub use change_invoice_status::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusResponse, ChangeInvoiceStatusUseCase,
  MarkOverdueResponse,
};
pub use create_invoice::{
  CreateInvoiceCommand, CreateInvoiceLineItemDto, CreateInvoiceResponse, CreateInvoiceUseCase,
  InvoiceDefaults,
};
pub use export_invoice_pdf::{
  ExportInvoicePdfCommand, ExportInvoicePdfResponse, ExportInvoicePdfUseCase, InvoiceHtmlRenderer,
};
pub use get_invoice_details::{
  ClientDetailsDto, GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase, InvoiceDetailsResponse,
  InvoiceLineItemDto, InvoiceTotalsDto,
};
pub use list_invoices::{
  InvoiceListItemDto, ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase,
};
