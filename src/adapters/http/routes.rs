use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::{
  ChangeInvoiceStatusUseCase, CreateInvoiceUseCase, ExportInvoicePdfUseCase,
  GetInvoiceDetailsUseCase, ListInvoicesUseCase,
};

use super::handlers::invoices::{
  change_invoice_status_handler, create_invoice_handler, get_invoice_handler,
  invoice_html_handler, invoice_pdf_handler, list_invoices_handler, mark_overdue_handler,
};

/// Use cases shared by the invoice routes
#[derive(Clone)]
pub struct InvoiceRouteDependencies {
  pub create_invoice_use_case: Arc<CreateInvoiceUseCase>,
  pub list_invoices_use_case: Arc<ListInvoicesUseCase>,
  pub get_invoice_details_use_case: Arc<GetInvoiceDetailsUseCase>,
  pub change_invoice_status_use_case: Arc<ChangeInvoiceStatusUseCase>,
  pub export_invoice_pdf_use_case: Arc<ExportInvoicePdfUseCase>,
}

/// Configure invoice routes
///
/// Mounts all invoice endpoints under the provided scope
/// (e.g., /api/v1/invoices).
///
/// # Routes
///
/// - POST / - Create an invoice (number and totals are assigned server-side)
/// - GET / - List invoices, `?status=` filters by status
/// - POST /mark-overdue - Move sent invoices past their due date to overdue
/// - GET /:id - Invoice details with line amounts and totals
/// - POST /:id/status - Change invoice status
/// - GET /:id/html - Printable HTML view
/// - GET /:id/pdf - PDF download
pub fn configure_invoice_routes(cfg: &mut web::ServiceConfig, deps: InvoiceRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.create_invoice_use_case))
    .app_data(web::Data::new(deps.list_invoices_use_case))
    .app_data(web::Data::new(deps.get_invoice_details_use_case))
    .app_data(web::Data::new(deps.change_invoice_status_use_case))
    .app_data(web::Data::new(deps.export_invoice_pdf_use_case))
    .route("", web::post().to(create_invoice_handler))
    .route("", web::get().to(list_invoices_handler))
    .route("/mark-overdue", web::post().to(mark_overdue_handler))
    .route("/{invoice_id}", web::get().to(get_invoice_handler))
    .route(
      "/{invoice_id}/status",
      web::post().to(change_invoice_status_handler),
    )
    .route("/{invoice_id}/html", web::get().to(invoice_html_handler))
    .route("/{invoice_id}/pdf", web::get().to(invoice_pdf_handler));
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
  "OK"
}
