use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::adapters::http::dtos::{
  ChangeStatusRequest, CreateInvoiceRequest, ListInvoicesQuery, MarkOverdueQuery,
};
use crate::adapters::http::errors::ApiError;
use crate::application::invoice::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusUseCase, CreateInvoiceUseCase,
  ExportInvoicePdfCommand, ExportInvoicePdfUseCase, GetInvoiceDetailsCommand,
  GetInvoiceDetailsUseCase, ListInvoicesCommand, ListInvoicesUseCase,
};

// POST /invoices - Create a new invoice
pub async fn create_invoice_handler(
  request: web::Json<CreateInvoiceRequest>,
  create_invoice_use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let request = request.into_inner();
  request.validate()?;

  let response = create_invoice_use_case.execute(request.into()).await?;

  Ok(
    HttpResponse::Created()
      .insert_header((
        header::LOCATION,
        format!("/api/v1/invoices/{}", response.invoice_id),
      ))
      .json(response),
  )
}

// GET /invoices - List invoices, optionally by status
pub async fn list_invoices_handler(
  query: web::Query<ListInvoicesQuery>,
  list_invoices_use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = list_invoices_use_case
    .execute(ListInvoicesCommand {
      status_filter: query.into_inner().status,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

// GET /invoices/{id} - Invoice details with totals
pub async fn get_invoice_handler(
  path: web::Path<Uuid>,
  get_invoice_details_use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = get_invoice_details_use_case
    .execute(GetInvoiceDetailsCommand {
      invoice_id: path.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

// POST /invoices/{id}/status - Change invoice status
pub async fn change_invoice_status_handler(
  path: web::Path<Uuid>,
  request: web::Json<ChangeStatusRequest>,
  change_status_use_case: web::Data<Arc<ChangeInvoiceStatusUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let request = request.into_inner();
  request.validate()?;

  let response = change_status_use_case
    .execute(ChangeInvoiceStatusCommand {
      invoice_id: path.into_inner(),
      new_status: request.status,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

// POST /invoices/mark-overdue - Flag sent invoices past their due date
pub async fn mark_overdue_handler(
  query: web::Query<MarkOverdueQuery>,
  change_status_use_case: web::Data<Arc<ChangeInvoiceStatusUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let as_of = query
    .into_inner()
    .as_of
    .unwrap_or_else(|| Utc::now().date_naive());

  let response = change_status_use_case.mark_overdue(as_of).await?;

  Ok(HttpResponse::Ok().json(response))
}

// GET /invoices/{id}/html - Printable invoice view
pub async fn invoice_html_handler(
  path: web::Path<Uuid>,
  export_pdf_use_case: web::Data<Arc<ExportInvoicePdfUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let html = export_pdf_use_case.render_html(path.into_inner()).await?;

  Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

// GET /invoices/{id}/pdf - Render, convert and download the invoice PDF
pub async fn invoice_pdf_handler(
  path: web::Path<Uuid>,
  export_pdf_use_case: web::Data<Arc<ExportInvoicePdfUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = export_pdf_use_case
    .execute(ExportInvoicePdfCommand {
      invoice_id: path.into_inner(),
    })
    .await?;

  let bytes = tokio::fs::read(&response.pdf_path)
    .await
    .map_err(|e| ApiError::Internal(format!("Failed to read generated PDF: {}", e)))?;

  Ok(
    HttpResponse::Ok()
      .content_type("application/pdf")
      .insert_header((
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}.pdf\"", response.invoice_number),
      ))
      .body(bytes),
  )
}
