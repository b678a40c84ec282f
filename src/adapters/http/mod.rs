pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod templates;

// Re-export commonly used types
pub use dtos::{ChangeStatusRequest, CreateInvoiceRequest, ErrorResponse, LineItemRequest};
pub use errors::ApiError;
pub use routes::{InvoiceRouteDependencies, configure_invoice_routes, health_check};
pub use templates::TemplateEngine;
