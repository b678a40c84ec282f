use std::sync::Arc;
use tera::Tera;

use crate::application::invoice::{InvoiceDetailsResponse, InvoiceHtmlRenderer};
use crate::domain::invoice::InvoiceError;

pub const INVOICE_TEMPLATE: &str = "invoices/invoice.html.tera";

/// Template engine wrapper for rendering HTML templates
#[derive(Clone)]
pub struct TemplateEngine {
  tera: Arc<Tera>,
}

impl TemplateEngine {
  /// Create a new template engine from `templates/` in the working directory
  pub fn new() -> Result<Self, tera::Error> {
    Self::with_glob("templates/**/*.html.tera")
  }

  pub fn with_glob(glob: &str) -> Result<Self, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.autoescape_on(vec!["html.tera", ".html"]);

    Ok(Self {
      tera: Arc::new(tera),
    })
  }

  /// Render a template with the given context
  pub fn render(&self, template: &str, context: &tera::Context) -> Result<String, tera::Error> {
    self.tera.render(template, context)
  }
}

impl InvoiceHtmlRenderer for TemplateEngine {
  fn render_invoice(&self, invoice: &InvoiceDetailsResponse) -> Result<String, InvoiceError> {
    let mut context = tera::Context::new();
    context.insert("invoice", invoice);

    self
      .render(INVOICE_TEMPLATE, &context)
      .map_err(|e| InvoiceError::Internal(format!("Template error: {}", e)))
  }
}
