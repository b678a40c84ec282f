use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicer::{
  adapters::http::{
    InvoiceRouteDependencies, TemplateEngine, configure_invoice_routes, health_check,
  },
  application::invoice::{
    ChangeInvoiceStatusUseCase, CreateInvoiceUseCase, ExportInvoicePdfUseCase,
    GetInvoiceDetailsUseCase, ListInvoicesUseCase,
  },
  domain::invoice::{InvoiceNumberGenerator, InvoiceService, PdfGenerator},
  infrastructure::{
    config::Config,
    pdf::WkHtmlToPdfGenerator,
    persistence::postgres::{PostgresInvoiceNumberSequence, PostgresInvoiceRepository},
  },
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoicer=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting invoicer");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  let numbering_policy = config
    .invoicing
    .numbering_policy()
    .context("Invalid [invoicing] numbering settings")?;
  let invoice_defaults = config
    .invoicing
    .invoice_defaults()
    .context("Invalid [invoicing] defaults")?;

  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .with_context(|| {
    format!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Could not connect to database")?;

  tracing::info!("Database connection pool created");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  // Repositories
  let invoice_repo = Arc::new(PostgresInvoiceRepository::new(db_pool.clone()));
  let number_sequence = Arc::new(PostgresInvoiceNumberSequence::new(db_pool.clone()));

  let number_generator =
    InvoiceNumberGenerator::new(number_sequence, invoice_repo.clone(), numbering_policy);
  let invoice_service = Arc::new(InvoiceService::new(invoice_repo, number_generator));

  let templates = TemplateEngine::new().context("Failed to initialize template engine")?;
  tracing::info!("Template engine initialized");

  let pdf_generator: Arc<dyn PdfGenerator> = Arc::new(WkHtmlToPdfGenerator::new(
    PathBuf::from(&config.pdf.output_dir),
    config.pdf.wkhtmltopdf_path.clone(),
  ));

  let deps = InvoiceRouteDependencies {
    create_invoice_use_case: Arc::new(CreateInvoiceUseCase::new(
      invoice_service.clone(),
      invoice_defaults,
    )),
    list_invoices_use_case: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
    get_invoice_details_use_case: Arc::new(GetInvoiceDetailsUseCase::new(
      invoice_service.clone(),
    )),
    change_invoice_status_use_case: Arc::new(ChangeInvoiceStatusUseCase::new(
      invoice_service.clone(),
    )),
    export_invoice_pdf_use_case: Arc::new(ExportInvoicePdfUseCase::new(
      invoice_service,
      Arc::new(templates),
      pdf_generator,
    )),
  };

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let deps = deps.clone();
    App::new()
      .wrap(Logger::default())
      .service(
        web::scope("/api/v1/invoices").configure(move |cfg| configure_invoice_routes(cfg, deps)),
      )
      .route("/health", web::get().to(health_check))
  })
  .bind((server_host.as_str(), server_port))
  .with_context(|| format!("Failed to bind {}:{}", server_host, server_port))?
  .run()
  .await
  .context("HTTP server error")?;

  Ok(())
}
