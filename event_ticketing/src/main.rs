// event_ticketing/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use event_ticketing::config::AppConfig;
use event_ticketing::state::AppState;
use event_ticketing::{db, pipelines, web};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE);
  // LOG_FORMAT=json for structured output.
  if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
    subscriber.json().init();
  } else {
    subscriber.init();
  }

  tracing::info!("Starting event ticketing server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;
  let store = db::connect(app_config.database_url.as_deref())
    .await
    .context("opening the store")?;
  tracing::info!(backend = store.backend(), "Store ready.");

  let admin_seed = app_config.admin_seed.clone();
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(app_config, store).context("building application state")?;

  if let Some(seed) = admin_seed {
    let created = pipelines::seed_admin(&app_state, &seed)
      .await
      .context("seeding the admin user")?;
    tracing::info!(email = %seed.email, created, "Admin seed checked.");
  }

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await?;

  Ok(())
}
