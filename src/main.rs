use hospital_scraper::telemetry::init_telemetry;
use hospital_scraper::web::{self, AppState};
use hospital_scraper::{ScraperService, Settings, StatusStore};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    let config = settings.scraper_config();

    let log_path = init_telemetry(&config.output_dir)?;
    info!("Starting hospital-scraper...");
    info!("Output directory: {:?}", config.output_dir);
    info!("Log file: {:?}", log_path);

    let status = StatusStore::new();
    let service = ScraperService::new(config, status, settings.scraper.max_concurrent_tasks);
    let app = web::router(AppState::new(service, settings.session.ttl_secs));

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
