//! EventDesk console
//!
//! Main application entry point

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use EventDesk::{
    config::{Settings, StorageBackend},
    database::{DatabaseService, EventStore, MemoryStore, connection::{self, DatabaseConfig}},
    handlers::handle_line,
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventDesk::info());

    match settings.database.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = connection::create_pool(&DatabaseConfig::from(&settings.database)).await?;
            connection::run_migrations(&pool).await?;
            let services = ServiceFactory::new(Arc::new(DatabaseService::new(pool)), &settings);
            run_console(services).await?;
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on exit");
            let services = ServiceFactory::new(Arc::new(MemoryStore::new()), &settings);
            run_console(services).await?;
        }
    }

    info!("EventDesk has been shut down.");
    Ok(())
}

/// Read commands from stdin until EOF or `quit`
async fn run_console<S: EventStore>(services: ServiceFactory<S>) -> anyhow::Result<()> {
    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Service health issue");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"EventDesk ready. Type `help` for commands.\n> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if !line.is_empty() {
            let reply = handle_line(&services, line).await;
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
