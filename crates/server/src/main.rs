//! Logsift all-in-one binary: ingestion and worker apps in one process,
//! wired through the in-memory channel and store.

use server::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServiceConfig::load()?;
    server::run(config).await?;

    Ok(())
}
