mod app;
mod config;
mod domain;
mod infrastructure;
mod moderation;
mod pipeline;
mod server;
mod slack;

use anyhow::Result;
use infrastructure::logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    logging::init_tracing(&config)?;

    let app = app::ImageGuardApp::initialize(config)?;
    app.run().await
}
