use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::{
    config::AppConfig,
    infrastructure::notifier::OperatorNotifier,
    moderation::ModerationClient,
    pipeline::{DedupStore, Orchestrator},
    server::{self, ServerState},
    slack::{ChatApi, SlackClient},
};

pub struct ImageGuardApp {
    config: Arc<AppConfig>,
    chat: Arc<dyn ChatApi>,
    orchestrator: Arc<Orchestrator>,
}

impl ImageGuardApp {
    pub fn initialize(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);

        let http_client = Client::builder()
            .user_agent(format!("imageguard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        let chat: Arc<dyn ChatApi> = Arc::new(SlackClient::new(
            http_client.clone(),
            config.slack.clone(),
            config.max_image_bytes,
        ));
        let classifier = Arc::new(ModerationClient::new(
            http_client,
            config.moderation.clone(),
        ));
        let dedup = Arc::new(DedupStore::new(&config.dedup));

        let orchestrator = Arc::new(Orchestrator::new(
            &config,
            chat.clone(),
            classifier,
            dedup,
        ));

        Ok(Self {
            config,
            chat,
            orchestrator,
        })
    }

    pub async fn run(self) -> Result<()> {
        let notifier = OperatorNotifier::new(
            self.chat.clone(),
            self.config.slack.admin_channel_id.clone(),
        );

        let app = server::router(ServerState {
            orchestrator: self.orchestrator.clone(),
        });

        let bind_addr = format!(
            "{}:{}",
            self.config.server.bind_addr, self.config.server.port
        );
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("binding to {bind_addr}"))?;
        tracing::info!(target: "server", addr = %bind_addr, "image moderation service listening");
        notifier.alert("Image moderation service started.").await;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("webhook server exited")?;

        tracing::info!(target: "server", "server stopped");
        notifier.alert("Image moderation service stopped.").await;
        Ok(())
    }
}

/// Resolves when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "server", error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(target: "server", error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!(target: "server", "shutdown signal received");
}
