//! bouncerd - gatekeeper daemon for public-officer group chats.

use officer_bouncer::config::{Config, validate};
use officer_bouncer::db::Database;
use officer_bouncer::gateway::Gateway;
use officer_bouncer::transport::TelegramClient;
use officer_bouncer::{Bouncer, http, metrics, telemetry};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init(std::env::var("BOUNCER_LOG_JSON").is_ok());

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        grace_period_secs = config.bouncer.grace_period_secs,
        direct_join_ban_secs = config.bouncer.direct_join_ban_secs,
        "Starting bouncerd"
    );

    let db = Arc::new(Database::new(&config.database.path).await?);

    // Convention: port 0 disables the HTTP endpoint.
    if config.metrics.port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        let port = config.metrics.port;
        tokio::spawn(async move {
            http::run_http_server(port).await;
        });
    }

    let client = Arc::new(TelegramClient::new(&config.bot)?);
    let bouncer = Arc::new(Bouncer::new(
        client.clone(),
        db.clone(),
        db.clone(),
        config.bouncer.clone(),
    ));

    let gateway = Gateway::connect(client, bouncer, config.bot.poll_timeout_secs).await?;

    gateway
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    db.pool().close().await;
    info!("bouncerd stopped");
    Ok(())
}
