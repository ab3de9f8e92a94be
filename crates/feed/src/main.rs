use std::sync::Arc;

use anyhow::Context;
use campus_core::pipeline::BuildOptions;
use campus_core::store::FixedIdentity;
use campus_db::PgStore;
use campus_events::FeedBus;
use campus_feed::{lookup_identity, FeedConfig, FeedSession};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct Output<'a> {
    viewer: Option<&'a campus_core::viewer::Viewer>,
    filter: &'a campus_core::filter::FilterOptions,
    events: Vec<campus_core::join::EventViewModel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_feed=info,campus_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = FeedConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        batch_size = config.lookup_batch_size,
        tab = config.filter.tab.as_str(),
        "Loaded feed configuration"
    );

    // --- Database ---
    let pool = campus_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    campus_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    campus_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let store = Arc::new(PgStore::new(pool));

    // --- Identity ---
    let identity = match config.viewer_id {
        Some(user_id) => {
            let identity = lookup_identity(store.as_ref(), user_id).await?;
            if identity.is_none() {
                tracing::warn!(%user_id, "FEED_VIEWER_ID does not match a user");
            }
            identity
        }
        None => None,
    };

    // --- Event bus ---
    let bus = Arc::new(FeedBus::new(config.bus_capacity));
    let mut rx = bus.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            tracing::debug!(event_type = %event.event_type, "Feed event");
        }
    });

    // --- Session ---
    let session = FeedSession::new(
        store,
        Arc::new(FixedIdentity(identity)),
        BuildOptions {
            lookup_batch_size: config.lookup_batch_size,
        },
    )
    .with_bus(Arc::clone(&bus));

    session.refresh().await.context("Failed to build feed")?;

    let snapshot = session.snapshot();
    let output = Output {
        viewer: snapshot.viewer.as_ref(),
        filter: &config.filter,
        events: session.view_models(&config.filter),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    drop(session);
    drop(bus);
    listener.await.ok();
    Ok(())
}
