//! Eduledger server binary.
//!
//! Startup order matters here: configuration is validated before anything
//! connects, migrations run before the worker or server touch the schema,
//! and the worker is spawned before the server accepts requests so tasks
//! enqueued by the very first request get drained.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use eduledger::adapters::auth::JwtTokenVerifier;
use eduledger::adapters::email::ResendEmailSender;
use eduledger::adapters::http::middleware::AuthState;
use eduledger::adapters::http::server::{api_router, serve};
use eduledger::adapters::http::{CatalogAppState, PaymentsAppState, ProfileAppState};
use eduledger::adapters::postgres::{
    create_pool, PostgresAccessGranter, PostgresAuthorizer, PostgresCatalogStore,
    PostgresPaymentStore, PostgresSubscriptionStore, PostgresTaskQueue, PostgresUserDirectory,
    PostgresWebhookEventStore,
};
use eduledger::adapters::stripe::StripeGatewayClient;
use eduledger::adapters::TaskWorker;
use eduledger::config::{AppConfig, ServerConfig};
use eduledger::domain::payment::{SessionReconciler, WebhookVerifier};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("eduledger exited with error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);
    tracing::info!(
        environment = ?config.server.environment,
        port = config.server.port,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database).await?;
    tracing::info!("Database pool established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Persistence adapters share the pool.
    let payment_store = Arc::new(PostgresPaymentStore::new(pool.clone()));
    let catalog_store = Arc::new(PostgresCatalogStore::new(pool.clone()));
    let authorizer = Arc::new(PostgresAuthorizer::new(pool.clone()));
    let access_granter = Arc::new(PostgresAccessGranter::new(pool.clone()));
    let event_store = Arc::new(PostgresWebhookEventStore::new(pool.clone()));
    let subscription_store = Arc::new(PostgresSubscriptionStore::new(pool.clone()));
    let user_directory = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let task_queue = Arc::new(PostgresTaskQueue::new(
        pool.clone(),
        config.worker.max_attempts,
    ));

    // Outbound adapters.
    let gateway = Arc::new(StripeGatewayClient::new(&config.gateway));
    let email_sender = Arc::new(ResendEmailSender::new(&config.email));
    let auth: AuthState = Arc::new(JwtTokenVerifier::new(&config.auth));

    // Settlement machinery shared by webhooks and the poll fallback.
    let reconciler = Arc::new(SessionReconciler::new(
        payment_store.clone(),
        access_granter.clone(),
        task_queue.clone(),
    ));
    let webhook_verifier = Arc::new(WebhookVerifier::new(config.gateway.webhook_secret.clone()));

    let payments = PaymentsAppState {
        payment_store: payment_store.clone(),
        catalog_store: catalog_store.clone(),
        authorizer: authorizer.clone(),
        access_granter: access_granter.clone(),
        gateway,
        event_store: event_store.clone(),
        reconciler,
        webhook_verifier,
    };
    let profile = ProfileAppState {
        user_directory: user_directory.clone(),
        payment_store: payment_store.clone(),
    };
    let catalog = CatalogAppState {
        catalog_store: catalog_store.clone(),
        authorizer,
        subscription_store: subscription_store.clone(),
        task_queue: task_queue.clone(),
    };

    let worker = TaskWorker::new(
        task_queue,
        catalog_store,
        subscription_store,
        email_sender,
        user_directory,
        event_store,
        payment_store,
        access_granter,
        config.worker.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    let app = api_router(payments, profile, catalog, auth, &config.server);
    serve(app, config.server.socket_addr(), shutdown_tx).await?;

    // The listener has drained; wait for the worker's final batch.
    match worker_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Task worker exited with error"),
        Err(e) => tracing::error!(error = %e, "Task worker panicked"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
