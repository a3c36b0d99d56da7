//! Loyalty backend entry-point: settings, storage, poller and HTTP server.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use loyalty_backend::domain::ports::OrderRepository;
use loyalty_backend::domain::{
    AccountService, AccrualPoller, AccrualPollerPorts, LoyaltyService,
};
use loyalty_backend::inbound::http::health::HealthState;
use loyalty_backend::inbound::http::session_config::session_key;
use loyalty_backend::inbound::http::state::HttpState;
use loyalty_backend::outbound::accrual::AccrualHttpSource;
use loyalty_backend::outbound::credentials::Argon2CredentialHasher;
use loyalty_backend::outbound::persistence::{
    DbPool, DieselBalanceRepository, DieselOrderRepository, DieselUserRepository, PoolConfig,
    run_migrations,
};
use loyalty_backend::settings::LoyaltySettings;
use server::{ServerConfig, create_server};

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn other(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = LoyaltySettings::load_from_iter(std::env::args_os()).map_err(other)?;
    init_tracing(settings.log_level());

    let database_uri = settings.database_uri().map_err(other)?.to_owned();
    let poller_config = settings.poller_config().map_err(other)?;
    let accrual_base = settings.accrual_base_url().map_err(other)?;
    let key = session_key(settings.session_key_file.as_deref()).map_err(other)?;

    run_migrations(&database_uri).await.map_err(other)?;
    let pool = DbPool::new(PoolConfig::new(database_uri))
        .await
        .map_err(other)?;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
    let balances = Arc::new(DieselBalanceRepository::new(pool));
    let source = Arc::new(
        AccrualHttpSource::new(accrual_base, poller_config.lookup_timeout).map_err(other)?,
    );

    let poller = Arc::new(AccrualPoller::new(
        AccrualPollerPorts::new(orders.clone() as Arc<dyn OrderRepository>, source),
        Arc::new(DefaultClock),
        poller_config,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn({
        let poller = Arc::clone(&poller);
        async move { poller.run(shutdown_rx).await }
    });

    let loyalty = Arc::new(LoyaltyService::new(orders, balances));
    let accounts = Arc::new(AccountService::new(
        users,
        Arc::new(Argon2CredentialHasher),
    ));
    let http_state = web::Data::new(HttpState::new(accounts, loyalty.clone(), loyalty));
    let health_state = web::Data::new(HealthState::new());

    let config = ServerConfig::new(key, !settings.insecure_cookies, settings.run_address());
    info!(address = settings.run_address(), "starting HTTP server");
    let result = create_server(health_state.clone(), http_state, config)?.await;

    health_state.mark_unhealthy();
    if shutdown_tx.send(true).is_err() {
        warn!("accrual poller already stopped before shutdown signal");
    }
    if let Err(join_error) = poller_task.await {
        error!(error = %join_error, "accrual poller task failed");
    }
    info!("shutdown complete");
    result
}
