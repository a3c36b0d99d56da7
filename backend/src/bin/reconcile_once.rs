//! Run a single accrual reconciliation pass and exit.
//!
//! Useful for draining the unresolved queue by hand or from a cron job while
//! the main server is stopped.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mockable::DefaultClock;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use loyalty_backend::domain::{
    AccrualPoller, AccrualPollerConfig, AccrualPollerPorts, PassStatus,
};
use loyalty_backend::outbound::accrual::AccrualHttpSource;
use loyalty_backend::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};

#[derive(Debug, Parser)]
#[command(name = "reconcile-once", about = "Reconcile unresolved orders once")]
struct Args {
    /// PostgreSQL connection URI.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    /// Base URL of the accrual authority.
    #[arg(long, default_value = "http://localhost:8081")]
    accrual_address: Url,
    /// Shared deadline for the pass, in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
    /// Upper bound on concurrent lookups.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    max_concurrent_lookups: u64,
}

fn other(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let config = AccrualPollerConfig {
        lookup_timeout: Duration::from_secs(args.timeout_secs),
        max_concurrent_lookups: usize::try_from(args.max_concurrent_lookups).unwrap_or(usize::MAX),
        ..AccrualPollerConfig::default()
    };

    let pool = DbPool::new(PoolConfig::new(args.database_url))
        .await
        .map_err(other)?;
    let source = AccrualHttpSource::new(args.accrual_address, config.lookup_timeout).map_err(other)?;
    let poller = AccrualPoller::new(
        AccrualPollerPorts::new(
            Arc::new(DieselOrderRepository::new(pool)),
            Arc::new(source),
        ),
        Arc::new(DefaultClock),
        config,
    );

    let report = poller.run_pass().await;
    info!(
        status = ?report.status,
        examined = report.examined,
        applied = report.applied,
        pending = report.pending,
        deferred = report.deferred,
        failures = report.failures.len(),
        "reconciliation pass finished"
    );
    if report.status == PassStatus::StoreUnavailable {
        return Err(std::io::Error::other("order store unavailable"));
    }
    Ok(())
}
