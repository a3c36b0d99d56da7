//! Background reconciliation of unresolved orders against the accrual
//! authority.
//!
//! Each pass pulls every `NEW`/`PROCESSING` order, asks the authority about
//! them with bounded concurrency under one shared deadline, and writes
//! terminal verdicts back. Failures are logged and left for the next pass;
//! nothing here propagates to request handlers.
//!
//! A rate-limit response sets a single throttle shared by all orders. Lookups
//! that have not started yet are deferred, and the next pass waits the
//! throttle out before dispatching anything.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt as _, stream};
use mockable::Clock;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval, timeout_at};
use tracing::{debug, info, warn};

use crate::domain::OrderNumber;
use crate::domain::ports::{
    AccrualLookup, AccrualSource, AccrualSourceError, OrderRepository, OrderRepositoryError,
};

mod runtime;
mod state;

pub use runtime::{AccrualPollerPorts, AccrualPollerRuntime, TokioSleeper};
use state::{PassGuard, PollerState};

/// Poller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualPollerConfig {
    /// Shared deadline for all lookups dispatched by one pass.
    pub lookup_timeout: Duration,
    /// Added to the lookup timeout to form the tick interval.
    pub tick_skew: Duration,
    /// Upper bound on lookups in flight at once.
    pub max_concurrent_lookups: usize,
    /// Throttle applied when a rate-limit response carries no usable
    /// `Retry-After`.
    pub rate_limit_fallback: Duration,
}

impl AccrualPollerConfig {
    /// Interval between pass attempts.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use loyalty_backend::domain::AccrualPollerConfig;
    ///
    /// let config = AccrualPollerConfig::default();
    /// assert_eq!(config.tick_interval(), Duration::from_millis(10_120));
    /// ```
    pub fn tick_interval(&self) -> Duration {
        self.lookup_timeout.saturating_add(self.tick_skew)
    }
}

impl Default for AccrualPollerConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(10),
            tick_skew: Duration::from_millis(120),
            max_concurrent_lookups: 8,
            rate_limit_fallback: Duration::from_secs(60),
        }
    }
}

/// Async sleeping abstraction for the throttle wait.
#[async_trait]
pub trait PollSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    /// Lookups were dispatched and every unit finished or hit the deadline.
    Completed,
    /// Another pass was still running.
    SkippedOverlap,
    /// There were no unresolved orders.
    NoWork,
    /// Shutdown arrived while waiting out the throttle.
    Cancelled,
    /// The work queue could not be read.
    StoreUnavailable,
}

/// Why one order was not reconciled in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassFailureKind {
    Lookup(AccrualSourceError),
    DeadlineExceeded,
    Persist(OrderRepositoryError),
}

/// Per-order failure recorded in a [`PassReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFailure {
    pub order: OrderNumber,
    pub kind: PassFailureKind,
}

/// Aggregate outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub status: PassStatus,
    /// Unresolved orders read from the ledger.
    pub examined: usize,
    /// Terminal verdicts written back.
    pub applied: usize,
    /// Orders the authority is still deciding.
    pub pending: usize,
    /// Orders not looked up because the throttle was active.
    pub deferred: usize,
    pub failures: Vec<PassFailure>,
}

impl PassReport {
    fn empty(status: PassStatus) -> Self {
        Self {
            status,
            examined: 0,
            applied: 0,
            pending: 0,
            deferred: 0,
            failures: Vec::new(),
        }
    }
}

enum UnitOutcome {
    Applied,
    Pending,
    Deferred,
    Failed(PassFailure),
}

/// Domain-owned reconciliation poller.
pub struct AccrualPoller {
    orders: Arc<dyn OrderRepository>,
    source: Arc<dyn AccrualSource>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn PollSleeper>,
    config: AccrualPollerConfig,
    state: Mutex<PollerState>,
}

impl AccrualPoller {
    /// Build a poller using default runtime dependencies.
    pub fn new(
        ports: AccrualPollerPorts,
        clock: Arc<dyn Clock>,
        config: AccrualPollerConfig,
    ) -> Self {
        Self::with_runtime(ports, clock, AccrualPollerRuntime::default(), config)
    }

    /// Build a poller with injected runtime abstractions.
    pub fn with_runtime(
        ports: AccrualPollerPorts,
        clock: Arc<dyn Clock>,
        runtime: AccrualPollerRuntime,
        config: AccrualPollerConfig,
    ) -> Self {
        Self {
            orders: ports.orders,
            source: ports.source,
            clock,
            sleeper: runtime.sleeper,
            config,
            state: Mutex::new(PollerState::new()),
        }
    }

    /// Run passes on a fixed interval until `shutdown` turns `true` or its
    /// sender is dropped.
    ///
    /// Shutdown stops future ticks and abandons a pending throttle wait. A
    /// pass that has already dispatched lookups drains first, which takes at
    /// most one lookup timeout plus the final write-backs.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let tick_interval = self.config.tick_interval();
        let mut ticker = interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            tick_interval_ms = u64::try_from(tick_interval.as_millis()).unwrap_or(u64::MAX),
            max_concurrent_lookups = self.config.max_concurrent_lookups,
            "accrual poller started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => break,
                _ = ticker.tick() => {}
            }
            self.run_pass_with(Some(&mut shutdown)).await;
        }

        info!("accrual poller stopped");
    }

    /// Execute one reconciliation pass.
    pub async fn run_pass(&self) -> PassReport {
        self.run_pass_with(None).await
    }

    async fn run_pass_with(&self, shutdown: Option<&mut watch::Receiver<bool>>) -> PassReport {
        let Some(_guard) = PassGuard::begin(&self.state) else {
            debug!("accrual pass skipped: previous pass still running");
            return PassReport::empty(PassStatus::SkippedOverlap);
        };

        let unresolved = match self.orders.list_unresolved().await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(error = %error, "accrual pass aborted: work queue unavailable");
                return PassReport::empty(PassStatus::StoreUnavailable);
            }
        };
        if unresolved.is_empty() {
            debug!("accrual pass idle: no unresolved orders");
            return PassReport::empty(PassStatus::NoWork);
        }

        if !self.wait_out_throttle(shutdown).await {
            info!(
                examined = unresolved.len(),
                "accrual pass cancelled during throttle wait"
            );
            return PassReport {
                examined: unresolved.len(),
                ..PassReport::empty(PassStatus::Cancelled)
            };
        }

        let examined = unresolved.len();
        let deadline = Instant::now() + self.config.lookup_timeout;
        let outcomes: Vec<UnitOutcome> = stream::iter(unresolved)
            .map(|order| self.reconcile_one(order.number, deadline))
            .buffer_unordered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await;

        let report = aggregate(examined, outcomes);
        log_report(&report);
        report
    }

    /// Sleep until the shared throttle lapses. Returns `false` when shutdown
    /// interrupted the wait.
    async fn wait_out_throttle(&self, shutdown: Option<&mut watch::Receiver<bool>>) -> bool {
        let (remaining, target) = {
            let state = state::lock(&self.state);
            (
                state.throttle_remaining(self.clock.utc()),
                state.resume_target(),
            )
        };
        let (Some(remaining), Some(target)) = (remaining, target) else {
            return true;
        };

        info!(
            retry_after_secs = remaining.as_secs_f64(),
            "accrual pass waiting out rate limit"
        );
        match shutdown {
            Some(shutdown) => tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => return false,
                () = self.sleeper.sleep(remaining) => {}
            },
            None => self.sleeper.sleep(remaining).await,
        }
        state::lock(&self.state).release_throttle(target);
        true
    }

    async fn reconcile_one(&self, number: OrderNumber, deadline: Instant) -> UnitOutcome {
        if state::lock(&self.state)
            .throttle_remaining(self.clock.utc())
            .is_some()
        {
            return UnitOutcome::Deferred;
        }
        if Instant::now() >= deadline {
            return fail(number, PassFailureKind::DeadlineExceeded);
        }

        let lookup = match timeout_at(deadline, self.source.lookup(&number)).await {
            Err(_) => return fail(number, PassFailureKind::DeadlineExceeded),
            Ok(Err(error)) => {
                if let AccrualSourceError::RateLimited { retry_after } = &error {
                    let delay = retry_after.unwrap_or(self.config.rate_limit_fallback);
                    state::lock(&self.state).record_rate_limit(self.clock.utc(), delay);
                    warn!(
                        order = %number,
                        retry_after_secs = delay.as_secs(),
                        "accrual authority rate limited; throttling all lookups"
                    );
                }
                return fail(number, PassFailureKind::Lookup(error));
            }
            Ok(Ok(lookup)) => lookup,
        };

        match lookup {
            AccrualLookup::Pending { status } => {
                debug!(order = %number, ?status, "accrual still pending");
                UnitOutcome::Pending
            }
            AccrualLookup::Terminal(update) => match self.orders.apply_accrual(&update).await {
                Ok(()) => {
                    debug!(
                        order = %number,
                        status = ?update.status,
                        accrual = %update.accrual,
                        "accrual applied"
                    );
                    UnitOutcome::Applied
                }
                Err(error) => fail(number, PassFailureKind::Persist(error)),
            },
        }
    }
}

fn fail(order: OrderNumber, kind: PassFailureKind) -> UnitOutcome {
    UnitOutcome::Failed(PassFailure { order, kind })
}

fn aggregate(examined: usize, outcomes: Vec<UnitOutcome>) -> PassReport {
    let mut report = PassReport {
        examined,
        ..PassReport::empty(PassStatus::Completed)
    };
    for outcome in outcomes {
        match outcome {
            UnitOutcome::Applied => report.applied += 1,
            UnitOutcome::Pending => report.pending += 1,
            UnitOutcome::Deferred => report.deferred += 1,
            UnitOutcome::Failed(failure) => report.failures.push(failure),
        }
    }
    report
}

fn log_report(report: &PassReport) {
    for failure in &report.failures {
        match &failure.kind {
            PassFailureKind::Lookup(error) => warn!(
                order = %failure.order,
                reason = error.kind(),
                error = %error,
                "accrual lookup failed; retrying next pass"
            ),
            PassFailureKind::DeadlineExceeded => warn!(
                order = %failure.order,
                reason = "deadline",
                "accrual lookup missed the pass deadline; retrying next pass"
            ),
            PassFailureKind::Persist(error) => warn!(
                order = %failure.order,
                reason = "persist",
                error = %error,
                "accrual verdict could not be stored; retrying next pass"
            ),
        }
    }
    info!(
        examined = report.examined,
        applied = report.applied,
        pending = report.pending,
        deferred = report.deferred,
        failures = report.failures.len(),
        "accrual pass completed"
    );
}
