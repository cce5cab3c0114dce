//! Startup sequencing, listener ownership, and process-wide fault
//! containment.
//!
//! The [`Application`] is an explicitly constructed, explicitly owned value:
//! it holds the bound listener, the composed pipeline, the shutdown
//! coordinator, and the fault channel. Nothing in the process relies on
//! ambient global server state.
//!
//! Two fault classes get two distinct containment strategies:
//! - a supervised task that completes with an error leaves the synchronous
//!   world intact, so the listener is drained gracefully before exiting;
//! - a supervised task that panics leaves unknown state behind, so the run
//!   loop returns immediately without attempting the drain.

use std::future::Future;
use std::io;
use std::pin::{pin, Pin};
use std::process::ExitCode;
use std::sync::Once;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use venuity_core::Environment;

use crate::config::AppConfig;

/// How the run loop ended; `main` maps this to the process exit status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Intentional shutdown (signal or explicit trigger) after a clean drain.
    Graceful,
    /// A fault ended the process; exit non-zero so the orchestrator restarts.
    Fatal,
}

impl Termination {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Termination::Graceful => ExitCode::SUCCESS,
            Termination::Fatal => ExitCode::FAILURE,
        }
    }
}

/// Classification of a process-wide fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// A supervised task completed with an error; drain before exiting.
    TaskFailed,
    /// A supervised task panicked; exit immediately, no drain.
    TaskPanicked,
}

/// Ephemeral record of a fault, consumed by exactly one containment path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    pub kind: FaultKind,
    pub message: String,
}

/// Coordinator for graceful shutdown.
///
/// Broadcast channel every drain-aware task can subscribe to; triggering is
/// idempotent and never blocks.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Signal every subscriber to stop accepting new work.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for spawning background work whose terminal failures become
/// [`FaultRecord`]s on the process fault channel.
#[derive(Clone)]
pub struct Supervisor {
    faults: mpsc::Sender<FaultRecord>,
}

impl Supervisor {
    /// Spawn `task` and report its terminal failure, if any.
    ///
    /// An `Err` completion is reported as [`FaultKind::TaskFailed`]; a panic
    /// as [`FaultKind::TaskPanicked`]. Clean completion and runtime-shutdown
    /// cancellation report nothing.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let faults = self.faults.clone();
        let handle = tokio::spawn(task);

        tokio::spawn(async move {
            let record = match handle.await {
                Ok(Ok(())) => return,
                Ok(Err(err)) => FaultRecord {
                    kind: FaultKind::TaskFailed,
                    message: format!("{name}: {err:#}"),
                },
                Err(join_err) if join_err.is_panic() => FaultRecord {
                    kind: FaultKind::TaskPanicked,
                    message: format!("{name}: {join_err}"),
                },
                // Cancelled during runtime teardown; not a fault.
                Err(_) => return,
            };

            let _ = faults.send(record).await;
        });
    }
}

/// The server instance: one per process, created after the database attempt
/// completes, destroyed exactly once when the run loop returns.
pub struct Application {
    listener: TcpListener,
    router: Router,
    port: u16,
    environment: Environment,
    shutdown: Shutdown,
    // Subscribed at construction so a trigger is never lost between build
    // and the run loop picking it up.
    drain: broadcast::Receiver<()>,
    supervisor: Supervisor,
    faults: mpsc::Receiver<FaultRecord>,
    grace: Duration,
}

impl Application {
    /// Compose the pipeline and bind the configured port.
    ///
    /// A bind failure is startup-fatal for the caller; no fault handlers are
    /// installed until the listener exists.
    pub async fn build(config: &AppConfig, api_routes: Router) -> io::Result<Self> {
        let router = crate::app::build_app(config, api_routes);

        let listener =
            TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, config.port)).await?;
        let port = listener.local_addr()?.port();

        let (faults_tx, faults_rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let drain = shutdown.subscribe();

        Ok(Self {
            listener,
            router,
            port,
            environment: config.environment,
            shutdown,
            drain,
            supervisor: Supervisor { faults: faults_tx },
            faults: faults_rx,
            grace: config.shutdown_grace,
        })
    }

    /// Resolved listening port (useful when configured as 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Handle for supervising background tasks.
    pub fn supervisor(&self) -> Supervisor {
        self.supervisor.clone()
    }

    /// Handle for triggering graceful shutdown explicitly.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Serve until a termination signal, an explicit shutdown trigger, or a
    /// fault ends the process. Returns how it ended.
    pub async fn run_until_stopped(self) -> Termination {
        install_panic_logger();

        let Application {
            listener,
            router,
            shutdown,
            drain: mut drain_rx,
            mut faults,
            grace,
            ..
        } = self;

        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = drain_rx.recv().await;
        });
        let mut server = pin!(server);

        tokio::select! {
            result = &mut server => match result {
                Ok(()) => Termination::Graceful,
                Err(err) => {
                    tracing::error!(error = %err, "server terminated unexpectedly");
                    Termination::Fatal
                }
            },

            _ = terminate_signal() => {
                tracing::info!("shutdown signal received, draining connections");
                shutdown.trigger();
                drain(server.as_mut(), grace).await;
                Termination::Graceful
            }

            Some(fault) = faults.recv() => match fault.kind {
                FaultKind::TaskFailed => {
                    tracing::error!(fault = %fault.message, "background task failed, draining before exit");
                    shutdown.trigger();
                    drain(server.as_mut(), grace).await;
                    Termination::Fatal
                }
                FaultKind::TaskPanicked => {
                    tracing::error!(fault = %fault.message, "background task panicked, terminating immediately");
                    Termination::Fatal
                }
            },
        }
    }
}

/// Stop accepting connections and let in-flight requests finish, bounded by
/// the grace period.
async fn drain(server: Pin<&mut impl Future<Output = io::Result<()>>>, grace: Duration) {
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(())) => tracing::info!("connections drained"),
        Ok(Err(err)) => tracing::error!(error = %err, "server error while draining"),
        Err(_) => tracing::warn!(
            grace_secs = grace.as_secs(),
            "grace period elapsed before all connections drained"
        ),
    }
}

/// Resolve when the process is asked to terminate (ctrl-c, or SIGTERM on
/// unix).
async fn terminate_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}

/// Route panic messages through tracing so nothing dies silently, then defer
/// to the previous hook. Request-handler panics are additionally contained by
/// the pipeline's outermost stage.
fn install_panic_logger() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(panic = %info, "panic");
            previous(info);
        }));
    });
}
