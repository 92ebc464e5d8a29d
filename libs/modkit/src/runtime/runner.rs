//! ModKit runtime runner.
//!
//! One stable `ModuleCtx` is built up front and reused across all phases
//! (init → db → rest → start → wait → stop). Shutdown is driven by OS
//! signals, an external `CancellationToken`, or an arbitrary future.

use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use modkit_db::DbHandle;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Deferred database connection, opened right before the init phase.
pub type DbFactory = Box<
    dyn FnOnce() -> Pin<Box<dyn Future<Output = anyhow::Result<Arc<DbHandle>>> + Send>> + Send,
>;

/// How the runtime should provide a database to modules.
pub enum DbOptions {
    /// No database. `ModuleCtx::db()` is `None` and the db phase is skipped.
    None,
    /// An already connected handle.
    Existing(Arc<DbHandle>),
    /// Connect lazily through the factory.
    Auto(DbFactory),
}

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    /// Modules to run, already topo-sorted.
    pub registry: ModuleRegistry,
    /// Provider of module config sections (raw JSON by module name).
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
}

/// Full cycle: init → db → rest → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        registry,
        modules_cfg,
        db,
        shutdown,
    } = opts;

    let cancel = match &shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };
    spawn_shutdown_waiter(shutdown, cancel.clone());

    let db = match db {
        DbOptions::None => None,
        DbOptions::Existing(handle) => Some(handle),
        DbOptions::Auto(factory) => Some(factory().await?),
    };

    let mut ctx_builder =
        ModuleCtxBuilder::new(cancel.clone()).with_config_provider(modules_cfg);
    if let Some(handle) = &db {
        ctx_builder = ctx_builder.with_db(handle.clone());
    }
    let base_ctx = ctx_builder.build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let Some(handle) = &db {
        tracing::info!(engine = ?handle.engine(), "Phase: db");
        registry.run_db_phase(handle).await?;
    }

    tracing::info!("Phase: rest");
    let _ = registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    if let Err(e) = registry.run_start_phase(cancel.clone()).await {
        cancel.cancel();
        registry.run_stop_phase(cancel).await;
        return Err(e.into());
    }

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;

    if let Some(handle) = db {
        handle.close().await;
    }
    Ok(())
}

fn spawn_shutdown_waiter(shutdown: ShutdownOptions, cancel: CancellationToken) {
    match shutdown {
        ShutdownOptions::Signals => {
            tokio::spawn(async move {
                match shutdown::wait_for_shutdown().await {
                    Ok(()) => tracing::info!("shutdown: signal received"),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: primary waiter failed; falling back to ctrl_c()"
                        );
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                cancel.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                cancel.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }
}
