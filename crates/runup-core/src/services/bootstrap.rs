use tokio::time::Instant;

use crate::error::Result;
use crate::models::{BootstrapConfig, BootstrapReport, Phase};
use crate::services::launch::{self, Launcher};
use crate::services::probe;
use crate::services::provision::{self, AccountDirectory};

/// Schema discovery and application, two sequential external calls. The
/// external engine owns idempotency; re-running with nothing pending is a
/// no-op.
pub trait SchemaSync {
    fn discover_changes(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn apply_changes(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Static-asset collection into the serving location.
pub trait AssetPublisher {
    fn publish(
        &self,
        overwrite: bool,
        interactive: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The top-level sequence driver. One instance per process start; runs the
/// five phases strictly in order and aborts on the first failure. There is
/// no rollback of completed phases: every external step is safe to invoke
/// again on the next start.
pub struct Bootstrap<S, A, D, L> {
    config: BootstrapConfig,
    schema: S,
    assets: A,
    directory: D,
    launcher: L,
}

impl<S, A, D, L> Bootstrap<S, A, D, L>
where
    S: SchemaSync,
    A: AssetPublisher,
    D: AccountDirectory,
    L: Launcher,
{
    pub fn new(config: BootstrapConfig, schema: S, assets: A, directory: D, launcher: L) -> Self {
        Self {
            config,
            schema,
            assets,
            directory,
            launcher,
        }
    }

    /// Probing → Synchronizing → Publishing → Provisioning → Launching.
    ///
    /// Returns the exit code of the launched application process; the caller
    /// forwards it as its own.
    pub async fn run(&self) -> Result<i32> {
        let mut report = BootstrapReport::new();

        tracing::info!(database = %self.config.database, "waiting for dependency");
        let started = Instant::now();
        probe::await_ready(
            &self.config.database,
            self.config.poll_interval,
            self.config.max_wait,
        )
        .await?;
        report.record(Phase::Probing, started.elapsed());

        tracing::info!("synchronizing schema");
        let started = Instant::now();
        self.schema.discover_changes().await?;
        self.schema.apply_changes().await?;
        report.record(Phase::Synchronizing, started.elapsed());

        tracing::info!("publishing static assets");
        let started = Instant::now();
        self.assets.publish(true, false).await?;
        report.record(Phase::Publishing, started.elapsed());

        tracing::info!("provisioning privileged account");
        let started = Instant::now();
        let outcome =
            provision::ensure_privileged_account(&self.directory, &self.config.admin).await?;
        report.provision_outcome = Some(outcome);
        report.record(Phase::Provisioning, started.elapsed());

        for record in &report.phases {
            tracing::debug!(phase = %record.phase, elapsed = ?record.elapsed, "phase complete");
        }
        tracing::info!(
            started_at = %report.started_at,
            outcome = ?report.provision_outcome,
            "bootstrap complete, handing over"
        );

        launch::launch(&self.launcher, self.config.run_mode(), &self.config).await
    }
}
