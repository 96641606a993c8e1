use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use watchlist_config::{Config, PathManager, SchedulerConfig};
use watchlist_core::{RunOptions, RunOrchestrator};

pub struct Scheduler {
    scheduler: JobScheduler,
    orchestrator: Arc<RunOrchestrator>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(orchestrator: RunOrchestrator, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| eyre!("Failed to create job scheduler: {}", e))?;

        Ok(Self {
            scheduler,
            orchestrator: Arc::new(orchestrator),
            config,
        })
    }

    /// Register the cron job, optionally run once, then block until Ctrl-C.
    pub async fn start(&mut self) -> Result<()> {
        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial watchlist run on startup");
            run_scheduled(&self.orchestrator).await;
        }

        let orchestrator = self.orchestrator.clone();
        let job = Job::new_async(self.config.schedule.as_str(), move |_id, _scheduler| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move {
                run_scheduled(&orchestrator).await;
            })
        })
        .map_err(|e| eyre!("Invalid cron schedule '{}': {}", self.config.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| eyre!("Failed to register scheduled run: {}", e))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| eyre!("Failed to start scheduler: {}", e))?;

        info!(
            operation = "scheduler_started",
            schedule = %self.config.schedule,
            "Scheduler started"
        );

        tokio::signal::ctrl_c()
            .await
            .map_err(|e| eyre!("Failed to listen for shutdown signal: {}", e))?;

        info!(operation = "scheduler_shutdown", "Shutting down scheduler");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| eyre!("Failed to stop scheduler: {}", e))?;
        Ok(())
    }
}

/// One scheduled run. Failures are logged and the daemon keeps going.
async fn run_scheduled(orchestrator: &RunOrchestrator) {
    info!(operation = "scheduled_run_start", "Starting scheduled watchlist run");
    match orchestrator.run(RunOptions::default()).await {
        Ok(summary) => {
            info!(
                operation = "scheduled_run_complete",
                records = summary.records,
                unknowns = summary.unknowns,
                looked_up = summary.looked_up,
                kept_previous = summary.kept_previous,
                duration_ms = summary.duration_ms,
                "Scheduled run completed successfully"
            );
        }
        Err(e) => {
            error!(
                operation = "scheduled_run_error",
                error = %e,
                "Scheduled run failed"
            );
        }
    }
}

/// Scheduler settings from the config file with command-line overrides.
pub fn scheduler_config(config: &Config, schedule_override: Option<String>, no_startup_run: bool) -> SchedulerConfig {
    let from_file = config.scheduler_or_default();
    SchedulerConfig {
        schedule: schedule_override.unwrap_or(from_file.schedule),
        run_on_startup: from_file.run_on_startup && !no_startup_run,
    }
}

pub async fn run_daemon(
    config: Config,
    schedule_override: Option<String>,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let scheduler_config = scheduler_config(&config, schedule_override, no_startup_run);
    let orchestrator = super::build_orchestrator(&config, None)?;

    output.info(format!(
        "Daemon running with schedule '{}'. Logs are written to {}",
        scheduler_config.schedule,
        PathManager::default().log_dir().display()
    ));

    let mut scheduler = Scheduler::new(orchestrator, scheduler_config).await?;
    scheduler.start().await
}
