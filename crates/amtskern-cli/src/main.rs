//! `amtskern` — the operator CLI (SPEC_FULL.md crate-layout row for
//! `amtskern-cli`): credential vault management, job worker/scheduler
//! bootstrap, and deadline reporting. No HTTP router, no JSON API
//! surface — those remain named collaborators, not part of this core
//! (spec.md §1/§6).

mod config;
mod handlers;
mod vault;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use amtskern_core::{JobKind, TenantId};
use amtskern_deadlines::{annual_status, monthly_status, pending_annual_years, pending_monthly_periods, Period};
use amtskern_jobs::{HandlerRegistry, JobStore, ScheduleEntry, Scheduler, Worker, WorkerConfig};
use chrono::{Datelike, NaiveDate};
use config::Config;
use handlers::{DeadlineReminderHandler, MissingCollaboratorHandler};
use vault::VaultArgs;

#[derive(Parser, Debug)]
#[command(name = "amtskern", version, about = "Operator CLI for the Amtskern business-infrastructure core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Credential vault management (§4.3, §6).
    Vault(VaultArgs),

    /// Bootstrap the durable job worker and scheduler (§4.6) against a
    /// Postgres-backed queue and run until interrupted.
    Worker(WorkerArgs),

    /// Print the backlog of due monthly or annual filings as of today
    /// (§4.7), without touching the database.
    Deadlines(DeadlineArgs),
}

#[derive(Args, Debug)]
struct WorkerArgs {
    /// Path to the TOML configuration file (§1 "Configuration").
    #[arg(long, default_value = "amtskern.toml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct DeadlineArgs {
    #[command(subcommand)]
    command: DeadlineCommand,
}

#[derive(Subcommand, Debug)]
enum DeadlineCommand {
    /// Pending monthly contribution-report periods (§4.7).
    Monthly {
        #[arg(long)]
        last_submitted_year: i32,
        #[arg(long)]
        last_submitted_month: u32,
        /// Evaluate as of this date instead of today (ISO-8601).
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Pending annual tax-form years (§4.7).
    Annual {
        #[arg(long)]
        last_submitted_year: Option<i32>,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Vault(args) => vault::run(args),
        Commands::Worker(args) => run_worker(args),
        Commands::Deadlines(args) => run_deadlines(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_deadlines(args: DeadlineArgs) -> anyhow::Result<()> {
    match args.command {
        DeadlineCommand::Monthly { last_submitted_year, last_submitted_month, as_of } => {
            let today = as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
            let last = Period::new(last_submitted_year, last_submitted_month);
            let current = Period::from_date(today);
            for period in pending_monthly_periods(last, current) {
                let status = monthly_status(period, today);
                println!(
                    "{:04}-{:02}\tdeadline={}\tdays_remaining={}\toverdue={}\turgent={}",
                    period.year, period.month, status.deadline, status.days_remaining, status.is_overdue, status.is_urgent
                );
            }
        }
        DeadlineCommand::Annual { last_submitted_year, as_of } => {
            let today = as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
            for year in pending_annual_years(last_submitted_year, today.year()) {
                let status = annual_status(year, today);
                println!("{year}\tdeadline={}\tdays_remaining={}\toverdue={}\turgent={}", status.deadline, status.days_remaining, status.is_overdue, status.is_urgent);
            }
        }
    }
    Ok(())
}

fn run_worker(args: WorkerArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_worker_async(config))
}

async fn run_worker_async(config: Config) -> anyhow::Result<()> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .min_connections(config.min_db_connections)
        .connect(&config.database_url)
        .await?;
    let tenant_id: TenantId = config.tenant_id.parse().map_err(|e| anyhow::anyhow!("invalid tenant_id in config: {e}"))?;

    let store = JobStore::new(pool);

    // Every job kind must resolve to a handler (§4.6: "Handler
    // registration is static at startup"); kinds this deployment has no
    // real collaborator for still get a handler, so the queue records
    // an honest permanent failure instead of silently stalling.
    let registry = HandlerRegistry::new()
        .register(JobKind::DeadlineReminder, Arc::new(DeadlineReminderHandler))
        .register(JobKind::DocumentAnalysis, Arc::new(MissingCollaboratorHandler { collaborator: "document analysis / OCR service" }))
        .register(JobKind::DataboxSync, Arc::new(MissingCollaboratorHandler { collaborator: "registry databox client" }))
        .register(JobKind::WatchlistCheck, Arc::new(MissingCollaboratorHandler { collaborator: "watchlist feed" }))
        .register(JobKind::SessionCleanup, Arc::new(MissingCollaboratorHandler { collaborator: "session store" }))
        .register(JobKind::WebhookDelivery, Arc::new(MissingCollaboratorHandler { collaborator: "webhook sink" }))
        .register(JobKind::AuditArchive, Arc::new(MissingCollaboratorHandler { collaborator: "audit archive sink" }));

    let worker_id = format!("{}-{}", hostname(), std::process::id());
    let worker_config = WorkerConfig {
        worker_id: worker_id.clone(),
        poll_interval: Duration::from_secs(config.worker_poll_interval_secs),
        lease_duration: chrono::Duration::seconds(config.lease_duration_secs),
        heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
        claim_batch_size: config.claim_batch_size,
        shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
    };
    let worker = Arc::new(Worker::new(store.clone(), registry, worker_config));
    let scheduler = Arc::new(Scheduler::new(store, Duration::from_secs(config.scheduler_tick_interval_secs)));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    tracing::info!(worker_id = %worker_id, "worker and scheduler starting");

    let worker_task = tokio::spawn(worker.run(shutdown_rx.clone()));
    let scheduler_task = tokio::spawn(async move { scheduler.run(shutdown_rx, move || build_schedule_entries(tenant_id)).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    shutdown_tx.send(true).ok();

    let _ = tokio::join!(worker_task, scheduler_task);
    Ok(())
}

/// Produces this tick's due jobs (§4.6 "the scheduler... creates jobs
/// on a cron-like schedule"). A session-cleanup sweep once per calendar
/// minute, idempotency-keyed so a missed or repeated tick never
/// duplicates the pending row.
fn build_schedule_entries(tenant_id: TenantId) -> Vec<ScheduleEntry> {
    let now = chrono::Utc::now();
    vec![ScheduleEntry {
        tenant_id,
        kind: JobKind::SessionCleanup,
        payload: serde_json::json!({}),
        max_attempts: 3,
        idempotency_key: format!("session-cleanup:{}", now.format("%Y-%m-%dT%H:%M")),
    }]
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "amtskern-worker".to_string())
}
