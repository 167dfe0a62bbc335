//! # amtskern-jobs
//!
//! The durable job queue (C6, §4.6): lease-based claiming with
//! `SELECT ... FOR UPDATE SKIP LOCKED`, heartbeat extension, a static
//! handler registry, and an idempotent cron-like scheduler. At-least-once
//! execution — handlers must be idempotent (§5).

pub mod error;
pub mod handler;
pub mod scheduler;
pub mod store;
pub mod worker;

pub use error::JobError;
pub use handler::{HandlerOutcome, HandlerRegistry, JobHandler};
pub use scheduler::{ScheduleEntry, Scheduler};
pub use store::JobStore;
pub use worker::{Worker, WorkerConfig};
