//! # amtskern-submissions
//!
//! The submission engine (C5, §4.5) — "the heart": the durable state
//! machine that ties the domain validator (C2), the envelope codec and
//! protocol client (C1/C4), advisory-lock-guarded single-flight submit,
//! and Postgres persistence together into `create`/`validate`/`submit`/
//! `retry`/`correct`/`detect-change`/`apply-change`/`delete`.

pub mod credentials;
pub mod engine;
pub mod error;
pub mod lock;
pub mod serializers;
pub mod store;

pub use credentials::{client_for, EndpointConfig};
pub use engine::SubmissionEngine;
pub use error::EngineError;
pub use lock::{AdvisoryLock, InProcessLock};
pub use store::{LineItemRow, SubmissionStore};
