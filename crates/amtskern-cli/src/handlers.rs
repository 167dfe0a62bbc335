//! Concrete [`JobHandler`] implementations (§4.6).
//!
//! `DeadlineReminderHandler` is a real handler: it is pure calendar
//! arithmetic over `amtskern-deadlines` and needs no collaborator this
//! crate doesn't already have. The remaining kinds each require a
//! consumed interface the core declares but does not implement — object
//! storage, an LLM classifier, a webhook sink, the HTTP/session surface,
//! or a registry watchlist feed — so they fail permanently with a
//! message naming the missing collaborator rather than pretending to
//! do the work.

use async_trait::async_trait;
use chrono::Datelike;
use serde::Deserialize;

use amtskern_core::Job;
use amtskern_deadlines::{annual_status, monthly_status, pending_annual_years, pending_monthly_periods, Period};
use amtskern_jobs::{HandlerOutcome, JobHandler};
use amtskern_protocol::CancellationToken;

#[derive(Deserialize)]
#[serde(tag = "report_kind", rename_all = "snake_case")]
enum DeadlineReminderPayload {
    Monthly {
        last_submitted_year: i32,
        last_submitted_month: u32,
    },
    Annual {
        last_submitted_year: Option<i32>,
    },
}

/// Computes the backlog of due monthly or annual filings as of today and
/// returns it as the job result; a downstream webhook-delivery job (out
/// of this core's scope) is expected to act on it.
pub struct DeadlineReminderHandler;

#[async_trait]
impl JobHandler for DeadlineReminderHandler {
    async fn handle(&self, job: &Job, _cancellation: &CancellationToken) -> HandlerOutcome {
        let payload: DeadlineReminderPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(p) => p,
            Err(e) => return HandlerOutcome::PermanentFailure(format!("malformed deadline-reminder payload: {e}")),
        };
        let today = chrono::Utc::now().date_naive();

        match payload {
            DeadlineReminderPayload::Monthly { last_submitted_year, last_submitted_month } => {
                let last = Period::new(last_submitted_year, last_submitted_month);
                let current = Period::from_date(today);
                let due: Vec<_> = pending_monthly_periods(last, current)
                    .into_iter()
                    .map(|period| {
                        let status = monthly_status(period, today);
                        serde_json::json!({
                            "period": format!("{:04}-{:02}", period.year, period.month),
                            "deadline": status.deadline,
                            "days_remaining": status.days_remaining,
                            "is_overdue": status.is_overdue,
                            "is_urgent": status.is_urgent,
                        })
                    })
                    .collect();
                HandlerOutcome::Success(serde_json::json!({ "due_monthly_periods": due }))
            }
            DeadlineReminderPayload::Annual { last_submitted_year } => {
                let due: Vec<_> = pending_annual_years(last_submitted_year, today.year())
                    .into_iter()
                    .map(|year| {
                        let status = annual_status(year, today);
                        serde_json::json!({
                            "reporting_year": year,
                            "deadline": status.deadline,
                            "days_remaining": status.days_remaining,
                            "is_overdue": status.is_overdue,
                            "is_urgent": status.is_urgent,
                        })
                    })
                    .collect();
                HandlerOutcome::Success(serde_json::json!({ "due_annual_years": due }))
            }
        }
    }
}

/// A handler stand-in for a job kind whose work depends on a consumed
/// interface this core declares but does not implement (§4.6 note on
/// consumed interfaces). Always fails permanently rather than silently
/// no-opping, so the queue surfaces the gap instead of hiding it.
pub struct MissingCollaboratorHandler {
    pub collaborator: &'static str,
}

#[async_trait]
impl JobHandler for MissingCollaboratorHandler {
    async fn handle(&self, _job: &Job, _cancellation: &CancellationToken) -> HandlerOutcome {
        HandlerOutcome::PermanentFailure(format!("no {} configured for this deployment; the core declares this as a consumed interface, not an implementation", self.collaborator))
    }
}
