//! Store-level integration tests for the multi-step scenarios of §8
//! that need real Postgres row transitions rather than pure functions.
//!
//! Skipped unless `DATABASE_URL` is set, mirroring how the example
//! pack's own Postgres-backed integration tests degrade in the
//! absence of a live database rather than failing outright.

use amtskern_core::{
    AccountId, ContributionLineItem, Money, MonthlyContributionReportPayload, SubmissionKind,
    SubmissionPayload, SubmissionStatus, TenantId, UserId,
};
use amtskern_submissions::SubmissionStore;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PgPoolOptions::new().max_connections(5).connect(&url).await.expect("connect to test database"))
}

fn monthly_payload() -> SubmissionPayload {
    SubmissionPayload::MonthlyContributionReport(MonthlyContributionReportPayload {
        period_year: 2024,
        period_month: 11,
        line_items: vec![
            ContributionLineItem {
                sv_number: "A".into(),
                name: "Alpha".into(),
                contribution_base: Money::from_minor_units(350000),
                contribution_group: "ANG".into(),
                order_index: 0,
            },
            ContributionLineItem {
                sv_number: "B".into(),
                name: "Beta".into(),
                contribution_base: Money::from_minor_units(180000),
                contribution_group: "ANG".into(),
                order_index: 1,
            },
        ],
    })
}

/// Scenario C of §8: create then validate a monthly contribution
/// report with two line items; the row lands in `validated` and the
/// mirrored line-item table holds both positions.
#[tokio::test]
async fn monthly_contribution_report_validates_with_two_line_items() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let store = SubmissionStore::new(pool);

    let tenant_id = TenantId::new();
    let account_id = AccountId::new();
    let created_by = UserId::new();
    let payload = monthly_payload();

    let submission = store.insert_draft(tenant_id, account_id, &payload, created_by).await.unwrap();
    assert_eq!(submission.status, SubmissionStatus::Draft);
    assert_eq!(submission.payload.kind(), SubmissionKind::MonthlyContributionReport);

    if let SubmissionPayload::MonthlyContributionReport(report) = &payload {
        store.replace_line_items(submission.id, &report.line_items).await.unwrap();
    }
    let line_items = store.line_items(submission.id).await.unwrap();
    assert_eq!(line_items.len(), 2);

    store.mark_validated(tenant_id, submission.id).await.unwrap();
    let reloaded = store.get(tenant_id, submission.id).await.unwrap();
    assert_eq!(reloaded.status, SubmissionStatus::Validated);

    if let SubmissionPayload::MonthlyContributionReport(report) = &reloaded.payload {
        let (count, sum) = report.totals();
        assert_eq!(count, 2);
        assert_eq!(sum.to_decimal_string(), "5300.00");
    } else {
        panic!("expected a monthly contribution report payload");
    }
}

/// Scenario E of §8: `correct` links the new draft back to the
/// original submission and starts it over from `draft`.
#[tokio::test]
async fn correction_links_back_to_the_original_submission() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let store = SubmissionStore::new(pool);

    let tenant_id = TenantId::new();
    let account_id = AccountId::new();
    let created_by = UserId::new();
    let payload = monthly_payload();

    let original = store.insert_draft(tenant_id, account_id, &payload, created_by).await.unwrap();
    store.mark_validated(tenant_id, original.id).await.unwrap();
    store.record_success(tenant_id, original.id, "<resp/>", "P1").await.unwrap();

    let correction = store.insert_correction(tenant_id, account_id, &payload, created_by, original.id).await.unwrap();
    assert_eq!(correction.status, SubmissionStatus::Draft);
    assert!(correction.is_correction);
    assert_eq!(correction.corrects_id, Some(original.id));
    assert_ne!(correction.id, original.id);
}
