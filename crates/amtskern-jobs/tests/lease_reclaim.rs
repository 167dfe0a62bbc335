//! Scenario G of §8: a worker that claims a job and then dies without
//! heartbeating loses the lease once it expires, and a second worker
//! can reclaim and complete it exactly once.
//!
//! Skipped unless `DATABASE_URL` is set.

use amtskern_core::{JobKind, TenantId};
use amtskern_jobs::JobStore;
use chrono::Duration as ChronoDuration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PgPoolOptions::new().max_connections(5).connect(&url).await.expect("connect to test database"))
}

#[tokio::test]
async fn a_dead_workers_lease_is_reclaimed_by_a_second_worker() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let store = JobStore::new(pool);
    let tenant_id = TenantId::new();

    let job_id = store
        .enqueue(tenant_id, JobKind::SessionCleanup, serde_json::json!({}), chrono::Utc::now(), 3, None)
        .await
        .unwrap();

    // W1 claims with a lease so short it will already have expired by
    // the time W2 attempts to claim, standing in for "dies without
    // heartbeat" without a real sleep in the test.
    let expired_lease = ChronoDuration::milliseconds(-1);
    let claimed_by_w1 = store.claim("worker-1", 10, expired_lease).await.unwrap();
    assert_eq!(claimed_by_w1.len(), 1);
    assert_eq!(claimed_by_w1[0].id, job_id);

    // W1 never heartbeats or completes. A fresh worker's claim sees
    // the lease already expired and reclaims the same row.
    let claimed_by_w2 = store.claim("worker-2", 10, ChronoDuration::seconds(10)).await.unwrap();
    assert_eq!(claimed_by_w2.len(), 1);
    assert_eq!(claimed_by_w2[0].id, job_id);

    // W1's heartbeat now fails: it no longer holds the lease.
    let w1_heartbeat = store.heartbeat(job_id, "worker-1", ChronoDuration::seconds(10)).await;
    assert!(w1_heartbeat.is_err());

    // W2 completes successfully; the domain effect happens exactly once.
    store.complete_success(job_id, "worker-2", serde_json::json!({"ok": true})).await.unwrap();
    let job = store.get(job_id).await.unwrap();
    assert_eq!(job.status, amtskern_core::JobStatus::Succeeded);

    // W1 can no longer complete the job it lost the lease on.
    let w1_complete = store.complete_success(job_id, "worker-1", serde_json::json!({"ok": true})).await;
    assert!(w1_complete.is_err());
}
