//! Per-submission advisory lock (§4.5, §5, §9 design note).
//!
//! "Advisory locks for single-flight submit — express at the DB layer
//! as an advisory lock keyed by submission id, not as an in-memory
//! mutex, because workers may be multi-process." `submit` therefore
//! opens a Postgres transaction, attempts a non-blocking
//! `pg_try_advisory_xact_lock`, and either runs the whole submit
//! protocol inside that transaction or, if the lock is already held by
//! another in-flight call, reports [`DomainError::Conflict`] without
//! touching the wire.
//!
//! A `UUID` doesn't fit a single advisory-lock key, so it's split into
//! two `i32`s and passed to the two-key form of the function — the
//! same trick used for 128-bit keys in every advisory-lock recipe.

use std::collections::HashSet;
use std::sync::Mutex;

use amtskern_core::SubmissionId;
use sqlx::{Postgres, Transaction};

fn lock_keys(id: SubmissionId) -> (i32, i32) {
    let bytes = id.as_uuid().as_bytes();
    let hi = i32::from_be_bytes(bytes[0..4].try_into().unwrap());
    let lo = i32::from_be_bytes(bytes[4..8].try_into().unwrap());
    (hi, lo)
}

/// Attempt to acquire the advisory lock for `id` within `tx`, without
/// blocking. Releases automatically when `tx` commits or rolls back —
/// never held past the transaction that owns it.
pub async fn try_acquire(tx: &mut Transaction<'_, Postgres>, id: SubmissionId) -> Result<bool, sqlx::Error> {
    let (hi, lo) = lock_keys(id);
    let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_xact_lock($1, $2)")
        .bind(hi)
        .bind(lo)
        .fetch_one(&mut **tx)
        .await?;
    Ok(acquired)
}

/// Single-flight locking abstraction keyed by submission id (§4.5, §9
/// design note). The engine itself is written against
/// [`try_acquire`]/a live Postgres transaction; this trait exists so
/// the same "one in-flight submit per id" guarantee can be exercised
/// in a unit test or a single-node deployment without a database.
///
/// A held lock releases when the guard returned by `try_acquire` is
/// dropped, mirroring how the Postgres-backed lock releases when its
/// owning transaction ends.
pub trait AdvisoryLock {
    type Guard<'a>
    where
        Self: 'a;

    fn try_acquire(&self, id: SubmissionId) -> Option<Self::Guard<'_>>;
}

/// In-process, `Mutex`-keyed advisory lock for single-node deployments
/// and tests that don't want a live Postgres (§9 design note: "a
/// library crate cannot assume a live Postgres is always present for
/// unit tests"). Never crosses a process boundary — two separate
/// `InProcessLock`s do not see each other's held ids.
#[derive(Default)]
pub struct InProcessLock {
    held: Mutex<HashSet<SubmissionId>>,
}

impl InProcessLock {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Releases the id from the held set on drop, regardless of how the
/// guard goes out of scope (normal return or unwind).
pub struct InProcessLockGuard<'a> {
    lock: &'a InProcessLock,
    id: SubmissionId,
}

impl Drop for InProcessLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.lock().unwrap().remove(&self.id);
    }
}

impl AdvisoryLock for InProcessLock {
    type Guard<'a> = InProcessLockGuard<'a> where Self: 'a;

    fn try_acquire(&self, id: SubmissionId) -> Option<Self::Guard<'_>> {
        let mut held = self.held.lock().unwrap();
        if held.insert(id) {
            drop(held);
            Some(InProcessLockGuard { lock: self, id })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_ids_usually_produce_distinct_keys() {
        let a = lock_keys(SubmissionId::new());
        let b = lock_keys(SubmissionId::new());
        assert_ne!(a, b);
    }

    #[test]
    fn in_process_lock_refuses_a_second_concurrent_acquire() {
        let lock = InProcessLock::new();
        let id = SubmissionId::new();
        let first = lock.try_acquire(id);
        assert!(first.is_some());
        assert!(lock.try_acquire(id).is_none());
    }

    #[test]
    fn in_process_lock_releases_on_guard_drop() {
        let lock = InProcessLock::new();
        let id = SubmissionId::new();
        {
            let _guard = lock.try_acquire(id).unwrap();
        }
        assert!(lock.try_acquire(id).is_some());
    }

    #[test]
    fn in_process_lock_tracks_distinct_ids_independently() {
        let lock = InProcessLock::new();
        let a = SubmissionId::new();
        let b = SubmissionId::new();
        let _guard_a = lock.try_acquire(a).unwrap();
        assert!(lock.try_acquire(b).is_some());
    }
}
