//! Lock helpers that keep going after a holder panicked.
//!
//! Command bodies run under `catch_unwind`, and pool jobs may panic, so a
//! poisoned lock is an expected state rather than a reason to abort.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::warn;

static POISON_RECOVERIES: AtomicU64 = AtomicU64::new(0);

/// Number of poisoned locks recovered since process start.
pub fn poison_recovery_count() -> u64 {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}

fn note_recovery(kind: &str) {
    POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
    warn!(lock = kind, "recovered poisoned lock");
}

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        note_recovery("mutex");
        poisoned.into_inner()
    })
}

pub fn rwlock_read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        note_recovery("rwlock-read");
        poisoned.into_inner()
    })
}

pub fn rwlock_write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        note_recovery("rwlock-write");
        poisoned.into_inner()
    })
}

/// Blocks on `condvar` until `ready` returns true.
pub fn wait_while_or_recover<'a, T, F>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    mut ready: F,
) -> MutexGuard<'a, T>
where
    F: FnMut(&mut T) -> bool,
{
    condvar
        .wait_while(guard, |state| !ready(state))
        .unwrap_or_else(|poisoned| {
            note_recovery("condvar");
            poisoned.into_inner()
        })
}

/// Like [`wait_while_or_recover`], giving up after `timeout`.
///
/// The flag is true when the wait ended because the timeout elapsed.
pub fn wait_timeout_while_or_recover<'a, T, F>(
    condvar: &Condvar,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
    mut ready: F,
) -> (MutexGuard<'a, T>, bool)
where
    F: FnMut(&mut T) -> bool,
{
    let (guard, result) = condvar
        .wait_timeout_while(guard, timeout, |state| !ready(state))
        .unwrap_or_else(|poisoned| {
            note_recovery("condvar");
            poisoned.into_inner()
        });
    (guard, result.timed_out())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn poison<T: Send + 'static>(lock: Arc<Mutex<T>>) {
        let _ = thread::spawn(move || {
            let _guard = lock.lock();
            panic!("poisoning on purpose");
        })
        .join();
    }

    #[test]
    fn test_mutex_recovers_after_panic() {
        let lock = Arc::new(Mutex::new(41));
        poison(Arc::clone(&lock));
        assert!(lock.is_poisoned());

        let before = poison_recovery_count();
        let mut guard = mutex_lock_or_recover(&lock);
        *guard += 1;
        assert_eq!(*guard, 42);
        assert!(poison_recovery_count() > before);
    }

    #[test]
    fn test_rwlock_helpers_on_healthy_lock() {
        let lock = RwLock::new(String::from("a"));
        rwlock_write_or_recover(&lock).push('b');
        assert_eq!(*rwlock_read_or_recover(&lock), "ab");
    }

    #[test]
    fn test_wait_timeout_reports_timeout() {
        let lock = Mutex::new(false);
        let condvar = Condvar::new();
        let guard = mutex_lock_or_recover(&lock);
        let (guard, timed_out) =
            wait_timeout_while_or_recover(&condvar, guard, Duration::from_millis(10), |ready| {
                *ready
            });
        assert!(timed_out);
        assert!(!*guard);
    }

    #[test]
    fn test_wait_returns_when_ready() {
        let state = Arc::new((Mutex::new(false), Condvar::new()));
        let remote = Arc::clone(&state);
        let handle = thread::spawn(move || {
            let (lock, condvar) = &*remote;
            *mutex_lock_or_recover(lock) = true;
            condvar.notify_all();
        });

        let (lock, condvar) = &*state;
        let guard = wait_while_or_recover(condvar, mutex_lock_or_recover(lock), |ready| *ready);
        assert!(*guard);
        drop(guard);
        handle.join().unwrap();
    }
}
