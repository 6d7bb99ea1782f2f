//! Shared utilities for typecmd crates.
//!
//! Lock helpers, string helpers, an inter-thread queue, a worker pool and
//! a time probe.

#![deny(clippy::all)]

pub mod queue;
pub mod strings;
mod sync;
pub mod thread_pool;
pub mod time_probe;

pub use queue::PopResult;
pub use queue::Queue;
pub use sync::mutex_lock_or_recover;
pub use sync::poison_recovery_count;
pub use sync::rwlock_read_or_recover;
pub use sync::rwlock_write_or_recover;
pub use sync::wait_timeout_while_or_recover;
pub use sync::wait_while_or_recover;
pub use thread_pool::ThreadPool;
pub use time_probe::TimeProbe;
