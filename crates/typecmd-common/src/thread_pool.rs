//! Fixed-size worker pool.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct ThreadPool {
    workers: Vec<thread::JoinHandle<()>>,
    sender: Option<Sender<Job>>,
}

impl ThreadPool {
    /// Spawn `size` workers. At least one worker has to start.
    pub fn new(size: usize) -> std::io::Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            match thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, receiver))
            {
                Ok(handle) => workers.push(handle),
                Err(e) => warn!(worker = id, error = %e, "failed to spawn worker"),
            }
        }

        if workers.is_empty() {
            return Err(std::io::Error::other("Failed to spawn any worker threads"));
        }
        if workers.len() < size {
            warn!(spawned = workers.len(), requested = size, "worker pool is short");
        }

        Ok(ThreadPool {
            workers,
            sender: Some(sender),
        })
    }

    /// One worker per available core.
    pub fn with_available_parallelism() -> std::io::Result<Self> {
        let size = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(size)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue `job` for execution. The job is handed back if no worker is left
    /// to receive it.
    pub fn execute<F>(&self, job: F) -> Result<(), Job>
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(job);
        match &self.sender {
            Some(sender) => sender.send(job).map_err(|e| e.into_inner()),
            None => Err(job),
        }
    }

    /// Run every queued job, then join the workers.
    pub fn shutdown(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn worker_loop(id: usize, receiver: Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!(worker = id, "job panicked");
        }
    }
    debug!(worker = id, "worker stopped");
}
