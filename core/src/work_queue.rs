//! A fixed pool of worker threads draining one unbounded FIFO queue.
//!
//! `finish` is a drain barrier: it waits until every task submitted so far,
//! including tasks submitted while it waits, has run. `shutdown` lets the workers
//! exit once the queue is empty. A task that returns an error or panics is logged
//! and still counted as done.

use anyhow::Result;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const DEFAULT_THREADS: usize = 5;

type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

#[derive(Default)]
struct State {
    tasks: VecDeque<Task>,
    pending: usize,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    available: Condvar,
    idle: Condvar,
}

pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    /// Start `threads` workers (at least one).
    pub fn new(threads: usize) -> io::Result<Self> {
        let threads = threads.max(1);
        let mut queue = Self { shared: Arc::new(Shared::default()), workers: Vec::with_capacity(threads) };
        for id in 0..threads {
            let shared = Arc::clone(&queue.shared);
            let worker = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || work(&shared))?;
            queue.workers.push(worker);
        }
        tracing::debug!(threads, "work queue started");
        Ok(queue)
    }

    pub fn size(&self) -> usize { self.workers.len() }

    /// Enqueue a task without waiting for a free worker.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            tracing::warn!("work queue is shut down, dropping task");
            return;
        }
        state.pending += 1;
        state.tasks.push_back(Box::new(task));
        drop(state);
        self.shared.available.notify_one();
    }

    /// Block until no submitted task is queued or running.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Ask the workers to exit once the queue has drained. Does not wait.
    pub fn shutdown(&self) {
        self.shared.state.lock().shutdown = true;
        self.shared.available.notify_all();
    }

    /// Shut down and wait for every worker thread to exit.
    pub fn join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown();
        // The last owner may be a task; its own worker exits on its own once the queue drains.
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                tracing::error!("worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn work(shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                if state.shutdown {
                    return;
                }
                shared.available.wait(&mut state);
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("task failed: {err:#}"),
            Err(payload) => tracing::error!(reason = panic_reason(payload.as_ref()), "task panicked"),
        }

        let mut state = shared.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            shared.idle.notify_all();
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}
