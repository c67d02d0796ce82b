//! Fixed-size worker pool with a recursion-safe completion barrier.
//!
//! Tasks may submit further tasks while they run (directory walks and link
//! discovery both do). The barrier therefore tracks outstanding work, the
//! number of submitted tasks minus the number of completed ones, instead of
//! waiting for the queue to look empty. A task increments the counter for
//! its children before its own completion decrements it, so the count
//! cannot touch zero while any part of the task graph is still alive.

use crate::error::{EngineError, EngineResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 5;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct State {
    tasks: VecDeque<Task>,
    /// Submitted but not yet completed (queued + running)
    pending: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    /// Signalled when a task is queued or the pool shuts down
    work_ready: Condvar,
    /// Signalled when `pending` drops to zero
    all_done: Condvar,
}

/// Cloneable handle for submitting work to a [`WorkQueue`].
///
/// Tasks hold one of these to schedule follow-up work. Dropping a handle
/// never joins the workers, so it is safe to drop from inside a task.
#[derive(Clone)]
pub struct Executor {
    shared: Arc<Shared>,
}

impl Executor {
    /// Queue a task. Fails once the pool has been shut down.
    pub fn execute<F>(&self, task: F) -> EngineResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(EngineError::PoolShutDown);
        }
        state.pending += 1;
        state.tasks.push_back(Box::new(task));
        drop(state);

        self.shared.work_ready.notify_one();
        Ok(())
    }

    /// Block until every submitted task, including tasks submitted by other
    /// tasks, has completed.
    ///
    /// Must not be called from inside a task: the calling worker would be
    /// waiting on its own completion.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.all_done.wait(&mut state);
        }
    }

    /// Stop accepting work. Queued tasks still run; workers exit once the
    /// queue is drained. Irreversible.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        drop(state);

        self.shared.work_ready.notify_all();
    }

    /// Tasks submitted but not yet completed
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending
    }

    /// Tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    fn complete_one(&self) {
        let mut state = self.shared.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.shared.all_done.notify_all();
        }
    }
}

/// Owns the worker threads. Dropping the queue shuts it down and joins
/// every worker.
pub struct WorkQueue {
    executor: Executor,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    /// Start a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> EngineResult<Self> {
        let threads = threads.max(1);
        let executor = Executor {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    tasks: VecDeque::new(),
                    pending: 0,
                    shutdown: false,
                }),
                work_ready: Condvar::new(),
                all_done: Condvar::new(),
            }),
        };

        let mut workers = Vec::with_capacity(threads);
        for id in 0..threads {
            let handle = executor.clone();
            let spawned = thread::Builder::new()
                .name(format!("stemdex-worker-{id}"))
                .spawn(move || worker_loop(handle, id));

            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Release the workers that did start before bailing out.
                    executor.shutdown();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(EngineError::Spawn(e));
                }
            }
        }

        debug!(threads, "work queue started");
        Ok(Self { executor, workers })
    }

    /// A handle that tasks can capture to submit more work
    pub fn executor(&self) -> Executor {
        self.executor.clone()
    }

    pub fn execute<F>(&self, task: F) -> EngineResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.executor.execute(task)
    }

    pub fn finish(&self) {
        self.executor.finish();
    }

    pub fn shutdown(&self) {
        self.executor.shutdown();
    }

    pub fn pending(&self) -> usize {
        self.executor.pending()
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Wait for outstanding work, shut down and join all workers.
    pub fn join(mut self) {
        self.finish();
        self.stop_workers();
    }

    fn stop_workers(&mut self) {
        self.executor.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

fn worker_loop(executor: Executor, id: usize) {
    loop {
        let task = {
            let mut state = executor.shared.state.lock();
            loop {
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                if state.shutdown {
                    debug!(worker = id, "worker exiting");
                    return;
                }
                executor.shared.work_ready.wait(&mut state);
            }
        };

        // A panicking task must still be counted as complete, otherwise
        // `finish` would wait forever.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            error!(worker = id, reason = panic_message(payload.as_ref()), "task panicked");
        }
        executor.complete_one();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
