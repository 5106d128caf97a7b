use crate::error::MsortError;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, error};

/// One unit of work. Owned by the submitter until enqueued, by the queue
/// until dequeued, by a worker for the duration of execution.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Everything the workers and the submitter share, guarded by one mutex.
struct QueueState {
    tasks: VecDeque<Task>,
    /// Termination requested; workers stop dequeuing once set.
    exit: bool,
    /// Workers that have not yet observed `exit` and returned.
    active: usize,
    /// Tasks whose closure panicked. The pool has no per-task error
    /// channel; callers that care encode failure through external state.
    panicked: u64,
}

struct PoolShared {
    state: Mutex<QueueState>,
    capacity: usize,
    /// Signaled once per submitted task; broadcast on shutdown.
    task_available: Condvar,
    /// Signaled by each worker as it decrements `active` on exit.
    worker_exited: Condvar,
}

/// A fixed-size pool of OS threads draining a bounded FIFO task queue.
///
/// The queue is a real ring buffer (`VecDeque`) with a hard capacity:
/// submitting past it is a `QueueFull` error, never silent corruption.
/// All synchronization is instance-owned, so pools can coexist.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawn `thread_count` workers over an empty queue bounded at
    /// `queue_capacity`. Callers must size the capacity to the maximum
    /// number of tasks ever pending at once for their workload.
    pub fn new(thread_count: usize, queue_capacity: usize) -> Result<Self, MsortError> {
        if thread_count == 0 {
            return Err(MsortError::Pool("thread_count must be nonzero".into()));
        }
        if queue_capacity == 0 {
            return Err(MsortError::Pool("queue_capacity must be nonzero".into()));
        }
        let shared = Arc::new(PoolShared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::with_capacity(queue_capacity),
                exit: false,
                active: thread_count,
                panicked: 0,
            }),
            capacity: queue_capacity,
            task_available: Condvar::new(),
            worker_exited: Condvar::new(),
        });
        let workers = (0..thread_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(&shared))
            })
            .collect();
        debug!(thread_count, queue_capacity, "thread pool started");
        Ok(ThreadPool { shared, workers })
    }

    /// Enqueue a task and wake one idle worker. Never blocks: a full
    /// queue is `QueueFull`, a pool already shutting down is
    /// `PoolShutDown`.
    pub fn submit<F>(&self, f: F) -> Result<(), MsortError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        if state.exit {
            return Err(MsortError::PoolShutDown);
        }
        if state.tasks.len() >= self.shared.capacity {
            return Err(MsortError::QueueFull {
                capacity: self.shared.capacity,
            });
        }
        state.tasks.push_back(Box::new(f));
        self.shared.task_available.notify_one();
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Tasks enqueued but not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().unwrap().tasks.len()
    }

    /// Tasks whose closure panicked since the pool started.
    pub fn panicked_tasks(&self) -> u64 {
        self.shared.state.lock().unwrap().panicked
    }

    /// Set the exit flag, wake every idle worker, wait for each one to
    /// observe the flag, and join them all. Tasks still queued are
    /// dropped unexecuted. Consuming `self` makes submit-after-shutdown
    /// and double-shutdown unrepresentable for the owner.
    pub fn shutdown(mut self) -> Result<(), MsortError> {
        self.request_exit_and_join();
        Ok(())
    }

    fn request_exit_and_join(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.exit = true;
            self.shared.task_available.notify_all();
            // Condvar wait, not a spin: each exiting worker signals.
            while state.active > 0 {
                state = self.shared.worker_exited.wait(state).unwrap();
            }
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked outside a task");
            }
        }
        debug!("thread pool shut down");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.request_exit_and_join();
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        let task = {
            let mut state = shared.state.lock().unwrap();
            loop {
                // Exit takes priority over pending work: shutdown drops
                // whatever is still queued.
                if state.exit {
                    state.active -= 1;
                    shared.worker_exited.notify_one();
                    return;
                }
                if let Some(task) = state.tasks.pop_front() {
                    break task;
                }
                state = shared.task_available.wait(state).unwrap();
            }
        };
        // Run outside the lock so execution never blocks other dequeues.
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("task panicked; worker continues");
            shared.state.lock().unwrap().panicked += 1;
        }
    }
}
