use crate::barrier::CompletionBarrier;
use crate::error::MsortError;
use crate::merge::{SharedBuf, merge_runs};
use crate::pool::ThreadPool;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::debug;

/// Completion flag, distinct from the barrier: the barrier's counters
/// never reset, so "whole sort done" needs its own signal to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
enum DoneState {
    Running,
    Done,
    Failed(String),
}

struct SortShared<T> {
    buf: SharedBuf<T>,
    barrier: CompletionBarrier,
    done: Mutex<DoneState>,
    completed: Condvar,
}

/// Handle to an in-flight sort started by [`submit_sort`].
pub struct SortHandle<T> {
    shared: Arc<SortShared<T>>,
    orchestrator: JoinHandle<Result<(), MsortError>>,
}

/// Start a level-synchronized bottom-up merge sort over `elements`.
///
/// The length must already be a power of two (padding is the caller's
/// job, see [`crate::input::pad_to_power_of_two`]). `thread_hint` sizes
/// the worker pool; the task queue is sized to the total task count of
/// the whole sort, `n - 1`, so it can never overflow mid-run. Returns
/// immediately; orchestration runs on its own thread.
pub fn submit_sort<T>(elements: Vec<T>, thread_hint: usize) -> Result<SortHandle<T>, MsortError>
where
    T: Copy + Ord + Send + 'static,
{
    let n = elements.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(MsortError::NotPowerOfTwo(n));
    }
    let shared = Arc::new(SortShared {
        buf: SharedBuf::new(elements),
        barrier: CompletionBarrier::new(),
        done: Mutex::new(DoneState::Running),
        completed: Condvar::new(),
    });
    let orchestrator = {
        let shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            let result = run_levels(&shared, thread_hint);
            let mut done = shared.done.lock().unwrap();
            *done = match &result {
                Ok(()) => DoneState::Done,
                Err(e) => DoneState::Failed(e.to_string()),
            };
            shared.completed.notify_all();
            result
        })
    };
    Ok(SortHandle {
        shared,
        orchestrator,
    })
}

impl<T> SortHandle<T>
where
    T: Copy + Ord + Send + 'static,
{
    /// Block until the sort's final barrier has fired. Idempotent.
    pub fn wait_for_completion(&self) -> Result<(), MsortError> {
        let mut done = self.shared.done.lock().unwrap();
        while *done == DoneState::Running {
            done = self.shared.completed.wait(done).unwrap();
        }
        match &*done {
            DoneState::Done => Ok(()),
            DoneState::Failed(msg) => Err(MsortError::Sort(msg.clone())),
            DoneState::Running => unreachable!(),
        }
    }

    /// Wait for completion, tear the sort down, and return the sorted
    /// elements. Consumes the handle; the buffer is handed back exactly
    /// once.
    pub fn read_sorted(self) -> Result<Vec<T>, MsortError> {
        let result = self
            .orchestrator
            .join()
            .map_err(|_| MsortError::Sort("orchestrator thread panicked".into()))?;
        result?;
        // Every worker has been joined by now, so this Arc is the last.
        let shared = Arc::try_unwrap(self.shared)
            .map_err(|_| MsortError::Sort("sort state still shared after completion".into()))?;
        Ok(shared.buf.into_items())
    }
}

/// Fan out one level at a time: submit every merge operation of level
/// `x`, then hold at the barrier until all of them have landed before
/// touching level `x + 1`. Operation `y` of level `x` starts at
/// `y * 2^(x+1)` and merges two runs of `2^x`; that arithmetic is the
/// disjointness proof the shared buffer relies on.
fn run_levels<T>(shared: &Arc<SortShared<T>>, thread_hint: usize) -> Result<(), MsortError>
where
    T: Copy + Ord + Send + 'static,
{
    let n = shared.buf.len();
    let levels = n.trailing_zeros();
    if levels == 0 {
        debug!("single element, nothing to merge");
        return Ok(());
    }
    let pool = ThreadPool::new(thread_hint.max(1), n - 1)?;
    for level in 0..levels {
        let ops = n >> (level + 1);
        for op in 0..ops {
            let start = op << (level + 1);
            let task_shared = Arc::clone(shared);
            shared.barrier.record_submitted();
            pool.submit(move || {
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| merge_runs(&task_shared.buf, start, level)));
                // No per-task error channel in the pool; failure flows
                // through the barrier so the drain never hangs.
                match outcome {
                    Ok(()) => task_shared.barrier.record_finished(),
                    Err(_) => task_shared.barrier.record_failed(),
                }
            })?;
        }
        let counts = shared.barrier.wait_drained();
        debug!(level, ops, finished = counts.finished, "level drained");
        if counts.failed > 0 {
            pool.shutdown()?;
            return Err(MsortError::TaskFailed {
                failed: counts.failed,
            });
        }
    }
    pool.shutdown()
}
