use std::sync::{Condvar, Mutex};

/// Snapshot of the barrier's cumulative counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub submitted: u64,
    pub finished: u64,
    pub failed: u64,
}

impl Counts {
    /// Every task submitted so far has completed (successfully or not).
    pub fn drained(&self) -> bool {
        self.finished + self.failed == self.submitted
    }
}

/// Level-synchronization barrier built from cumulative counters.
///
/// `submitted` is bumped exactly once per task at enqueue time and
/// `finished` (or `failed`) exactly once when the task completes, so
/// `finished + failed <= submitted` holds at all times and equality
/// means everything submitted so far has drained. The counters are
/// never reset; because they stay in 1:1 correspondence per task, the
/// same equality check serves every level and the final wait. Resetting
/// one counter without the others breaks the invariant, which is why no
/// reset operation exists.
pub struct CompletionBarrier {
    counts: Mutex<Counts>,
    drained: Condvar,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        CompletionBarrier {
            counts: Mutex::new(Counts::default()),
            drained: Condvar::new(),
        }
    }

    pub fn record_submitted(&self) {
        self.counts.lock().unwrap().submitted += 1;
    }

    pub fn record_finished(&self) {
        let mut counts = self.counts.lock().unwrap();
        counts.finished += 1;
        self.drained.notify_all();
    }

    pub fn record_failed(&self) {
        let mut counts = self.counts.lock().unwrap();
        counts.failed += 1;
        self.drained.notify_all();
    }

    /// Block until drained; returns the snapshot observed at release.
    /// A fresh barrier (0 == 0) returns immediately.
    pub fn wait_drained(&self) -> Counts {
        let mut counts = self.counts.lock().unwrap();
        while !counts.drained() {
            counts = self.drained.wait(counts).unwrap();
        }
        *counts
    }

    pub fn counts(&self) -> Counts {
        *self.counts.lock().unwrap()
    }
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}
