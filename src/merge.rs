use std::cell::UnsafeCell;

/// Sort buffer shared across merge workers: the element array plus an
/// equally sized scratch array.
///
/// Within one level of the sort, tasks write pairwise-disjoint index
/// ranges (`start = op * 2^(level+1)`, width `2^(level+1)`), and the
/// orchestrator's barrier orders one level's writes before the next
/// level's reads. That partition-by-construction is what makes the
/// unsynchronized access below sound; any change to the index
/// arithmetic requires re-proving it.
pub struct SharedBuf<T> {
    items: UnsafeCell<Box<[T]>>,
    scratch: UnsafeCell<Box<[T]>>,
    len: usize,
}

// Disjoint ranges only; see range_mut.
unsafe impl<T: Send> Sync for SharedBuf<T> {}

impl<T: Copy> SharedBuf<T> {
    pub fn new(items: Vec<T>) -> Self {
        let len = items.len();
        let items = items.into_boxed_slice();
        let scratch = items.clone();
        SharedBuf {
            items: UnsafeCell::new(items),
            scratch: UnsafeCell::new(scratch),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reclaim the element array. Requires exclusive ownership, which
    /// rules out any concurrently running worker by construction.
    pub fn into_items(self) -> Vec<T> {
        self.items.into_inner().into_vec()
    }

    /// Mutable views of `[start, end)` in both arrays.
    ///
    /// # Safety
    /// No other thread may access `[start, end)` of either array while
    /// the returned slices are live. The sort upholds this through the
    /// per-level partition described on [`SharedBuf`].
    unsafe fn range_mut(&self, start: usize, end: usize) -> (&mut [T], &mut [T]) {
        debug_assert!(start <= end && end <= self.len);
        unsafe {
            let items = (*self.items.get()).as_mut_ptr();
            let scratch = (*self.scratch.get()).as_mut_ptr();
            (
                std::slice::from_raw_parts_mut(items.add(start), end - start),
                std::slice::from_raw_parts_mut(scratch.add(start), end - start),
            )
        }
    }
}

/// One merge operation: combine the sorted runs `[start, start+run)` and
/// `[start+run, start+2*run)`, `run = 2^level`, into a single sorted run
/// in place (through the scratch array).
///
/// Stable: on equal keys the left run wins, so merge sort's stability
/// guarantee survives every level.
pub fn merge_runs<T: Copy + Ord>(buf: &SharedBuf<T>, start: usize, level: u32) {
    let run = 1usize << level;
    let width = 2 * run;
    assert!(
        start % width == 0 && start + width <= buf.len(),
        "merge range out of bounds or misaligned"
    );
    // SAFETY: level partitioning makes [start, start + width) exclusive
    // to this call; see SharedBuf.
    let (items, scratch) = unsafe { buf.range_mut(start, start + width) };

    let (mut i, mut j, mut k) = (0, run, 0);
    while i < run && j < width {
        if items[i] <= items[j] {
            scratch[k] = items[i];
            i += 1;
        } else {
            scratch[k] = items[j];
            j += 1;
        }
        k += 1;
    }
    while i < run {
        scratch[k] = items[i];
        i += 1;
        k += 1;
    }
    while j < width {
        scratch[k] = items[j];
        j += 1;
        k += 1;
    }
    items.copy_from_slice(scratch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_merge_level_zero_pairs() {
        let buf = SharedBuf::new(vec![5, 3, 8, 1]);
        merge_runs(&buf, 0, 0);
        merge_runs(&buf, 2, 0);
        assert_eq!(buf.into_items(), vec![3, 5, 1, 8]);
    }

    #[test]
    fn test_merge_two_sorted_runs() {
        let buf = SharedBuf::new(vec![3, 5, 1, 8]);
        merge_runs(&buf, 0, 1);
        assert_eq!(buf.into_items(), vec![1, 3, 5, 8]);
    }

    #[test]
    fn test_merge_exhausts_left_then_right() {
        let buf = SharedBuf::new(vec![1, 2, 7, 9]);
        merge_runs(&buf, 0, 1);
        assert_eq!(buf.into_items(), vec![1, 2, 7, 9]);

        let buf = SharedBuf::new(vec![7, 9, 1, 2]);
        merge_runs(&buf, 0, 1);
        assert_eq!(buf.into_items(), vec![1, 2, 7, 9]);
    }

    /// Equal keys with distinguishable identity; Ord looks at the key
    /// only, so the ids expose merge order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Keyed {
        key: i32,
        id: u32,
    }

    impl Ord for Keyed {
        fn cmp(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }
    }

    impl PartialOrd for Keyed {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    #[test]
    fn test_merge_prefers_left_run_on_equal_keys() {
        let k = |key, id| Keyed { key, id };
        let buf = SharedBuf::new(vec![k(1, 0), k(2, 1), k(1, 2), k(2, 3)]);
        merge_runs(&buf, 0, 1);
        let ids: Vec<u32> = buf.into_items().iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![0, 2, 1, 3]);
    }

    #[test]
    #[should_panic(expected = "merge range")]
    fn test_merge_out_of_bounds_panics() {
        let buf = SharedBuf::new(vec![1, 2, 3, 4]);
        merge_runs(&buf, 4, 0);
    }
}
