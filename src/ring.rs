use crate::invariants::{
    debug_assert_borrow_release_balanced, debug_assert_distinct_generations,
    debug_assert_pool_sufficient, debug_assert_write_target_unborrowed,
};
use crate::{CloneError, Config, Metrics};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::sync::Mutex;

/// Maximum number of segments a ring's table can grow to.
///
/// Two of these are always reserved so the sender has somewhere to write
/// regardless of how many receivers are borrowing (see `MAX_RECEIVERS`).
pub const MAX_SEGMENTS: usize = 16;

/// Maximum number of live receivers a ring can support.
///
/// Derived from `MAX_SEGMENTS`: invariant P2 requires `num_segments >=
/// num_receivers + 2`, so the receiver count tops out two below the segment
/// ceiling.
pub const MAX_RECEIVERS: usize = MAX_SEGMENTS - 2;

/// One fixed-size payload buffer plus its timestamp tag.
///
/// `data` and `timestamp` are wrapped in `UnsafeCell` because the sender's
/// two-phase send protocol copies a frame into them with the ring's lock
/// released. Soundness does not come from the lock here; it comes from the
/// slot-selection
/// discipline in `Ring::pick_write_target` and `Ring::pick_read_index`, which
/// together guarantee no borrow is ever live on the slot a `Sender` is
/// currently writing.
struct Segment {
    data: UnsafeCell<Box<[u8]>>,
    timestamp: UnsafeCell<u64>,
}

// SAFETY: concurrent access to a `Segment`'s cells is never actually
// concurrent in practice — `pick_write_target` only ever hands out an index
// with zero outstanding borrows, and a reader only ever reads an index it has
// itself incremented the borrow count on. The ring's mutex serializes the
// bookkeeping that enforces this; it does not need to serialize the bytes.
unsafe impl Sync for Segment {}

impl Segment {
    fn new(bufsize: usize) -> Self {
        Self {
            data: UnsafeCell::new(vec![0u8; bufsize].into_boxed_slice()),
            timestamp: UnsafeCell::new(0),
        }
    }

    /// Raw pointer to the first byte of this segment's buffer.
    ///
    /// Valid for the whole lifetime of the `Ring`: segments are individually
    /// heap-boxed, so growing the outer table never moves an existing
    /// segment's bytes.
    fn data_ptr(&self) -> *mut u8 {
        // SAFETY: `self.data` is never aliased mutably while this pointer is
        // live; see the `Sync` impl above.
        unsafe { (*self.data.get()).as_mut_ptr() }
    }

    fn timestamp_ptr(&self) -> *mut u64 {
        self.timestamp.get()
    }

    /// Reads the timestamp. Only safe to call while holding the ring's lock
    /// or while the caller otherwise knows no sender write is in flight on
    /// this segment (i.e. it currently has a live borrow).
    unsafe fn timestamp(&self) -> u64 {
        *self.timestamp.get()
    }
}

/// Everything the ring's mutex guards: the segment table, borrow counters,
/// write/read pointers, and flags.
pub(crate) struct RingState {
    segments: Vec<Box<Segment>>,
    borrows: Vec<u32>,
    num_receivers: u32,
    last_written_block: usize,
    prev_written_block: usize,
    conflation: bool,
    no_sender: bool,
    metrics: Metrics,
    /// Completed sends, tracked unconditionally for the distinct-generations
    /// debug assertion — unlike `metrics.sends`, this is not gated behind
    /// `Config::with_metrics`, so the invariant check stays live even when
    /// metrics collection is off.
    sends_completed: u64,
}

impl RingState {
    fn new(bufsize: usize) -> Self {
        Self {
            segments: (0..3).map(|_| Box::new(Segment::new(bufsize))).collect(),
            borrows: vec![0; 3],
            num_receivers: 1,
            last_written_block: 0,
            prev_written_block: 1,
            conflation: false,
            no_sender: false,
            metrics: Metrics::new(),
            sends_completed: 0,
        }
    }

    pub(crate) fn num_segments(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn num_receivers(&self) -> u32 {
        self.num_receivers
    }

    pub(crate) fn is_sender_closed(&self) -> bool {
        self.no_sender
    }
}

/// The shared control block. Jointly owned by the [`crate::Sender`] and every
/// live [`crate::Receiver`] through an `Arc`; freed automatically once the
/// last one drops.
pub struct Ring {
    bufsize: usize,
    enable_metrics: bool,
    state: CachePadded<Mutex<RingState>>,
}

// SAFETY: all mutable ring metadata lives behind `state`'s mutex; the only
// fields accessed without it (`bufsize`, `enable_metrics`) are set once at
// construction and never mutated again.
unsafe impl Send for Ring {}
unsafe impl Sync for Ring {}

impl Ring {
    pub(crate) fn new(config: Config) -> Self {
        let state = RingState::new(config.bufsize);

        Self {
            bufsize: config.bufsize,
            enable_metrics: config.enable_metrics,
            state: CachePadded::new(Mutex::new(state)),
        }
    }

    #[inline]
    pub(crate) fn bufsize(&self) -> usize {
        self.bufsize
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, RingState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn metrics_snapshot(&self) -> Metrics {
        self.lock().metrics
    }

    /// Scans `0..num_segments`, skipping `last_written_block` on the first
    /// pass, returning the first index with zero borrows. Falls back to
    /// `last_written_block` itself (conflation) if every other slot is
    /// borrowed. Requires the caller to hold the ring's lock.
    pub(crate) fn pick_write_target(state: &RingState) -> usize {
        let last = state.last_written_block;
        for i in 0..state.segments.len() {
            if i == last {
                continue;
            }
            if state.borrows[i] == 0 {
                return i;
            }
        }
        last
    }

    /// Returns the freshest slot that is not currently being written:
    /// `prev_written_block` under conflation, `last_written_block`
    /// otherwise. Requires the caller to hold the ring's lock.
    pub(crate) fn pick_read_index(state: &RingState) -> usize {
        if state.conflation {
            state.prev_written_block
        } else {
            state.last_written_block
        }
    }

    /// Appends a new zeroed segment, growing the table by one. Requires the
    /// caller to hold the ring's lock.
    pub(crate) fn grow(&self, state: &mut RingState) -> Result<(), CloneError> {
        if state.segments.len() == MAX_SEGMENTS {
            return Err(CloneError::MaxReceivers {
                max_segments: MAX_SEGMENTS,
            });
        }
        state.segments.push(Box::new(Segment::new(self.bufsize)));
        state.borrows.push(0);
        Ok(())
    }

    /// Begins a send: selects the write target, updates the conflation/
    /// generation bookkeeping and metrics, and returns the raw pointers the
    /// caller needs to perform the unlocked copy, plus the chosen index.
    ///
    /// Requires the caller to hold the ring's lock; returns the lock-free
    /// write handle to use after releasing it.
    pub(crate) fn begin_write(&self, state: &mut RingState) -> (usize, *mut u8, *mut u64) {
        let target = Self::pick_write_target(state);
        debug_assert_write_target_unborrowed!(state.borrows, target);

        if target == state.last_written_block {
            state.conflation = true;
        } else {
            state.prev_written_block = state.last_written_block;
        }

        if self.enable_metrics {
            state.metrics.sends += 1;
            if state.conflation {
                state.metrics.conflations += 1;
            }
        }

        let segment = &state.segments[target];
        (target, segment.data_ptr(), segment.timestamp_ptr())
    }

    /// Completes a send: republishes `target` as `last_written_block` and
    /// clears conflation. Requires the caller to hold the ring's lock.
    pub(crate) fn finish_write(state: &mut RingState, target: usize) {
        state.last_written_block = target;
        state.conflation = false;
        state.sends_completed += 1;
        debug_assert_distinct_generations!(
            state.last_written_block,
            state.prev_written_block,
            state.sends_completed
        );
    }

    /// Begins a borrow: picks the read index, increments its borrow count,
    /// and snapshots its data pointer and timestamp. Requires the caller to
    /// hold the ring's lock.
    pub(crate) fn begin_read(state: &mut RingState) -> (usize, *const u8, u64) {
        let index = Self::pick_read_index(state);
        state.borrows[index] += 1;
        let segment = &state.segments[index];
        // SAFETY: called with the ring's lock held; no sender write can be
        // in flight on `index` because it just gained a borrow.
        let timestamp = unsafe { segment.timestamp() };
        (index, segment.data_ptr().cast_const(), timestamp)
    }

    /// Releases a borrow taken by `begin_read`. Requires the caller to hold
    /// the ring's lock.
    pub(crate) fn end_read(state: &mut RingState, index: usize) {
        debug_assert_borrow_release_balanced!(state.borrows[index], index);
        state.borrows[index] -= 1;
    }

    pub(crate) fn register_receiver(state: &mut RingState) {
        state.num_receivers += 1;
        debug_assert_pool_sufficient!(state.num_segments(), state.num_receivers);
    }

    pub(crate) fn unregister_receiver(state: &mut RingState) {
        state.num_receivers -= 1;
    }

    pub(crate) fn close_sender(state: &mut RingState) {
        state.no_sender = true;
    }
}
