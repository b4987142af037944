//! Debug assertion macros for ring invariants.
//!
//! These provide runtime checks for the borrow/pool invariants the ring
//! relies on for soundness (no write ever aliases a live borrow, the
//! segment table always has enough slack for the current receiver count,
//! and so on). They are only active in debug builds (`debug_assert!` is a
//! no-op in release), so there is zero overhead in release builds.

// =============================================================================
// P1: no aliased write
// =============================================================================

/// Assert that the slot chosen as a write target currently has no borrows.
///
/// **Invariant**: `num_borrows[target] == 0` at the moment `target` is
/// selected by `pick_write_target`.
macro_rules! debug_assert_write_target_unborrowed {
    ($borrows:expr, $target:expr) => {
        debug_assert!(
            $borrows[$target] == 0,
            "P1 violated: write target {} has {} outstanding borrows",
            $target,
            $borrows[$target]
        )
    };
}

// =============================================================================
// P2: pool sufficiency
// =============================================================================

/// Assert that the segment table is large enough for the current receiver count.
///
/// **Invariant**: `num_segments >= num_receivers + 2`
macro_rules! debug_assert_pool_sufficient {
    ($num_segments:expr, $num_receivers:expr) => {
        debug_assert!(
            $num_segments >= $num_receivers + 2,
            "P2 violated: {} segments insufficient for {} receivers",
            $num_segments,
            $num_receivers
        )
    };
}

// =============================================================================
// P4: borrow balance
// =============================================================================

/// Assert that a borrow release does not underflow the counter.
///
/// **Invariant**: `num_borrows[i] >= 1` before a release.
macro_rules! debug_assert_borrow_release_balanced {
    ($count:expr, $index:expr) => {
        debug_assert!(
            $count >= 1,
            "P4 violated: releasing a borrow on segment {} with count {}",
            $index,
            $count
        )
    };
}

// =============================================================================
// Distinct generations
// =============================================================================

/// Assert that the last-written and previous-written slots differ once more
/// than one send has completed.
macro_rules! debug_assert_distinct_generations {
    ($last:expr, $prev:expr, $sends:expr) => {
        debug_assert!(
            $sends < 2 || $last != $prev,
            "invariant violated: last_written_block == prev_written_block ({}) after {} sends",
            $last,
            $sends
        )
    };
}

pub(crate) use debug_assert_borrow_release_balanced;
pub(crate) use debug_assert_distinct_generations;
pub(crate) use debug_assert_pool_sufficient;
pub(crate) use debug_assert_write_target_unborrowed;
