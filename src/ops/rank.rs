use crate::model::{Rank, Ticket};

/// Distance between a newly appended (or prepended) rank and its neighbour
pub const RANK_GAP: Rank = 1_000_000;

/// Error type for rank allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RankError {
    #[error("ran out of room between tickets")]
    InsufficientRankSpace,
    #[error("invalid move: current index {current}, target index {target}, length {len}")]
    InvalidMove {
        current: usize,
        target: usize,
        len: usize,
    },
}

/// Anything that carries a rank
pub trait Ranked {
    fn rank(&self) -> Rank;
}

impl Ranked for Ticket {
    fn rank(&self) -> Rank {
        self.rank
    }
}

impl Ranked for Rank {
    fn rank(&self) -> Rank {
        *self
    }
}

/// Compute the rank for moving `sequence[current]` so that it lands in front of
/// the element currently at `target` (or at the end when `target == len`).
///
/// `target` is expressed in the coordinates of the sequence *before* the
/// moved element is removed. Calling with `current == target` is a caller bug.
pub fn compute_rank<T: Ranked>(
    sequence: &[T],
    current: usize,
    target: usize,
) -> Result<Rank, RankError> {
    debug_assert_ne!(current, target, "rank move to the same index");
    let len = sequence.len();
    if current == target || current >= len || target > len {
        return Err(RankError::InvalidMove {
            current,
            target,
            len,
        });
    }

    if target == 0 {
        return sequence[0]
            .rank()
            .checked_sub(RANK_GAP)
            .ok_or(RankError::InsufficientRankSpace);
    }
    if target >= len {
        return sequence[len - 1]
            .rank()
            .checked_add(RANK_GAP)
            .ok_or(RankError::InsufficientRankSpace);
    }

    let below = sequence[target - 1].rank();
    let above = sequence[target].rank();
    let gap = above
        .checked_sub(below)
        .ok_or(RankError::InsufficientRankSpace)?;
    if gap <= 1 {
        return Err(RankError::InsufficientRankSpace);
    }
    // Forward moves land just after `below`, backward moves just before `above`
    Ok(if target > current {
        below + gap / 2
    } else {
        above - gap / 2
    })
}

/// Move the element at `current` so it sits in front of the element at
/// `target` (pre-removal coordinates), keeping every other relative position.
pub fn reposition<T>(sequence: &mut Vec<T>, current: usize, target: usize) {
    let item = sequence.remove(current);
    let insert_at = if target > current { target - 1 } else { target };
    sequence.insert(insert_at, item);
}
