//! Maximal runs of zero / nonzero values in a sequence.
//!
//! Each run is a half-open `[start, end)` index range. The sequence is
//! mapped to a 0/1 indicator, padded with a 0 on both ends and
//! differenced; every index where the difference is nonzero is a run
//! boundary, and consecutive boundaries pair up into runs. Leading and
//! trailing runs need no special casing because of the padding.

use num_traits::Zero;

/// A half-open index range `[start, end)`.
pub type Block = [usize; 2];

/// Runs of values equal to zero.
pub fn continuous_zero<T: Zero>(values: &[T]) -> Vec<Block> {
    runs_where(values, |v| v.is_zero())
}

/// Runs of values different from zero.
pub fn continuous_nonzero<T: Zero>(values: &[T]) -> Vec<Block> {
    runs_where(values, |v| !v.is_zero())
}

/// Runs of consecutive values satisfying `predicate`.
pub fn runs_where<T>(values: &[T], predicate: impl Fn(&T) -> bool) -> Vec<Block> {
    let mut boundaries = Vec::new();
    let mut previous = false;
    for (i, value) in values.iter().enumerate() {
        let current = predicate(value);
        if current != previous {
            boundaries.push(i);
        }
        previous = current;
    }
    if previous {
        boundaries.push(values.len());
    }

    boundaries
        .chunks_exact(2)
        .map(|pair| [pair[0], pair[1]])
        .collect()
}

/// Length of a block.
pub fn block_len(block: &Block) -> usize {
    block[1] - block[0]
}

/// Index of the longest block; the first one wins ties.
pub fn longest_block(blocks: &[Block]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, block) in blocks.iter().enumerate() {
        let len = block_len(block);
        if best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((i, len));
        }
    }
    best.map(|(i, _)| i)
}
