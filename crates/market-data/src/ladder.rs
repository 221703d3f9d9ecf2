//! Top-N ladder reduction from snapshot + incremental diff frames.
//!
//! [`Book`] maintains one small ladder per side, index 0 best (highest bid,
//! lowest ask). A snapshot replaces both ladders wholesale with the first N
//! entries as received; an incremental change touches exactly one level.
//!
//! The update policy is deliberately head-only: a novel price that improves
//! the best overwrites index 0, it is not inserted in sort order and the
//! previous best is not demoted. The ladder below the head only changes via
//! delete or in-place replace. Consumers read only the head, and the
//! upstream feed contract depends on this exact behavior.

use tob_core::types::{BookLevel, Price, Quantity, Side};

/// Default ladder depth per side.
pub const DEFAULT_DEPTH: usize = 20;

/// Two capped ladders reduced from one venue's book channel.
#[derive(Debug, Clone)]
pub struct Book {
    /// Bid levels, index 0 = highest price.
    bids: Vec<BookLevel>,
    /// Ask levels, index 0 = lowest price.
    asks: Vec<BookLevel>,
    /// Max levels retained per side from a snapshot.
    depth: usize,
}

impl Book {
    /// Create an empty book keeping up to `depth` levels per side.
    pub fn new(depth: usize) -> Self {
        Self {
            bids: Vec::with_capacity(depth),
            asks: Vec::with_capacity(depth),
            depth,
        }
    }

    /// Drop all levels. Used on every (re)subscription.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Replace both ladders with the first `depth` entries of a snapshot,
    /// in the order the venue sent them (assumed best-first).
    pub fn apply_snapshot(&mut self, bids: Vec<BookLevel>, asks: Vec<BookLevel>) {
        self.bids = bids;
        self.bids.truncate(self.depth);
        self.asks = asks;
        self.asks.truncate(self.depth);
    }

    /// Apply one `(side, price, size)` change.
    ///
    /// - zero size: delete the level at `price` if present;
    /// - known price: replace that level's size in place;
    /// - novel price that strictly improves the head: overwrite index 0;
    /// - anything else: no-op.
    pub fn apply_change(&mut self, side: Side, price: Price, size: Quantity) {
        let ladder = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };

        if size.is_zero() {
            ladder.retain(|level| level.price != price);
            return;
        }

        if let Some(level) = ladder.iter_mut().find(|level| level.price == price) {
            level.size = size;
            return;
        }

        let improves = match ladder.first() {
            Some(best) => match side {
                Side::Bid => price > best.price,
                Side::Ask => price < best.price,
            },
            // An empty side has no best to improve on; wait for the next
            // snapshot rather than guessing.
            None => false,
        };
        if improves {
            ladder[0] = BookLevel::new(price, size);
        }
    }

    /// The highest bid level, if any.
    pub fn best_bid(&self) -> Option<BookLevel> {
        self.bids.first().copied()
    }

    /// The lowest ask level, if any.
    pub fn best_ask(&self) -> Option<BookLevel> {
        self.asks.first().copied()
    }

    /// Head of each ladder, once both sides are populated.
    pub fn top(&self) -> Option<(BookLevel, BookLevel)> {
        Some((self.best_bid()?, self.best_ask()?))
    }

    /// `(bid_level_count, ask_level_count)`.
    pub fn level_count(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}
