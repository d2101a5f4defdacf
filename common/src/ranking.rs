//! Batch ranking
//!
//! Ordering rules for multi-image batches:
//! - comparative path: ascending by the model's rank, unranked entries last
//! - fallback path: descending by rust score, non-rod images last

use crate::types::{AnalysisResult, RankedResult};
use std::fmt;

/// Sort position given to entries the model did not rank.
pub const UNRANKED_SENTINEL: u32 = 999;

/// Sort ascending by rank; entries without a rank go last. Stable.
pub fn sort_by_rank(results: &mut [RankedResult]) {
    results.sort_by_key(|(_, result)| result.rank.unwrap_or(UNRANKED_SENTINEL));
}

/// Fallback sort key: higher ranks first.
///
/// Non-rod images get -1 so they land behind every valid score. A valid
/// result without a score counts as 0, which ties it with a genuine 0.
pub fn fallback_sort_key(result: &AnalysisResult) -> i64 {
    if !result.is_metal_rod {
        return -1;
    }
    result.rust_score.unwrap_or(0)
}

/// Order independently analyzed results and assign ranks 1..=N.
///
/// Sorted by `fallback_sort_key` descending. The sort is stable, so equal
/// keys keep their submission order.
pub fn assign_fallback_ranks(mut results: Vec<RankedResult>) -> Vec<RankedResult> {
    results.sort_by(|(_, a), (_, b)| fallback_sort_key(b).cmp(&fallback_sort_key(a)));

    for (position, (_, result)) in results.iter_mut().enumerate() {
        result.rank = Some(position as u32 + 1);
    }

    results
}

/// Badge shown next to a ranked result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    MostRusted,
    Cleanest,
    Position(u32),
}

impl RankBadge {
    /// Badge for `rank` out of `total`; rank 1 wins when total is 1.
    pub fn for_rank(rank: u32, total: usize) -> Self {
        if rank == 1 {
            RankBadge::MostRusted
        } else if rank as usize == total {
            RankBadge::Cleanest
        } else {
            RankBadge::Position(rank)
        }
    }
}

impl fmt::Display for RankBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBadge::MostRusted => write!(f, "🔴 Most Rusted"),
            RankBadge::Cleanest => write!(f, "🟢 Cleanest"),
            RankBadge::Position(rank) => write!(f, "#{}", rank),
        }
    }
}
