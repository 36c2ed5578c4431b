use std::collections::BTreeSet;

use docqa_core::types::{Candidate, ChunkId};

/// Set union of both candidate lists, in ascending chunk id order.
///
/// Scores are ignored: the two indexes score on different scales, so only
/// membership in either top-K survives. The result does not depend on which
/// list is passed first.
pub fn fuse(lexical: &[Candidate], semantic: &[Candidate]) -> Vec<ChunkId> {
    let pool: BTreeSet<ChunkId> = lexical.iter().chain(semantic).map(|c| c.id).collect();
    pool.into_iter().collect()
}
