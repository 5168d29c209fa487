//! Bucket ordering, deduplication and capping.

use super::models::{ReleaseCandidate, MAX_BUCKET_SIZE};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Minimum age gap (days) for the recency override to kick in.
pub const RECENCY_OVERRIDE_MIN_AGE_GAP: i64 = 6;

/// How far (popularity points) a newer release may trail an older one and
/// still win through the recency override.
pub const RECENCY_OVERRIDE_MAX_POPULARITY_DEFICIT: i16 = 8;

/// Orders two candidates: recency override, then score, then release date,
/// then popularity.
///
/// The override makes this relation non-transitive; see [`rank`].
pub fn compare(a: &ReleaseCandidate, b: &ReleaseCandidate) -> Ordering {
    if let Some(ordering) = recency_override(a, b) {
        return ordering;
    }

    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.released_on.cmp(&a.released_on))
        .then_with(|| b.popularity.cmp(&a.popularity))
}

fn recency_override(a: &ReleaseCandidate, b: &ReleaseCandidate) -> Option<Ordering> {
    if (a.age_days - b.age_days).abs() < RECENCY_OVERRIDE_MIN_AGE_GAP {
        return None;
    }

    let (newer, older, newer_is_a) = if a.age_days < b.age_days {
        (a, b, true)
    } else {
        (b, a, false)
    };

    let deficit = older.popularity as i16 - newer.popularity as i16;
    if deficit > RECENCY_OVERRIDE_MAX_POPULARITY_DEFICIT {
        return None;
    }

    Some(if newer_is_a {
        Ordering::Less
    } else {
        Ordering::Greater
    })
}

/// Sorts, deduplicates by id and caps a bucket at [`MAX_BUCKET_SIZE`].
pub fn rank(candidates: Vec<ReleaseCandidate>) -> Vec<ReleaseCandidate> {
    rank_with_cap(candidates, MAX_BUCKET_SIZE)
}

pub fn rank_with_cap(candidates: Vec<ReleaseCandidate>, cap: usize) -> Vec<ReleaseCandidate> {
    dedup_and_cap(merge_sort(candidates), cap)
}

/// Drops repeated ids keeping the first occurrence, then truncates to `cap`.
pub fn dedup_and_cap(candidates: Vec<ReleaseCandidate>, cap: usize) -> Vec<ReleaseCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.id.clone()))
        .take(cap)
        .collect()
}

/// Stable top-down merge sort driven by [`compare`].
///
/// `slice::sort_by` requires a total order and may panic when handed the
/// non-transitive override comparator, so ordering goes through this instead.
fn merge_sort(mut items: Vec<ReleaseCandidate>) -> Vec<ReleaseCandidate> {
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items);
    let right = merge_sort(right);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) != Ordering::Less,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }

    merged
}
