//! Cross-frame intersection of isolated active pixels.
//!
//! A hardware defect sits at the same location in every exposure, while stars,
//! streaks and noise move or vanish between frames. Keeping only coordinates
//! present in every frame's [`ActiveSet`] leaves the persistent candidates.

use shared::PixelCoord;
use std::collections::HashSet;

use crate::active_pixels::ActiveSet;
use crate::error::{Result, ScreenError};

/// Coordinates flagged as isolated-active in every frame of a collection.
pub type HotPixelSet = HashSet<PixelCoord>;

/// Intersection of two sets, consuming the first.
///
/// Associative and commutative, so partial results may be merged in any order.
pub fn intersect(mut acc: HotPixelSet, other: &ActiveSet) -> HotPixelSet {
    acc.retain(|coord| other.contains(coord));
    acc
}

/// Intersect all active sets.
///
/// At least one set is required; the intersection of zero sets has no useful
/// meaning here. A single set is returned unchanged. The result does not depend
/// on the order of `active_sets`.
pub fn overlap(active_sets: &[ActiveSet]) -> Result<HotPixelSet> {
    let (seed_index, seed) = active_sets
        .iter()
        .enumerate()
        .min_by_key(|(_, set)| set.len())
        .ok_or(ScreenError::NoActiveSets)?;

    // Starting from the smallest set bounds the work by its size
    Ok(active_sets
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != seed_index)
        .fold(seed.clone(), |acc, (_, set)| intersect(acc, set)))
}
