//! Outfit combination generation: greedy bipartite pairing of tops and
//! bottoms in retrieval order, then standalone dresses for non-male requests.
//! Greedy rather than globally optimal — it honors retrieval rank and runs in
//! one pass. No garment id ever appears in more than one candidate.

use std::collections::{HashMap, HashSet};

use crate::models::{GarmentRecord, OutfitCandidate};

pub const DEFAULT_MAX_COMBOS: usize = 15;

/// Build non-overlapping outfit candidates from per-category retrieval
/// results. Empty category lists are valid and simply reduce the candidate
/// count; this never errors.
pub fn generate_combinations(
    by_category: &HashMap<String, Vec<GarmentRecord>>,
    gender: Option<&str>,
    max_combos: usize,
) -> Vec<OutfitCandidate> {
    let empty = Vec::new();
    let tops = by_category.get("upper_body").unwrap_or(&empty);
    let bottoms = by_category.get("lower_body").unwrap_or(&empty);
    let dresses = by_category.get("dresses").unwrap_or(&empty);

    let mut combos = Vec::new();
    // Shared across phases and namespaces: an id used as a top can never
    // resurface as a bottom or dress in the same request.
    let mut used_ids: HashSet<&str> = HashSet::new();

    for top in tops {
        if combos.len() >= max_combos {
            break;
        }
        if used_ids.contains(top.garment_id.as_str()) {
            continue;
        }
        // First unused bottom, in retrieval order.
        for bottom in bottoms {
            if used_ids.contains(bottom.garment_id.as_str()) {
                continue;
            }
            used_ids.insert(top.garment_id.as_str());
            used_ids.insert(bottom.garment_id.as_str());
            combos.push(OutfitCandidate::TwoPiece {
                top: top.clone(),
                bottom: bottom.clone(),
            });
            break;
        }
    }

    // Dresses never apply to male requests.
    if gender != Some("male") {
        for dress in dresses {
            if combos.len() >= max_combos {
                break;
            }
            if used_ids.contains(dress.garment_id.as_str()) {
                continue;
            }
            used_ids.insert(dress.garment_id.as_str());
            combos.push(OutfitCandidate::Dress {
                dress: dress.clone(),
            });
        }
    }

    combos.truncate(max_combos);
    combos
}
