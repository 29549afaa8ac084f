//! Region partitioning: a static assignment of elements into `1..=R`
//! disjoint material regions, used to inject work heterogeneity.

/// Assigns every element in `0..num_elems` a region id in `1..=num_regions`.
///
/// Region sizes follow a balance-exponent-weighted histogram: region `k`
/// (1-indexed) gets a share proportional to `(num_regions - k + 1)^balance`,
/// normalized to sum to `num_elems`. Elements are scattered across regions
/// with a fixed linear-congruential sequence seeded from `rank`, so the
/// assignment is reproducible for a fixed `(rank, num_elems, num_regions)`
/// triple but not guaranteed to match across different rank counts — see
/// the open-question note in `DESIGN.md`.
pub fn assign_regions(num_elems: usize, num_regions: usize, balance: i32, rank: u32) -> Vec<usize> {
    assert!(num_regions >= 1, "at least one region is required");

    if num_regions == 1 {
        return vec![1; num_elems];
    }

    let sizes = region_sizes(num_elems, num_regions, balance);

    // Build the flat sequence [1,1,...,1, 2,2,...,2, ...] matching `sizes`,
    // then shuffle it with a rank-seeded LCG so elements of a region are not
    // contiguous (mirroring a scattered multi-material layout).
    let mut assignment = Vec::with_capacity(num_elems);
    for (region, &count) in sizes.iter().enumerate() {
        assignment.resize(assignment.len() + count, region + 1);
    }

    let mut state = lcg_seed(rank);
    for i in (1..assignment.len()).rev() {
        state = lcg_next(state);
        let j = (state as usize) % (i + 1);
        assignment.swap(i, j);
    }

    assignment
}

fn region_sizes(num_elems: usize, num_regions: usize, balance: i32) -> Vec<usize> {
    let weights: Vec<f64> = (1..=num_regions)
        .map(|k| ((num_regions - k + 1) as f64).powi(balance.max(0)))
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut sizes: Vec<usize> = weights
        .iter()
        .map(|&w| ((w / total_weight) * num_elems as f64).floor() as usize)
        .collect();

    // Floor rounding can undershoot `num_elems`; hand the remainder to the
    // largest region so every element is claimed by exactly one region.
    let assigned: usize = sizes.iter().sum();
    if assigned < num_elems {
        let (biggest, _) = sizes
            .iter()
            .enumerate()
            .max_by_key(|&(_, &s)| s)
            .unwrap_or((0, &0));
        sizes[biggest] += num_elems - assigned;
    }

    sizes
}

const LCG_MULT: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

fn lcg_seed(rank: u32) -> u64 {
    (rank as u64).wrapping_mul(LCG_MULT).wrapping_add(LCG_INC)
}

fn lcg_next(state: u64) -> u64 {
    state.wrapping_mul(LCG_MULT).wrapping_add(LCG_INC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_element_gets_a_region_in_range() {
        let assignment = assign_regions(1000, 11, 1, 0);
        assert_eq!(assignment.len(), 1000);
        assert!(assignment.iter().all(|&r| (1..=11).contains(&r)));
    }

    #[test]
    fn single_region_assigns_everything_to_region_one() {
        let assignment = assign_regions(27, 1, 1, 3);
        assert!(assignment.iter().all(|&r| r == 1));
    }

    #[test]
    fn is_reproducible_for_a_fixed_rank() {
        let a = assign_regions(512, 5, 1, 7);
        let b = assign_regions(512, 5, 1, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn balance_only_changes_region_sizes_not_element_count() {
        let a = assign_regions(800, 11, 1, 0);
        let b = assign_regions(800, 11, 2, 0);
        assert_eq!(a.len(), b.len());
        assert!(a.iter().all(|&r| (1..=11).contains(&r)));
        assert!(b.iter().all(|&r| (1..=11).contains(&r)));
    }
}
