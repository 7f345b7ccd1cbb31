//! Straight-run weld bead placement.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sf_core::PipeSize;
use sf_hydraulics::welded_fitting_k;

/// A weld bead inside a straight run between two heads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldBead {
    /// Segment the bead sits in (0 = first segment after the branch inlet).
    pub segment_index: usize,
    pub position_in_segment_m: f64,
    pub height_mm: f64,
    /// `None` when the bead closes the bore.
    pub k_value: Option<f64>,
}

/// Place `num_beads` weld beads along one branch.
///
/// With `rng = None` the beads are evenly spaced at `step * (i + 0.5)` over
/// the branch length; with an rng they are sorted uniform draws over
/// `[0, heads * head_spacing)`. The K-value comes from the size of the
/// segment each bead lands in.
pub fn generate_branch_beads<R: Rng + ?Sized>(
    heads: usize,
    head_spacing_m: f64,
    num_beads: usize,
    height_mm: f64,
    pipe_sizes: &[PipeSize],
    k1_base: f64,
    rng: Option<&mut R>,
) -> Vec<WeldBead> {
    let segments = heads.min(pipe_sizes.len());
    if num_beads == 0 || segments == 0 || head_spacing_m <= 0.0 {
        return Vec::new();
    }

    let total_length = heads as f64 * head_spacing_m;
    let positions: Vec<f64> = match rng {
        Some(rng) => {
            let mut draws: Vec<f64> = (0..num_beads)
                .map(|_| rng.gen_range(0.0..total_length))
                .collect();
            draws.sort_by(f64::total_cmp);
            draws
        }
        None => {
            let step = total_length / num_beads as f64;
            (0..num_beads).map(|i| step * (i as f64 + 0.5)).collect()
        }
    };

    positions
        .into_iter()
        .map(|pos| {
            let segment_index = ((pos / head_spacing_m) as usize).min(segments - 1);
            let size = pipe_sizes[segment_index];
            WeldBead {
                segment_index,
                position_in_segment_m: pos - segment_index as f64 * head_spacing_m,
                height_mm,
                k_value: welded_fitting_k(height_mm, size.inner_diameter_mm(), k1_base),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sf_core::pipes::branch_pipe_sizes;

    #[test]
    fn evenly_spaced_layout() {
        let sizes = branch_pipe_sizes(8);
        let beads = generate_branch_beads::<StdRng>(8, 2.3, 5, 1.5, &sizes, 0.5, None);
        assert_eq!(beads.len(), 5);

        // step = 18.4 / 5 = 3.68, first bead at 1.84 m
        assert_eq!(beads[0].segment_index, 0);
        assert!((beads[0].position_in_segment_m - 1.84).abs() < 1e-9);
        // third bead at 9.2 m = segment 4, 0.0 m in
        assert_eq!(beads[2].segment_index, 4);
        assert!(beads[2].position_in_segment_m.abs() < 1e-9);

        for bead in &beads {
            let k = bead.k_value.unwrap();
            assert!(k > 0.5);
        }
    }

    #[test]
    fn random_layout_is_sorted_and_in_range() {
        let sizes = branch_pipe_sizes(6);
        let mut rng = StdRng::seed_from_u64(7);
        let beads = generate_branch_beads(6, 2.0, 20, 1.0, &sizes, 0.5, Some(&mut rng));
        assert_eq!(beads.len(), 20);
        for pair in beads.windows(2) {
            let a = pair[0].segment_index as f64 * 2.0 + pair[0].position_in_segment_m;
            let b = pair[1].segment_index as f64 * 2.0 + pair[1].position_in_segment_m;
            assert!(a <= b);
        }
        for bead in &beads {
            assert!(bead.segment_index < 6);
            assert!(bead.position_in_segment_m >= 0.0 && bead.position_in_segment_m < 2.0 + 1e-12);
        }
    }

    #[test]
    fn seeded_layout_is_reproducible() {
        let sizes = branch_pipe_sizes(8);
        let a = generate_branch_beads(8, 2.3, 5, 1.5, &sizes, 0.5, Some(&mut StdRng::seed_from_u64(42)));
        let b = generate_branch_beads(8, 2.3, 5, 1.5, &sizes, 0.5, Some(&mut StdRng::seed_from_u64(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_beads_or_heads() {
        let sizes = branch_pipe_sizes(4);
        assert!(generate_branch_beads::<StdRng>(4, 2.3, 0, 1.5, &sizes, 0.5, None).is_empty());
        assert!(generate_branch_beads::<StdRng>(0, 2.3, 3, 1.5, &[], 0.5, None).is_empty());
    }

    #[test]
    fn blocking_bead_has_no_k() {
        let sizes = branch_pipe_sizes(1);
        let beads = generate_branch_beads::<StdRng>(1, 2.3, 1, 14.0, &sizes, 0.5, None);
        assert_eq!(beads[0].k_value, None);
    }
}
