//! Binding-constraint analysis for half-integer bit pairs.
//!
//! After refinement, stubborn vertices tend to sit with both bits at one
//! half. For each such pair the rounder enumerates the candidate integer
//! codes, scans every binding row touching either bit, and keeps only the
//! candidates whose rounding step does not leave the binding row's feasible
//! side. A surviving candidate is applied by tightening both variable
//! bounds, and the relaxation is re-solved.
//!
//! When several candidates survive, the pair is fixed to the
//! lexicographically smallest `(b1, b2)`.

use crate::models::{ColorCount, Comparison};
use crate::solvers::lp_coloring::relaxation::{is_half, Relaxation, INT_TOL};

/// Candidate codes for a half-integer pair; `(1, 1)` is excluded in
/// three-color mode.
pub(crate) fn candidate_codes(color_count: ColorCount) -> Vec<(u8, u8)> {
    match color_count {
        ColorCount::Three => vec![(0, 0), (0, 1), (1, 0)],
        ColorCount::Four => vec![(0, 0), (0, 1), (1, 0), (1, 1)],
    }
}

/// Direction of sensitivity of a (coefficient, sense) observation: the sign
/// of the coefficient, flipped for `<=` rows. Zero coefficients carry no
/// direction. Two observations on the same variable are compatible iff
/// either has no direction or the directions agree; a flip signals
/// irreconcilable binding rows and aborts the pair.
fn direction(coeff: f64, cmp: Comparison) -> Option<i8> {
    if coeff.abs() <= INT_TOL {
        return None;
    }
    let sign: i8 = if coeff > 0.0 { 1 } else { -1 };
    match cmp {
        Comparison::Ge => Some(sign),
        Comparison::Le => Some(-sign),
        Comparison::Eq => None,
    }
}

/// Record a direction observation, reporting false on a flip.
fn merge_direction(slot: &mut Option<i8>, dir: Option<i8>) -> bool {
    let Some(dir) = dir else { return true };
    match *slot {
        None => {
            *slot = Some(dir);
            true
        }
        Some(seen) => seen == dir,
    }
}

/// Incremental scan over the binding rows touching one half-integer pair.
pub(crate) struct BindingScan {
    valid: Vec<bool>,
    codes: Vec<(u8, u8)>,
    dir_first: Option<i8>,
    dir_second: Option<i8>,
    failed: bool,
}

impl BindingScan {
    pub fn new(color_count: ColorCount) -> Self {
        let codes = candidate_codes(color_count);
        Self {
            valid: vec![true; codes.len()],
            codes,
            dir_first: None,
            dir_second: None,
            failed: false,
        }
    }

    /// Feed one binding row's coefficients on the pair and its sense.
    pub fn observe(&mut self, a1: f64, a2: f64, cmp: Comparison) {
        if self.failed {
            return;
        }
        let first_ok = merge_direction(&mut self.dir_first, direction(a1, cmp));
        let second_ok = merge_direction(&mut self.dir_second, direction(a2, cmp));
        if !first_ok || !second_ok {
            self.failed = true;
            return;
        }
        for (index, &(b1, b2)) in self.codes.iter().enumerate() {
            if !self.valid[index] {
                continue;
            }
            let delta = a1 * (f64::from(b1) - 0.5) + a2 * (f64::from(b2) - 0.5);
            let cut = match cmp {
                Comparison::Ge => delta < -INT_TOL,
                Comparison::Le => delta > INT_TOL,
                Comparison::Eq => delta.abs() > INT_TOL,
            };
            if cut {
                self.valid[index] = false;
            }
        }
        if self.valid.iter().all(|v| !v) {
            self.failed = true;
        }
    }

    /// The chosen rounding, unless the scan aborted: the lexicographically
    /// smallest surviving candidate.
    pub fn chosen(&self) -> Option<(u8, u8)> {
        if self.failed {
            return None;
        }
        self.codes
            .iter()
            .zip(&self.valid)
            .find(|&(_, &valid)| valid)
            .map(|(&code, _)| code)
    }
}

/// Scan all half-integer pairs and fix the survivors by tightening bounds.
/// Returns the number of pairs fixed; the caller re-optimizes afterwards.
pub(crate) fn round_half_pairs(relax: &mut Relaxation) -> usize {
    let mut fixed = 0;
    for v in 0..relax.num_vertices() {
        let (first, second) = relax.vertex_bits(v);
        if !is_half(relax.lp.value(first)) || !is_half(relax.lp.value(second)) {
            continue;
        }

        let mut rows: Vec<usize> = relax
            .lp
            .column(first)
            .iter()
            .chain(relax.lp.column(second))
            .copied()
            .collect();
        rows.sort_unstable();
        rows.dedup();

        let mut scan = BindingScan::new(relax.color_count());
        for row in rows {
            if relax.lp.slack(row).abs() > INT_TOL {
                continue;
            }
            scan.observe(
                relax.lp.coeff(row, first),
                relax.lp.coeff(row, second),
                relax.lp.sense(row),
            );
            if scan.chosen().is_none() {
                break;
            }
        }

        if let Some((b1, b2)) = scan.chosen() {
            relax.lp.set_bounds(first, f64::from(b1), f64::from(b1));
            relax.lp.set_bounds(second, f64::from(b2), f64::from(b2));
            fixed += 1;
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_codes_exclude_code_three_for_three_colors() {
        assert_eq!(candidate_codes(ColorCount::Three).len(), 3);
        assert!(!candidate_codes(ColorCount::Three).contains(&(1, 1)));
        assert_eq!(candidate_codes(ColorCount::Four).len(), 4);
    }

    #[test]
    fn test_ge_row_cuts_downward_candidates() {
        // Binding row b1 + b2 >= 1 at (0.5, 0.5): rounding to (0, 0) moves
        // the lhs by -1 and leaves the feasible side; the other candidates
        // keep it.
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 1.0, Comparison::Ge);
        assert_eq!(scan.chosen(), Some((0, 1)));
    }

    #[test]
    fn test_le_row_cuts_upward_candidates() {
        // Binding row b1 + b2 <= 1 at (0.5, 0.5): only (1, 1) leaves the
        // feasible side.
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 1.0, Comparison::Le);
        assert_eq!(scan.chosen(), Some((0, 0)));
    }

    #[test]
    fn test_lexicographically_smallest_survivor_wins() {
        let scan = BindingScan::new(ColorCount::Four);
        assert_eq!(scan.chosen(), Some((0, 0)));
    }

    #[test]
    fn test_direction_flip_aborts_pair() {
        // A positive coefficient under >= followed by a positive
        // coefficient under <= flips the direction of sensitivity.
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 0.0, Comparison::Ge);
        assert!(scan.chosen().is_some());
        scan.observe(1.0, 0.0, Comparison::Le);
        assert_eq!(scan.chosen(), None);
    }

    #[test]
    fn test_negated_coefficient_under_flipped_sense_is_compatible() {
        // coeff +1 under >= and coeff -1 under <= share the direction.
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 0.0, Comparison::Ge);
        scan.observe(-1.0, 0.0, Comparison::Le);
        assert!(scan.chosen().is_some());
    }

    #[test]
    fn test_contradictory_rows_abort_pair() {
        // Opposite-sign coefficients under the same sense flip the
        // direction of sensitivity on both bits.
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 1.0, Comparison::Ge);
        scan.observe(-1.0, -1.0, Comparison::Ge);
        assert_eq!(scan.chosen(), None);
    }

    #[test]
    fn test_zero_coefficient_carries_no_direction() {
        let mut scan = BindingScan::new(ColorCount::Four);
        scan.observe(1.0, 0.0, Comparison::Ge);
        scan.observe(0.0, 1.0, Comparison::Ge);
        scan.observe(1.0, 1.0, Comparison::Ge);
        assert_eq!(scan.chosen(), Some((1, 1)));
    }
}
