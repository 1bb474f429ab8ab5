//! Proportional allocation of order-level amounts across line items.

use rust_decimal::{Decimal, RoundingStrategy};

/// Distributes `total` across lines in proportion to `weights`, rounding
/// each share to `precision` minor-unit digits.
///
/// The rounding error left over after all shares are rounded is added to
/// the last line with a non-zero weight, so the returned shares always sum
/// to `total` exactly. When every weight is zero (an order made up entirely
/// of free items) the whole amount lands on the first line.
///
/// Returns an empty vector for empty `weights`. Pure and deterministic.
#[must_use]
pub fn allocate(total: Decimal, weights: &[Decimal], precision: u32) -> Vec<Decimal> {
    allocate_with_remainder(total, weights, precision).0
}

/// Like [`allocate`], but also returns the rounding correction that was
/// folded into the last weighted share. Callers use it to notice when the
/// correction exceeds normal rounding (more than one minor unit).
#[must_use]
pub fn allocate_with_remainder(
    total: Decimal,
    weights: &[Decimal],
    precision: u32,
) -> (Vec<Decimal>, Decimal) {
    if weights.is_empty() {
        return (Vec::new(), Decimal::ZERO);
    }

    let weight_sum: Decimal = weights.iter().copied().sum();
    let mut shares = vec![Decimal::ZERO; weights.len()];

    if weight_sum.is_zero() {
        // Assignment by rule, not a rounding correction.
        shares[0] = total;
        return (shares, Decimal::ZERO);
    }

    let mut allocated = Decimal::ZERO;
    for (share, weight) in shares.iter_mut().zip(weights) {
        *share = (total * weight / weight_sum)
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
        allocated += *share;
    }

    // weight_sum != 0 guarantees a non-zero weight exists.
    let last_weighted = weights.iter().rposition(|w| !w.is_zero()).unwrap_or(0);
    let remainder = total - allocated;
    shares[last_weighted] += remainder;
    (shares, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_weights_yield_no_shares() {
        assert!(allocate(dec("10"), &[], 2).is_empty());
    }

    #[test]
    fn even_split_allocates_exactly() {
        let shares = allocate(dec("10"), &[dec("30"), dec("70")], 2);
        assert_eq!(shares, vec![dec("3.00"), dec("7.00")]);
    }

    #[test]
    fn remainder_lands_on_last_weighted_line() {
        // 11 * 0.3 = 3.3 rounds to 3; the last line absorbs what is left.
        let shares = allocate(dec("11"), &[dec("30"), dec("70")], 0);
        assert_eq!(shares, vec![dec("3"), dec("8")]);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec("11"));
    }

    #[test]
    fn three_way_split_conserves_total() {
        let shares = allocate(dec("100"), &[dec("1"), dec("1"), dec("1")], 2);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec("100"));
        assert_eq!(shares[0], dec("33.33"));
        assert_eq!(shares[1], dec("33.33"));
        assert_eq!(shares[2], dec("33.34"));
    }

    #[test]
    fn zero_weights_assign_everything_to_first_line() {
        let shares = allocate(dec("100"), &[Decimal::ZERO, Decimal::ZERO], 2);
        assert_eq!(shares, vec![dec("100"), dec("0")]);
    }

    #[test]
    fn single_nonzero_weight_receives_full_amount() {
        let shares = allocate(dec("100"), &[Decimal::ZERO, Decimal::ZERO, dec("5")], 2);
        assert_eq!(shares, vec![dec("0"), dec("0"), dec("100")]);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec("100"));
    }

    #[test]
    fn trailing_zero_weight_does_not_take_remainder() {
        // The remainder goes to the last line whose weight is non-zero,
        // not to the last line outright.
        let shares = allocate(dec("10"), &[dec("1"), dec("2"), Decimal::ZERO], 0);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec("10"));
        assert_eq!(shares[2], Decimal::ZERO);
    }

    #[test]
    fn negative_total_conserves_too() {
        // Refund corrections can allocate a negative pool.
        let shares = allocate(dec("-9.99"), &[dec("30"), dec("70")], 2);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec("-9.99"));
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let weights = [dec("12.49"), dec("0.01"), dec("87.50")];
        let a = allocate(dec("19.97"), &weights, 2);
        let b = allocate(dec("19.97"), &weights, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn remainder_is_zero_for_exact_splits() {
        let (_, remainder) = allocate_with_remainder(dec("10"), &[dec("30"), dec("70")], 2);
        assert_eq!(remainder, Decimal::ZERO);
    }

    #[test]
    fn remainder_reports_the_applied_correction() {
        // 2 across five equal lines at whole-unit precision: every
        // proportional share (0.4) rounds to zero, so the entire total is
        // a correction on the last line.
        let weights = vec![dec("1"); 5];
        let (shares, remainder) = allocate_with_remainder(dec("2"), &weights, 0);
        assert_eq!(remainder, dec("2"));
        assert_eq!(shares, vec![dec("0"), dec("0"), dec("0"), dec("0"), dec("2")]);
    }

    #[test]
    fn zero_weight_rule_is_not_a_correction() {
        let (_, remainder) = allocate_with_remainder(dec("100"), &[Decimal::ZERO], 2);
        assert_eq!(remainder, Decimal::ZERO);
    }
}
