//! Amount sanity checks (§4.2).
//!
//! Both thresholds are nominal figures for the current reporting year;
//! a production deployment would load them from a yearly-updated table
//! rather than hard-coding them. Kept as constants here since the spec
//! does not define a configuration surface for them and they are not
//! part of any Non-goal.

use amtskern_core::Money;

/// Monthly marginal-employment earnings limit ("Geringfügigkeitsgrenze").
/// Submissions at or below this are legal but flagged for review.
pub const GERINGFUEGIG_THRESHOLD: Money = Money::from_minor_units(51844);

/// Annual ceiling on contribution base ("Höchstbeitragsgrundlage"),
/// expressed as a monthly figure. Amounts above this are clamped at
/// the wire boundary (§4.2), not rejected.
pub const MAXIMUM_CONTRIBUTION_BASE: Money = Money::from_minor_units(606000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountWarning {
    /// Contribution base at or below the marginal-employment threshold.
    BelowGeringfuegigThreshold,
    /// Contribution base above the maximum; the wire boundary will clamp it.
    AboveMaximumBase,
}

/// Check a contribution base against both thresholds. Returns warnings,
/// never errors — both conditions are legal states (§4.2).
pub fn check_contribution_base(base: Money) -> Vec<AmountWarning> {
    let mut warnings = Vec::new();
    if base <= GERINGFUEGIG_THRESHOLD {
        warnings.push(AmountWarning::BelowGeringfuegigThreshold);
    }
    if base > MAXIMUM_CONTRIBUTION_BASE {
        warnings.push(AmountWarning::AboveMaximumBase);
    }
    warnings
}

/// Clamp a contribution base to the maximum at the wire boundary
/// (§4.2: "value clamped at wire boundary").
pub fn clamp_to_maximum_base(base: Money) -> Money {
    if base > MAXIMUM_CONTRIBUTION_BASE {
        MAXIMUM_CONTRIBUTION_BASE
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_marginal_employment() {
        let warnings = check_contribution_base(Money::from_minor_units(50000));
        assert_eq!(warnings, vec![AmountWarning::BelowGeringfuegigThreshold]);
    }

    #[test]
    fn flags_above_maximum() {
        let warnings = check_contribution_base(Money::from_minor_units(700000));
        assert_eq!(warnings, vec![AmountWarning::AboveMaximumBase]);
    }

    #[test]
    fn clamps_at_wire_boundary() {
        let clamped = clamp_to_maximum_base(Money::from_minor_units(900000));
        assert_eq!(clamped, MAXIMUM_CONTRIBUTION_BASE);
    }

    #[test]
    fn mid_range_amount_has_no_warnings() {
        assert!(check_contribution_base(Money::from_minor_units(350000)).is_empty());
    }
}
