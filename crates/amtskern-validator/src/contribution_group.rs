//! Contribution-group code check (§4.2).
//!
//! Austrian social-security contribution-group ("Beitragsgruppe") codes
//! are a curated enumeration, not a free-form string. Unknown codes are
//! rejected outright rather than accepted and silently miscategorized.

/// The curated set of recognized contribution-group codes. Illustrative
/// of the shape ELDA expects (worker/employee/apprentice/marginal
/// variants); a production deployment would source this table from the
/// ELDA "Beitragsgruppenkatalog" rather than hard-coding it here.
pub const KNOWN_CONTRIBUTION_GROUPS: &[&str] = &[
    "ANG", "ARB", "ASV", "D1", "D2", "B1", "B2", "A1", "A2", "Y1", "Y2", "L1", "L2",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contribution-group code: {0}")]
pub struct UnknownContributionGroup(pub String);

pub fn validate_contribution_group(code: &str) -> Result<(), UnknownContributionGroup> {
    if KNOWN_CONTRIBUTION_GROUPS.contains(&code) {
        Ok(())
    } else {
        Err(UnknownContributionGroup(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_codes() {
        assert!(validate_contribution_group("ANG").is_ok());
        assert!(validate_contribution_group("A1").is_ok());
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(validate_contribution_group("ZZZ").is_err());
    }
}
