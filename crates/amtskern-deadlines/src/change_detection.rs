//! Field-level change detection (§4.5): diffing a baseline
//! [`EmploymentData`] against the subject's current field values and
//! classifying each difference into the fixed change-category
//! enumeration.

use amtskern_core::{ChangeCategory, Changeset, EmploymentData, FieldChange};

/// Diff `baseline` against `current`, producing one [`FieldChange`] per
/// field in the change-category table (§4.5) that differs. An empty
/// result means nothing changed — callers check
/// [`Changeset::is_empty`] before deciding there's nothing to submit.
pub fn detect_change(baseline: &EmploymentData, current: &EmploymentData) -> Changeset {
    let mut changes = Vec::new();

    macro_rules! diff {
        ($field:expr, $old:expr, $new:expr, $category:expr) => {
            if $old != $new {
                changes.push(FieldChange {
                    field: $field.to_string(),
                    old: $old.to_string(),
                    new: $new.to_string(),
                    category: $category,
                });
            }
        };
    }

    diff!("remuneration", baseline.remuneration, current.remuneration, ChangeCategory::Remuneration);
    diff!(
        "working_hours_per_week",
        format!("{:.2}", baseline.working_hours_per_week),
        format!("{:.2}", current.working_hours_per_week),
        ChangeCategory::WorkHours
    );
    diff!("role", baseline.role, current.role, ChangeCategory::Role);
    diff!("grading", baseline.grading, current.grading, ChangeCategory::Grading);
    diff!("work_location", baseline.work_location, current.work_location, ChangeCategory::WorkLocation);
    diff!(
        "collective_agreement",
        baseline.collective_agreement,
        current.collective_agreement,
        ChangeCategory::CollectiveAgreement
    );
    diff!(
        "contribution_group",
        baseline.contribution_group,
        current.contribution_group,
        ChangeCategory::ContributionGroup
    );
    if baseline.address != current.address {
        changes.push(FieldChange {
            field: "address".into(),
            old: format!("{:?}", baseline.address),
            new: format!("{:?}", current.address),
            category: ChangeCategory::Address,
        });
    }
    if baseline.bank != current.bank {
        changes.push(FieldChange {
            field: "bank".into(),
            old: format!("{:?}", baseline.bank),
            new: format!("{:?}", current.bank),
            category: ChangeCategory::Bank,
        });
    }
    diff!("name", baseline.name, current.name, ChangeCategory::Name);

    Changeset { changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amtskern_core::{Address, BankDetails, Money};
    use chrono::NaiveDate;

    fn sample() -> EmploymentData {
        EmploymentData {
            sv_number: "1234010180".into(),
            name: "Max Mustermann".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            employment_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            employment_end: None,
            working_hours_per_week: 38.5,
            role: "Clerk".into(),
            grading: "II".into(),
            work_location: "Vienna".into(),
            collective_agreement: "KV-Handel".into(),
            contribution_group: "ANG".into(),
            remuneration: Money::from_minor_units(350000),
            sonderzahlung: Money::ZERO,
            address: Address {
                street: "Hauptstraße 1".into(),
                postal_code: "1010".into(),
                city: "Wien".into(),
                country: "AT".into(),
            },
            bank: BankDetails {
                iban: "AT611904300234573201".into(),
                bic: "BKAUATWW".into(),
            },
        }
    }

    #[test]
    fn no_difference_yields_empty_changeset() {
        let baseline = sample();
        let current = sample();
        assert!(detect_change(&baseline, &current).is_empty());
    }

    #[test]
    fn single_field_change_has_a_single_category_label() {
        let baseline = sample();
        let mut current = sample();
        current.role = "Manager".into();
        let changeset = detect_change(&baseline, &current);
        assert_eq!(changeset.label(), Some(ChangeCategory::Role));
    }

    #[test]
    fn multiple_field_changes_label_as_multi() {
        let baseline = sample();
        let mut current = sample();
        current.role = "Manager".into();
        current.remuneration = Money::from_minor_units(400000);
        let changeset = detect_change(&baseline, &current);
        assert_eq!(changeset.label(), Some(ChangeCategory::Multi));
    }
}
