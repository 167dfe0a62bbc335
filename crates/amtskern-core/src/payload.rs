//! Kind-specific submission payloads (§3, §4.5.1).
//!
//! The design notes (§9) warn against a type hierarchy with shared base
//! fields for submission kinds, since kinds diverge in mandatory/optional
//! structure. [`SubmissionPayload`] is instead a closed, tagged enum —
//! one variant per kind, each with its own field set. Validation
//! (`amtskern-validator`) and wire serialization (`amtskern-protocol`)
//! both match on this enum rather than on a shared trait object.

use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A postal address. Omitted entirely (not emitted with empty fields)
/// when a kind's payload has no address change to report (§4.5.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Bank details for salary/contribution payment routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub iban: String,
    pub bic: String,
}

/// Employment terms shared by registration, deregistration, and change
/// submissions. All the fields the change-category table (§4.5) diffs
/// against a prior baseline live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentData {
    /// The 10-digit Austrian social-security number (Versicherungsnummer).
    pub sv_number: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub employment_start: NaiveDate,
    pub employment_end: Option<NaiveDate>,
    pub working_hours_per_week: f32,
    pub role: String,
    pub grading: String,
    pub work_location: String,
    pub collective_agreement: String,
    pub contribution_group: String,
    pub remuneration: Money,
    pub sonderzahlung: Money,
    pub address: Address,
    pub bank: BankDetails,
}

/// One employee's contribution row within a monthly contribution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLineItem {
    pub sv_number: String,
    pub name: String,
    pub contribution_base: Money,
    pub contribution_group: String,
    pub order_index: i32,
}

/// Monthly per-employer filing (ELDA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyContributionReportPayload {
    pub period_year: i32,
    pub period_month: u32,
    pub line_items: Vec<ContributionLineItem>,
}

impl MonthlyContributionReportPayload {
    /// Total position count and summed base, as checked in scenario C
    /// of §8 ("totals are `2 / 5300.00`").
    pub fn totals(&self) -> (usize, Money) {
        let sum = self
            .line_items
            .iter()
            .fold(0u64, |acc, li| acc + li.contribution_base.minor_units());
        (self.line_items.len(), Money::from_minor_units(sum))
    }
}

/// One key-coded line on an annual wage statement or tax-return envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLineItem {
    /// The code as defined by FinanzOnline (e.g. L16-style wage codes).
    pub code: String,
    pub amount: Money,
}

/// Per-employee year-end wage statement (FinanzOnline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTaxFormPayload {
    pub year: i32,
    pub sv_number: String,
    pub name: String,
    pub line_items: Vec<TaxLineItem>,
}

/// Tax-return envelope (FinanzOnline databox submission).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReturnPayload {
    pub office_id: String,
    pub period: String,
    pub line_items: Vec<TaxLineItem>,
}

/// The closed set of per-kind payloads (§3, §4.5.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum SubmissionPayload {
    Registration(EmploymentData),
    Deregistration(EmploymentData),
    Change(EmploymentData),
    AnnualTaxForm(AnnualTaxFormPayload),
    MonthlyContributionReport(MonthlyContributionReportPayload),
    TaxReturn(TaxReturnPayload),
}

impl SubmissionPayload {
    pub fn kind(&self) -> super::submission::SubmissionKind {
        use super::submission::SubmissionKind::*;
        match self {
            Self::Registration(_) => Registration,
            Self::Deregistration(_) => Deregistration,
            Self::Change(_) => Change,
            Self::AnnualTaxForm(_) => AnnualTaxForm,
            Self::MonthlyContributionReport(_) => MonthlyContributionReport,
            Self::TaxReturn(_) => TaxReturn,
        }
    }

    /// The subject key (social-security number), where the kind has one.
    pub fn subject_key(&self) -> Option<&str> {
        match self {
            Self::Registration(d) | Self::Deregistration(d) | Self::Change(d) => Some(&d.sv_number),
            Self::AnnualTaxForm(d) => Some(&d.sv_number),
            Self::MonthlyContributionReport(_) | Self::TaxReturn(_) => None,
        }
    }

    /// Employment data, where applicable — used by change detection
    /// (§4.5) to read and compare fields.
    pub fn employment_data(&self) -> Option<&EmploymentData> {
        match self {
            Self::Registration(d) | Self::Deregistration(d) | Self::Change(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line(sv: &str, base_cents: u64, idx: i32) -> ContributionLineItem {
        ContributionLineItem {
            sv_number: sv.to_string(),
            name: format!("Employee {sv}"),
            contribution_base: Money::from_minor_units(base_cents),
            contribution_group: "A1".to_string(),
            order_index: idx,
        }
    }

    #[test]
    fn monthly_contribution_totals_match_scenario_c() {
        let payload = MonthlyContributionReportPayload {
            period_year: 2024,
            period_month: 11,
            line_items: vec![sample_line("A", 350000, 0), sample_line("B", 180000, 1)],
        };
        let (count, total) = payload.totals();
        assert_eq!(count, 2);
        assert_eq!(total.to_decimal_string(), "5300.00");
    }
}
