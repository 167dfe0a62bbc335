//! Submission-level validation: date-range well-formedness, duplicate
//! subjects, and the per-kind orchestration that produces the field
//! findings `amtskern-submissions` persists on a row (§4.2, §4.5 step 1).

use crate::amount::check_contribution_base;
use crate::contribution_group::validate_contribution_group;
use crate::sv_number::SvNumber;
use amtskern_core::{
    EmploymentData, FieldFinding, MonthlyContributionReportPayload, Severity, SubmissionPayload,
    ValidationError,
};

/// Date-range well-formedness (§4.2): end >= start, and — for
/// employment data where the identifier embeds a birth date — the
/// embedded date is consistent with the extracted SV-number date.
fn validate_date_range(data: &EmploymentData, findings: &mut Vec<FieldFinding>) {
    if let Some(end) = data.employment_end {
        if end < data.employment_start {
            findings.push(FieldFinding {
                field: "employment_end".into(),
                code: "end-before-start".into(),
                message: "employment_end must not precede employment_start".into(),
                severity: Severity::Error,
            });
        }
    }

    match SvNumber::parse(&data.sv_number) {
        Ok(sv) => {
            if sv.birth_date() != data.date_of_birth {
                findings.push(FieldFinding {
                    field: "date_of_birth".into(),
                    code: "birth-date-mismatch".into(),
                    message: "date_of_birth does not match the date embedded in sv_number".into(),
                    severity: Severity::Error,
                });
            }
        }
        Err(e) => findings.push(FieldFinding {
            field: "sv_number".into(),
            code: sv_number_error_code(&e),
            message: e.to_string(),
            severity: Severity::Error,
        }),
    }
}

fn sv_number_error_code(e: &crate::sv_number::SvNumberError) -> String {
    use crate::sv_number::SvNumberError::*;
    match e {
        WrongLength => "wrong-length",
        NotNumeric => "not-numeric",
        SerialZero => "serial-zero",
        CheckDigitUndefined => "check-digit-undefined",
        CheckDigitMismatch { .. } => "check-digit-mismatch",
        ImplausibleDate => "implausible-date",
    }
    .to_string()
}

fn validate_employment_data(data: &EmploymentData, findings: &mut Vec<FieldFinding>) {
    validate_date_range(data, findings);

    if let Err(e) = validate_contribution_group(&data.contribution_group) {
        findings.push(FieldFinding {
            field: "contribution_group".into(),
            code: "unknown-contribution-group".into(),
            message: e.to_string(),
            severity: Severity::Error,
        });
    }

    for warning in check_contribution_base(data.remuneration) {
        findings.push(FieldFinding {
            field: "remuneration".into(),
            code: amount_warning_code(warning),
            message: amount_warning_message(warning),
            severity: Severity::Warning,
        });
    }
    // sonderzahlung >= 0 is guaranteed by `Money`'s unsigned representation.
}

fn amount_warning_code(w: crate::amount::AmountWarning) -> String {
    use crate::amount::AmountWarning::*;
    match w {
        BelowGeringfuegigThreshold => "below-geringfuegig-threshold",
        AboveMaximumBase => "above-maximum-base",
    }
    .to_string()
}

fn amount_warning_message(w: crate::amount::AmountWarning) -> String {
    use crate::amount::AmountWarning::*;
    match w {
        BelowGeringfuegigThreshold => "remuneration at or below the marginal-employment threshold".into(),
        AboveMaximumBase => "remuneration above the maximum contribution base; will be clamped on submit".into(),
    }
}

/// Duplicate-subject check (§4.2): a given identifier may not appear
/// twice among line items of the same submission.
fn validate_no_duplicate_subjects(payload: &MonthlyContributionReportPayload, findings: &mut Vec<FieldFinding>) {
    let mut seen = std::collections::HashSet::new();
    for (idx, item) in payload.line_items.iter().enumerate() {
        if !seen.insert(item.sv_number.clone()) {
            findings.push(FieldFinding {
                field: format!("line_items[{idx}].sv_number"),
                code: "duplicate-subject".into(),
                message: format!("sv_number {} appears more than once in this submission", item.sv_number),
                severity: Severity::Error,
            });
        }
    }
}

/// Validate a full submission payload, per its kind (§4.5 step 1:
/// "re-run C2 on the current payload").
pub fn validate_payload(payload: &SubmissionPayload) -> Result<Vec<FieldFinding>, ValidationError> {
    let mut findings = Vec::new();

    match payload {
        SubmissionPayload::Registration(d) | SubmissionPayload::Deregistration(d) | SubmissionPayload::Change(d) => {
            validate_employment_data(d, &mut findings);
        }
        SubmissionPayload::MonthlyContributionReport(p) => {
            validate_no_duplicate_subjects(p, &mut findings);
            for (idx, item) in p.line_items.iter().enumerate() {
                if let Err(e) = SvNumber::parse(&item.sv_number) {
                    findings.push(FieldFinding {
                        field: format!("line_items[{idx}].sv_number"),
                        code: sv_number_error_code(&e),
                        message: e.to_string(),
                        severity: Severity::Error,
                    });
                }
                if let Err(e) = validate_contribution_group(&item.contribution_group) {
                    findings.push(FieldFinding {
                        field: format!("line_items[{idx}].contribution_group"),
                        code: "unknown-contribution-group".into(),
                        message: e.to_string(),
                        severity: Severity::Error,
                    });
                }
                for warning in check_contribution_base(item.contribution_base) {
                    findings.push(FieldFinding {
                        field: format!("line_items[{idx}].contribution_base"),
                        code: amount_warning_code(warning),
                        message: amount_warning_message(warning),
                        severity: Severity::Warning,
                    });
                }
            }
        }
        SubmissionPayload::AnnualTaxForm(d) => {
            if let Err(e) = SvNumber::parse(&d.sv_number) {
                findings.push(FieldFinding {
                    field: "sv_number".into(),
                    code: sv_number_error_code(&e),
                    message: e.to_string(),
                    severity: Severity::Error,
                });
            }
        }
        SubmissionPayload::TaxReturn(_) => {
            // No identifier-level checks apply to a tax-return envelope;
            // its office id is checked by the protocol client's own
            // credential resolution, not here.
        }
    }

    let has_errors = findings.iter().any(|f| f.severity == Severity::Error);
    if has_errors {
        return Err(ValidationError::Fields(findings));
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amtskern_core::{Address, BankDetails, ContributionLineItem, Money};
    use chrono::NaiveDate;

    fn sample_employment(sv_number: &str) -> EmploymentData {
        EmploymentData {
            sv_number: sv_number.to_string(),
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
    fn valid_registration_passes() {
        let payload = SubmissionPayload::Registration(sample_employment("1234010180"));
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn birth_date_mismatch_is_reported() {
        let mut data = sample_employment("1234010180");
        data.date_of_birth = NaiveDate::from_ymd_opt(1999, 5, 5).unwrap();
        let payload = SubmissionPayload::Registration(data);
        let err = validate_payload(&payload).unwrap_err();
        assert!(err.findings().iter().any(|f| f.code == "birth-date-mismatch"));
    }

    #[test]
    fn end_before_start_is_reported() {
        let mut data = sample_employment("1234010180");
        data.employment_end = Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        let payload = SubmissionPayload::Registration(data);
        let err = validate_payload(&payload).unwrap_err();
        assert!(err.findings().iter().any(|f| f.code == "end-before-start"));
    }

    /// Scenario C of §8: a monthly contribution report with two
    /// distinct line items validates cleanly.
    #[test]
    fn scenario_c_monthly_contribution_validates() {
        let payload = SubmissionPayload::MonthlyContributionReport(MonthlyContributionReportPayload {
            period_year: 2024,
            period_month: 11,
            line_items: vec![
                ContributionLineItem {
                    sv_number: "1234010180".into(),
                    name: "A".into(),
                    contribution_base: Money::from_decimal_str("3500.00").unwrap(),
                    contribution_group: "ANG".into(),
                    order_index: 0,
                },
                ContributionLineItem {
                    sv_number: "4566230995".into(),
                    name: "B".into(),
                    contribution_base: Money::from_decimal_str("1800.00").unwrap(),
                    contribution_group: "ANG".into(),
                    order_index: 1,
                },
            ],
        });
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn duplicate_subject_is_rejected() {
        let line = ContributionLineItem {
            sv_number: "1234010180".into(),
            name: "A".into(),
            contribution_base: Money::from_minor_units(100000),
            contribution_group: "ANG".into(),
            order_index: 0,
        };
        let payload = SubmissionPayload::MonthlyContributionReport(MonthlyContributionReportPayload {
            period_year: 2024,
            period_month: 11,
            line_items: vec![line.clone(), line],
        });
        let err = validate_payload(&payload).unwrap_err();
        assert!(err.findings().iter().any(|f| f.code == "duplicate-subject"));
    }
}
