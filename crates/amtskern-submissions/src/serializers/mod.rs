//! Kind-specific XML serializers (C1 applied per-kind, §4.5.1).
//!
//! Each submodule owns one wire schema: fixed element order, amounts
//! formatted at the boundary via [`common::wire_amount`], optional
//! sub-structures omitted rather than emitted empty. This module ties
//! them to the envelope codec (`amtskern_protocol::encode_envelope`/
//! `decode_envelope`) and exposes one entry point the engine calls
//! without having to match on [`SubmissionKind`] itself in more than
//! one place.

pub mod annual_tax_form;
pub mod common;
pub mod employment;
pub mod monthly_contribution_report;
pub mod tax_return;

pub use common::WireOutcome;

use amtskern_core::SubmissionPayload;
use amtskern_protocol::{decode_envelope, encode_envelope, EnvelopeError};

/// The outcome the engine branches on after a successful HTTP round
/// trip (§4.5 step 3): distinct from transport failure, which never
/// reaches this far.
#[derive(Debug, Clone)]
pub struct RemoteOutcome {
    pub success: bool,
    pub protocol_number: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    /// The remote already reported a processing result alongside the
    /// acknowledgement itself (§4.5 step 3), so the engine should carry
    /// the transition straight through to `accepted`.
    pub processing_complete: bool,
}

impl From<WireOutcome> for RemoteOutcome {
    fn from(o: WireOutcome) -> Self {
        Self {
            success: o.success,
            protocol_number: o.protocol_number,
            error_code: o.error_code,
            error_message: o.error_message,
            processing_complete: o.processing_complete,
        }
    }
}

/// The non-correction SOAP action for a submission's kind (§4.5.1,
/// §6). Corrections use [`correction_soap_action`] instead.
pub fn soap_action(payload: &SubmissionPayload) -> &'static str {
    use employment::{CHANGE_SOAP_ACTION, DEREGISTRATION_SOAP_ACTION, REGISTRATION_SOAP_ACTION};
    match payload {
        SubmissionPayload::Registration(_) => REGISTRATION_SOAP_ACTION,
        SubmissionPayload::Deregistration(_) => DEREGISTRATION_SOAP_ACTION,
        SubmissionPayload::Change(_) => CHANGE_SOAP_ACTION,
        SubmissionPayload::AnnualTaxForm(_) => annual_tax_form::ANNUAL_TAX_FORM_SOAP_ACTION,
        SubmissionPayload::MonthlyContributionReport(_) => monthly_contribution_report::MONTHLY_CONTRIBUTION_REPORT_SOAP_ACTION,
        SubmissionPayload::TaxReturn(_) => tax_return::TAX_RETURN_SOAP_ACTION,
    }
}

/// The distinct SOAP action a correction of this kind uses (§4.5
/// "Correction": "a separate SOAP action...that conveys the original
/// protocol number"). `TaxReturn` has no correction path defined by
/// the spec — a tax-return envelope is superseded by a new envelope,
/// never amended in place.
pub fn correction_soap_action(payload: &SubmissionPayload) -> Option<&'static str> {
    use employment::EMPLOYMENT_CORRECTION_SOAP_ACTION;
    match payload {
        SubmissionPayload::Registration(_) | SubmissionPayload::Deregistration(_) | SubmissionPayload::Change(_) => {
            Some(EMPLOYMENT_CORRECTION_SOAP_ACTION)
        }
        SubmissionPayload::AnnualTaxForm(_) => Some(annual_tax_form::ANNUAL_TAX_FORM_CORRECTION_SOAP_ACTION),
        SubmissionPayload::MonthlyContributionReport(_) | SubmissionPayload::TaxReturn(_) => None,
    }
}

/// Encode a fresh (non-correction) submission request as full SOAP
/// envelope bytes, dispatching to the per-kind wire type.
pub fn encode_request(payload: &SubmissionPayload) -> Result<Vec<u8>, EnvelopeError> {
    use annual_tax_form::AnnualTaxFormRequest;
    use employment::{ChangeRequest, DeregistrationRequest, RegistrationRequest};
    use monthly_contribution_report::MonthlyContributionReportRequest;
    use tax_return::TaxReturnRequest;

    match payload {
        SubmissionPayload::Registration(d) => encode_envelope(&RegistrationRequest::from(d)),
        SubmissionPayload::Deregistration(d) => encode_envelope(&DeregistrationRequest::from(d)),
        SubmissionPayload::Change(d) => encode_envelope(&ChangeRequest::from(d)),
        SubmissionPayload::AnnualTaxForm(d) => encode_envelope(&AnnualTaxFormRequest::from(d)),
        SubmissionPayload::MonthlyContributionReport(d) => encode_envelope(&MonthlyContributionReportRequest::from(d)),
        SubmissionPayload::TaxReturn(d) => encode_envelope(&TaxReturnRequest::from(d)),
    }
}

/// Encode a correction request (§4.5 "Correction"): the original
/// protocol number plus the amended payload, under the kind's
/// correction SOAP action. `None` for kinds with no correction path.
pub fn encode_correction_request(payload: &SubmissionPayload, original_protocol_number: &str) -> Option<Result<Vec<u8>, EnvelopeError>> {
    use annual_tax_form::{AnnualTaxFormCorrectionRequest, AnnualTaxFormRequest};
    use employment::{ChangeRequest, DeregistrationRequest, EmploymentCorrectionRequest, RegistrationRequest};

    match payload {
        SubmissionPayload::Registration(d) => Some(encode_envelope(&EmploymentCorrectionRequest {
            original_protocol_number: original_protocol_number.to_string(),
            registration: Some(RegistrationRequest::from(d)),
            deregistration: None,
            change: None,
        })),
        SubmissionPayload::Deregistration(d) => Some(encode_envelope(&EmploymentCorrectionRequest {
            original_protocol_number: original_protocol_number.to_string(),
            registration: None,
            deregistration: Some(DeregistrationRequest::from(d)),
            change: None,
        })),
        SubmissionPayload::Change(d) => Some(encode_envelope(&EmploymentCorrectionRequest {
            original_protocol_number: original_protocol_number.to_string(),
            registration: None,
            deregistration: None,
            change: Some(ChangeRequest::from(d)),
        })),
        SubmissionPayload::AnnualTaxForm(d) => Some(encode_envelope(&AnnualTaxFormCorrectionRequest {
            original_protocol_number: original_protocol_number.to_string(),
            form: AnnualTaxFormRequest::from(d),
        })),
        SubmissionPayload::MonthlyContributionReport(_) | SubmissionPayload::TaxReturn(_) => None,
    }
}

/// Decode a government reply into the kind-agnostic [`RemoteOutcome`]
/// the engine branches on, dispatching to the per-kind response type
/// so the binding (C1) still checks the reply's schema, not just the
/// common fields.
pub fn decode_response(payload: &SubmissionPayload, xml: &[u8]) -> Result<RemoteOutcome, EnvelopeError> {
    use annual_tax_form::AnnualTaxFormResponse;
    use employment::{ChangeResponse, DeregistrationResponse, RegistrationResponse};
    use monthly_contribution_report::MonthlyContributionReportResponse;
    use tax_return::TaxReturnResponse;

    let outcome = match payload {
        SubmissionPayload::Registration(_) => decode_envelope::<RegistrationResponse>(xml)?.0,
        SubmissionPayload::Deregistration(_) => decode_envelope::<DeregistrationResponse>(xml)?.0,
        SubmissionPayload::Change(_) => decode_envelope::<ChangeResponse>(xml)?.0,
        SubmissionPayload::AnnualTaxForm(_) => decode_envelope::<AnnualTaxFormResponse>(xml)?.0,
        SubmissionPayload::MonthlyContributionReport(_) => decode_envelope::<MonthlyContributionReportResponse>(xml)?.0,
        SubmissionPayload::TaxReturn(_) => decode_envelope::<TaxReturnResponse>(xml)?.0,
    };
    Ok(outcome.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amtskern_core::{Address, BankDetails, EmploymentData, Money};
    use chrono::NaiveDate;

    fn sample_registration() -> SubmissionPayload {
        SubmissionPayload::Registration(EmploymentData {
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
        })
    }

    #[test]
    fn encode_and_decode_a_registration_round_trip() {
        let payload = sample_registration();
        let request_bytes = encode_request(&payload).unwrap();
        assert!(std::str::from_utf8(&request_bytes).unwrap().contains("soap:Envelope"));

        let reply = br#"<?xml version="1.0"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><RegistrationResponse><Success>true</Success><ProtocolNumber>P-1</ProtocolNumber></RegistrationResponse></soap:Body></soap:Envelope>"#;
        let outcome = decode_response(&payload, reply).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.protocol_number.as_deref(), Some("P-1"));
    }

    #[test]
    fn monthly_contribution_report_has_no_correction_action() {
        let payload = SubmissionPayload::MonthlyContributionReport(amtskern_core::MonthlyContributionReportPayload {
            period_year: 2024,
            period_month: 11,
            line_items: vec![],
        });
        assert!(correction_soap_action(&payload).is_none());
        assert!(encode_correction_request(&payload, "P-1").is_none());
    }

    #[test]
    fn registration_and_correction_actions_are_distinct() {
        let payload = sample_registration();
        assert_ne!(soap_action(&payload), correction_soap_action(&payload).unwrap());
    }
}
