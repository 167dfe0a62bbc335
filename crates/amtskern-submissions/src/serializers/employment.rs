//! Serializers for the three employment-data kinds: registration,
//! deregistration, change (§4.5.1). All three carry the identical
//! [`EmploymentData`] payload shape but target distinct SOAP actions
//! and distinct root elements, so each gets its own concrete wire
//! type rather than a shared base — the design note in §9 warns
//! against a type hierarchy here, and a macro expanding to three
//! independent structs is not one.

use amtskern_core::EmploymentData;
use serde::{Deserialize, Serialize};

use super::common::{wire_amount, wire_date, WireAddress, WireBank, WireOutcome};

macro_rules! employment_wire_kind {
    ($request:ident, $request_tag:literal, $response:ident, $response_tag:literal, $action:ident, $action_value:literal) => {
        #[derive(Debug, Clone, Serialize)]
        #[serde(rename = $request_tag)]
        pub struct $request {
            #[serde(rename = "SvNumber")]
            pub sv_number: String,
            #[serde(rename = "Name")]
            pub name: String,
            #[serde(rename = "DateOfBirth")]
            pub date_of_birth: String,
            #[serde(rename = "EmploymentStart")]
            pub employment_start: String,
            #[serde(rename = "EmploymentEnd", skip_serializing_if = "Option::is_none")]
            pub employment_end: Option<String>,
            #[serde(rename = "WorkingHoursPerWeek")]
            pub working_hours_per_week: String,
            #[serde(rename = "Role")]
            pub role: String,
            #[serde(rename = "Grading")]
            pub grading: String,
            #[serde(rename = "WorkLocation")]
            pub work_location: String,
            #[serde(rename = "CollectiveAgreement")]
            pub collective_agreement: String,
            #[serde(rename = "ContributionGroup")]
            pub contribution_group: String,
            #[serde(rename = "Remuneration")]
            pub remuneration: String,
            #[serde(rename = "Sonderzahlung")]
            pub sonderzahlung: String,
            #[serde(rename = "Address")]
            pub address: WireAddress,
            #[serde(rename = "Bank")]
            pub bank: WireBank,
        }

        impl From<&EmploymentData> for $request {
            fn from(d: &EmploymentData) -> Self {
                Self {
                    sv_number: d.sv_number.clone(),
                    name: d.name.clone(),
                    date_of_birth: wire_date(d.date_of_birth),
                    employment_start: wire_date(d.employment_start),
                    employment_end: d.employment_end.map(wire_date),
                    working_hours_per_week: format!("{:.2}", d.working_hours_per_week),
                    role: d.role.clone(),
                    grading: d.grading.clone(),
                    work_location: d.work_location.clone(),
                    collective_agreement: d.collective_agreement.clone(),
                    contribution_group: d.contribution_group.clone(),
                    remuneration: wire_amount(d.remuneration),
                    sonderzahlung: wire_amount(d.sonderzahlung),
                    address: WireAddress::from(&d.address),
                    bank: WireBank::from(&d.bank),
                }
            }
        }

        #[derive(Debug, Clone, Deserialize)]
        #[serde(rename = $response_tag)]
        pub struct $response(pub WireOutcome);

        pub const $action: &str = $action_value;
    };
}

employment_wire_kind!(
    RegistrationRequest,
    "RegistrationRequest",
    RegistrationResponse,
    "RegistrationResponse",
    REGISTRATION_SOAP_ACTION,
    "urn:elda:anmeldung"
);

employment_wire_kind!(
    DeregistrationRequest,
    "DeregistrationRequest",
    DeregistrationResponse,
    "DeregistrationResponse",
    DEREGISTRATION_SOAP_ACTION,
    "urn:elda:abmeldung"
);

employment_wire_kind!(
    ChangeRequest,
    "ChangeRequest",
    ChangeResponse,
    "ChangeResponse",
    CHANGE_SOAP_ACTION,
    "urn:elda:aenderungsmeldung"
);

/// The correction wrapper for any employment-data kind (§4.5
/// "Correction"): the original protocol number travels alongside the
/// full current payload, under a distinct SOAP action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "CorrectionRequest")]
pub struct EmploymentCorrectionRequest {
    #[serde(rename = "OriginalProtocolNumber")]
    pub original_protocol_number: String,
    #[serde(rename = "Registration", skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationRequest>,
    #[serde(rename = "Deregistration", skip_serializing_if = "Option::is_none")]
    pub deregistration: Option<DeregistrationRequest>,
    #[serde(rename = "Change", skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeRequest>,
}

pub const EMPLOYMENT_CORRECTION_SOAP_ACTION: &str = "urn:elda:korrekturmeldung";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "CorrectionResponse")]
pub struct EmploymentCorrectionResponse(pub WireOutcome);

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
    fn registration_request_omits_employment_end_when_absent() {
        let data = sample();
        let request = RegistrationRequest::from(&data);
        let xml = quick_xml::se::to_string(&request).unwrap();
        assert!(!xml.contains("EmploymentEnd"));
        assert!(xml.contains("<Remuneration>3500.00</Remuneration>"));
    }

    #[test]
    fn employment_end_is_emitted_when_present() {
        let mut data = sample();
        data.employment_end = Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        let request = DeregistrationRequest::from(&data);
        let xml = quick_xml::se::to_string(&request).unwrap();
        assert!(xml.contains("<EmploymentEnd>2024-12-31</EmploymentEnd>"));
    }

    #[test]
    fn amount_above_maximum_base_is_clamped_at_wire_boundary() {
        let mut data = sample();
        data.remuneration = Money::from_minor_units(900_000);
        let request = RegistrationRequest::from(&data);
        assert_eq!(request.remuneration, amtskern_validator::MAXIMUM_CONTRIBUTION_BASE.to_decimal_string());
    }
}
