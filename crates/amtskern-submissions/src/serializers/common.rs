//! Wire-shape helpers shared by every per-kind serializer (§4.5.1, §6).
//!
//! The domain payloads in `amtskern-core` carry [`Money`] and
//! [`chrono::NaiveDate`]; the wire schema wants a two-fractional-digit
//! decimal string and an ISO-8601 `YYYY-MM-DD` string respectively
//! (§6). Converting both at this single seam means no serializer
//! module reimplements the formatting rule.

use amtskern_core::{Address, BankDetails, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub fn wire_amount(amount: Money) -> String {
    amount.to_decimal_string()
}

/// Like [`wire_amount`], but for the one field the maximum-contribution-base
/// ceiling actually applies to (§4.2: "maximum-base threshold (warning, value
/// clamped at wire boundary)") — the monthly contribution base, not every
/// monetary field on the wire.
pub fn wire_contribution_base(amount: Money) -> String {
    amtskern_validator::clamp_to_maximum_base(amount).to_decimal_string()
}

pub fn wire_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Postal address, wire shape. Only constructed when the kind's
/// payload actually carries an address change — callers never emit
/// this with empty fields (§4.5.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAddress {
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "PostalCode")]
    pub postal_code: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
}

impl From<&Address> for WireAddress {
    fn from(a: &Address) -> Self {
        Self {
            street: a.street.clone(),
            postal_code: a.postal_code.clone(),
            city: a.city.clone(),
            country: a.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBank {
    #[serde(rename = "Iban")]
    pub iban: String,
    #[serde(rename = "Bic")]
    pub bic: String,
}

impl From<&BankDetails> for WireBank {
    fn from(b: &BankDetails) -> Self {
        Self {
            iban: b.iban.clone(),
            bic: b.bic.clone(),
        }
    }
}

/// The field set every government reply shares regardless of kind:
/// a success flag plus, on success, a protocol number, and on
/// rejection, a machine-readable code and message (§4.5 step 3).
///
/// `processing_complete` carries the remote's own signal that it has
/// already finished processing the submission rather than merely
/// acknowledged receipt (§4.5 step 3: "If the remote immediately
/// reports a processing result the transition continues to
/// `accepted`"). Absent on replies that only ever acknowledge.
#[derive(Debug, Clone, Deserialize)]
pub struct WireOutcome {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "ProtocolNumber")]
    pub protocol_number: Option<String>,
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<String>,
    #[serde(rename = "ProcessingComplete", default)]
    pub processing_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_complete_defaults_to_false_when_the_reply_omits_it() {
        let xml = r#"<Outcome><Success>true</Success><ProtocolNumber>P1</ProtocolNumber></Outcome>"#;
        let outcome: WireOutcome = quick_xml::de::from_str(xml).unwrap();
        assert!(!outcome.processing_complete);
    }

    #[test]
    fn processing_complete_true_is_read_from_an_explicit_reply() {
        let xml = r#"<Outcome><Success>true</Success><ProtocolNumber>P1</ProtocolNumber><ProcessingComplete>true</ProcessingComplete></Outcome>"#;
        let outcome: WireOutcome = quick_xml::de::from_str(xml).unwrap();
        assert!(outcome.processing_complete);
    }
}
