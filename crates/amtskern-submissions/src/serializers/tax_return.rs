//! Tax-return envelope serializer (FinanzOnline databox submission, §4.5.1).

use amtskern_core::TaxReturnPayload;
use serde::{Deserialize, Serialize};

use super::annual_tax_form::WireTaxLine;
use super::common::WireOutcome;

pub const TAX_RETURN_SOAP_ACTION: &str = "urn:finanzonline:steuererklaerung";

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "TaxReturnRequest")]
pub struct TaxReturnRequest {
    #[serde(rename = "OfficeId")]
    pub office_id: String,
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Line")]
    pub lines: Vec<WireTaxLine>,
}

impl From<&TaxReturnPayload> for TaxReturnRequest {
    fn from(p: &TaxReturnPayload) -> Self {
        Self {
            office_id: p.office_id.clone(),
            period: p.period.clone(),
            lines: p.line_items.iter().map(WireTaxLine::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "TaxReturnResponse")]
pub struct TaxReturnResponse(pub WireOutcome);
