//! Annual wage-statement serializer (§4.5.1).

use amtskern_core::{AnnualTaxFormPayload, TaxLineItem};
use serde::{Deserialize, Serialize};

use super::common::{wire_amount, WireOutcome};

pub const ANNUAL_TAX_FORM_SOAP_ACTION: &str = "urn:finanzonline:lohnzettel";
pub const ANNUAL_TAX_FORM_CORRECTION_SOAP_ACTION: &str = "urn:finanzonline:lohnzettel-korrektur";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Line")]
pub struct WireTaxLine {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}

impl From<&TaxLineItem> for WireTaxLine {
    fn from(item: &TaxLineItem) -> Self {
        Self {
            code: item.code.clone(),
            amount: wire_amount(item.amount),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "AnnualTaxFormRequest")]
pub struct AnnualTaxFormRequest {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "SvNumber")]
    pub sv_number: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Line")]
    pub lines: Vec<WireTaxLine>,
}

impl From<&AnnualTaxFormPayload> for AnnualTaxFormRequest {
    fn from(p: &AnnualTaxFormPayload) -> Self {
        Self {
            year: p.year,
            sv_number: p.sv_number.clone(),
            name: p.name.clone(),
            lines: p.line_items.iter().map(WireTaxLine::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "AnnualTaxFormCorrectionRequest")]
pub struct AnnualTaxFormCorrectionRequest {
    #[serde(rename = "OriginalProtocolNumber")]
    pub original_protocol_number: String,
    #[serde(rename = "Form")]
    pub form: AnnualTaxFormRequest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "AnnualTaxFormResponse")]
pub struct AnnualTaxFormResponse(pub WireOutcome);
