//! Monthly contribution-report serializer (§4.5.1, scenario C of §8).

use amtskern_core::{ContributionLineItem, MonthlyContributionReportPayload};
use serde::{Deserialize, Serialize};

use super::common::{wire_contribution_base, WireOutcome};

pub const MONTHLY_CONTRIBUTION_REPORT_SOAP_ACTION: &str = "urn:elda:beitragsgrundlagenmeldung";

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "ContributionPosition")]
pub struct WireContributionPosition {
    #[serde(rename = "SvNumber")]
    pub sv_number: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ContributionBase")]
    pub contribution_base: String,
    #[serde(rename = "ContributionGroup")]
    pub contribution_group: String,
}

impl From<&ContributionLineItem> for WireContributionPosition {
    fn from(item: &ContributionLineItem) -> Self {
        Self {
            sv_number: item.sv_number.clone(),
            name: item.name.clone(),
            contribution_base: wire_contribution_base(item.contribution_base),
            contribution_group: item.contribution_group.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename = "MonthlyContributionReportRequest")]
pub struct MonthlyContributionReportRequest {
    #[serde(rename = "PeriodYear")]
    pub period_year: i32,
    #[serde(rename = "PeriodMonth")]
    pub period_month: u32,
    #[serde(rename = "Position")]
    pub positions: Vec<WireContributionPosition>,
}

impl From<&MonthlyContributionReportPayload> for MonthlyContributionReportRequest {
    fn from(p: &MonthlyContributionReportPayload) -> Self {
        let mut sorted: Vec<&ContributionLineItem> = p.line_items.iter().collect();
        sorted.sort_by_key(|item| item.order_index);
        Self {
            period_year: p.period_year,
            period_month: p.period_month,
            positions: sorted.into_iter().map(WireContributionPosition::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "MonthlyContributionReportResponse")]
pub struct MonthlyContributionReportResponse(pub WireOutcome);

#[cfg(test)]
mod tests {
    use super::*;
    use amtskern_core::Money;

    /// Scenario C of §8: two line items serialize in order.
    #[test]
    fn positions_serialize_in_order_index() {
        let payload = MonthlyContributionReportPayload {
            period_year: 2024,
            period_month: 11,
            line_items: vec![
                ContributionLineItem {
                    sv_number: "B".into(),
                    name: "Beta".into(),
                    contribution_base: Money::from_minor_units(180000),
                    contribution_group: "ANG".into(),
                    order_index: 1,
                },
                ContributionLineItem {
                    sv_number: "A".into(),
                    name: "Alpha".into(),
                    contribution_base: Money::from_minor_units(350000),
                    contribution_group: "ANG".into(),
                    order_index: 0,
                },
            ],
        };
        let request = MonthlyContributionReportRequest::from(&payload);
        assert_eq!(request.positions[0].sv_number, "A");
        assert_eq!(request.positions[1].sv_number, "B");

        let xml = quick_xml::se::to_string(&request).unwrap();
        let a_pos = xml.find("Alpha").unwrap();
        let b_pos = xml.find("Beta").unwrap();
        assert!(a_pos < b_pos);
    }
}
