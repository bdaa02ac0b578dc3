//! Machine-readable overview of an asset report collection

use crate::composer::{ComposeOutcome, ComposeStage, ReportRecord};
use crate::locate::locate_container;
use crate::xml::Document;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub addresses: Vec<String>,
    pub mac_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompositionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<ComposeStage>,
    pub report_requests: Vec<String>,
    pub reports: Vec<String>,
    pub assets: Vec<AssetSummary>,
    pub relationships: Vec<RelationshipSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<ReportRecord>,
    pub warnings: usize,
    pub errors: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub dropped_diagnostics: usize,
}

fn is_zero(count: &usize) -> bool {
    *count == 0
}

impl CompositionSummary {
    /// Summarize an existing collection
    pub fn from_document(doc: &Document) -> Self {
        let ids = |container: &str, component: &str| -> Vec<String> {
            locate_container(doc, container)
                .map(|node| {
                    doc.children_named(node, component)
                        .filter_map(|child| doc.attribute(child, "id").map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        let assets = locate_container(doc, "assets")
            .map(|node| {
                doc.children_named(node, "asset")
                    .map(|asset| {
                        let mut summary = AssetSummary {
                            id: doc.attribute(asset, "id").unwrap_or_default().to_string(),
                            ..AssetSummary::default()
                        };
                        for node in doc.descendants(asset) {
                            match doc.local_name(node) {
                                Some("fqdn") if summary.fqdn.is_none() => {
                                    summary.fqdn = Some(doc.text_content(node));
                                }
                                Some("hostname") if summary.hostname.is_none() => {
                                    summary.hostname = Some(doc.text_content(node));
                                }
                                Some("ip-v4") | Some("ip-v6") => {
                                    summary.addresses.push(doc.text_content(node));
                                }
                                Some("mac-address") => {
                                    summary.mac_addresses.push(doc.text_content(node));
                                }
                                _ => {}
                            }
                        }
                        summary
                    })
                    .collect()
            })
            .unwrap_or_default();

        let relationships = locate_container(doc, "relationships")
            .map(|node| {
                doc.children_named(node, "relationship")
                    .map(|relationship| RelationshipSummary {
                        kind: doc.attribute(relationship, "type").unwrap_or_default().to_string(),
                        subject: doc
                            .attribute(relationship, "subject")
                            .unwrap_or_default()
                            .to_string(),
                        references: doc
                            .children_named(relationship, "ref")
                            .map(|reference| doc.text_content(reference))
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            report_requests: ids("report-requests", "report-request"),
            reports: ids("reports", "report"),
            assets,
            relationships,
            ..Self::default()
        }
    }

    /// Summarize a fresh composition, including its diagnostics
    pub fn from_outcome(outcome: &ComposeOutcome) -> Self {
        Self {
            stage: Some(outcome.stage),
            records: outcome.reports.clone(),
            warnings: outcome.warnings().count(),
            errors: outcome.errors().count(),
            dropped_diagnostics: outcome.dropped_diagnostics,
            ..Self::from_document(&outcome.document)
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_summary_of_collection() {
        let doc = parse_str(
            r#"<arf:asset-report-collection xmlns:arf="http://scap.nist.gov/schema/asset-reporting-format/1.1"
                   xmlns:core="http://scap.nist.gov/schema/reporting-core/1.1"
                   xmlns:ai="http://scap.nist.gov/schema/asset-identification/1.1">
                 <core:relationships>
                   <core:relationship type="arfvocab:isAbout" subject="xccdf1"><core:ref>asset0</core:ref></core:relationship>
                 </core:relationships>
                 <arf:report-requests><arf:report-request id="collection1"/></arf:report-requests>
                 <arf:assets>
                   <arf:asset id="asset0"><ai:computing-device>
                     <ai:connections><ai:connection><ai:ip-address><ai:ip-v4>10.0.0.1</ai:ip-v4></ai:ip-address></ai:connection></ai:connections>
                     <ai:fqdn>host.example.com</ai:fqdn>
                   </ai:computing-device></arf:asset>
                 </arf:assets>
                 <arf:reports><arf:report id="xccdf1"/><arf:report id="oval0"/></arf:reports>
               </arf:asset-report-collection>"#,
        )
        .unwrap();

        let summary = CompositionSummary::from_document(&doc);
        assert_eq!(summary.report_requests, ["collection1"]);
        assert_eq!(summary.reports, ["xccdf1", "oval0"]);
        assert_eq!(summary.assets[0].addresses, ["10.0.0.1"]);
        assert_eq!(summary.assets[0].fqdn.as_deref(), Some("host.example.com"));
        assert_eq!(summary.relationships[0].references, ["asset0"]);

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["relationships"][0]["type"], "arfvocab:isAbout");
        assert!(json.get("stage").is_none());
    }
}
