//! Parses a complete set of filing documents.

use folio_xbrl::{parse_instance, parse_labels, parse_linkbase, roles};

const INSTANCE: &str = include_str!("../../folio-engine/tests/fixtures/acme-20231231_htm.xml");
const PRESENTATION: &str = include_str!("../../folio-engine/tests/fixtures/acme-20231231_pre.xml");
const CALCULATION: &str = include_str!("../../folio-engine/tests/fixtures/acme-20231231_cal.xml");
const LABELS: &str = include_str!("../../folio-engine/tests/fixtures/acme-20231231_lab.xml");

#[test]
fn test_instance() {
    let doc = parse_instance(INSTANCE).unwrap();
    assert_eq!(doc.skipped, 0);
    assert_eq!(doc.units.get("usdPerShare").map(String::as_str), Some("iso4217_USD/xbrli_shares"));

    let document_type = doc.facts_for("dei_DocumentType").next().unwrap();
    assert_eq!(document_type.raw_value, "10-K");
    assert_eq!(document_type.value, None);

    let nil: Vec<_> = doc
        .facts_for("us-gaap_Revenues")
        .filter(|f| f.value.is_none())
        .collect();
    assert_eq!(nil.len(), 2);

    let europe = doc
        .facts_for("us-gaap_Assets")
        .find(|f| f.dimensions.member("us-gaap_StatementGeographicalAxis") == Some("srt_EuropeMember"))
        .unwrap();
    assert_eq!(europe.value, Some(150.0));
}

#[test]
fn test_presentation_keeps_both_roll_forward_arcs() {
    let rels = parse_linkbase(PRESENTATION).unwrap();
    let balances: Vec<_> = rels
        .iter()
        .filter(|r| r.role.ends_with("StockholdersEquity") && r.to == "us-gaap_StockholdersEquity")
        .collect();
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].preferred_label.as_deref(), Some(roles::PERIOD_START));
    assert_eq!(balances[1].preferred_label.as_deref(), Some(roles::PERIOD_END));
}

#[test]
fn test_calculation_weights() {
    let rels = parse_linkbase(CALCULATION).unwrap();
    let cost = rels
        .iter()
        .find(|r| r.from == "us-gaap_GrossProfit" && r.to == "us-gaap_CostOfRevenue")
        .unwrap();
    assert_eq!(cost.weight.as_deref(), Some("-1"));
    assert!(rels.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[test]
fn test_labels() {
    let labels = parse_labels(LABELS).unwrap();
    assert_eq!(labels.lookup("us-gaap_Revenues", None), Some("Revenues"));
    assert_eq!(
        labels.lookup("us-gaap_Assets", Some(roles::TOTAL)),
        Some("Total assets")
    );
    assert_eq!(
        labels.lookup("us-gaap_LiabilitiesAndStockholdersEquity", None),
        Some("Total liabilities and stockholders' equity")
    );
    assert_eq!(labels.lookup("srt_NorthAmericaMember", None), None);
}
