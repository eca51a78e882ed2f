//! End-to-end statement resolution over a small 10-K.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use folio_core::{
    FilingDocuments, FilingId, FolioError, PeriodCadence, PeriodKey, StatementQuery,
    StatementTable, StatementType, StatementView,
};
use folio_engine::{EngineConfig, Filing};
use folio_xbrl::roles;
use rstest::{fixture, rstest};

const INSTANCE: &str = include_str!("fixtures/acme-20231231_htm.xml");
const PRESENTATION: &str = include_str!("fixtures/acme-20231231_pre.xml");
const CALCULATION: &str = include_str!("fixtures/acme-20231231_cal.xml");
const LABELS: &str = include_str!("fixtures/acme-20231231_lab.xml");

const BALANCE_SHEET_ROLE: &str = "http://acme.example.com/role/ConsolidatedBalanceSheets";
const DETAILS_ROLE: &str = "http://acme.example.com/role/ConsolidatedBalanceSheetsDetails";
const INCOME_ROLE: &str = "http://acme.example.com/role/ConsolidatedStatementsOfOperations";
const EQUITY_ROLE: &str = "http://acme.example.com/role/ConsolidatedStatementsOfStockholdersEquity";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn year_end(y: i32) -> PeriodKey {
    PeriodKey::instant(date(y, 12, 31))
}

fn fiscal_year(y: i32) -> PeriodKey {
    PeriodKey::duration(date(y, 1, 1), date(y, 12, 31))
}

fn filing_id() -> FilingId {
    FilingId::new("0000999999-24-000010", "0000999999", "10-K").with_fiscal_period(2023, "FY")
}

fn documents() -> FilingDocuments {
    FilingDocuments::new(filing_id(), INSTANCE)
        .with_presentation(PRESENTATION)
        .with_calculation(CALCULATION)
        .with_labels(LABELS)
        .with_role_definition(BALANCE_SHEET_ROLE, "0002 - Statement - Consolidated Balance Sheets")
        .with_role_definition(
            DETAILS_ROLE,
            "0030 - Disclosure - Consolidated Balance Sheets (Details)",
        )
        .with_role_definition(
            INCOME_ROLE,
            "0004 - Statement - Consolidated Statements of Operations",
        )
        .with_role_definition(
            EQUITY_ROLE,
            "0005 - Statement - Consolidated Statements of Stockholders' Equity",
        )
}

#[fixture]
fn filing() -> Filing {
    Filing::from_documents(&documents(), EngineConfig::default()).unwrap()
}

fn balance_sheet(filing: &Filing, view: StatementView) -> StatementTable {
    filing
        .resolve_statement(StatementType::BalanceSheet, view, 2, PeriodCadence::Annual)
        .unwrap()
}

#[rstest]
fn test_full_statement_beats_details_fragment(filing: Filing) {
    let resolution = filing.resolve_role(StatementType::BalanceSheet);
    assert_eq!(resolution.chosen.unwrap().role, BALANCE_SHEET_ROLE);
    assert_eq!(resolution.resolved_type, StatementType::BalanceSheet);

    let fragment = resolution
        .candidates
        .iter()
        .find(|c| c.role == DETAILS_ROLE)
        .unwrap();
    assert!(fragment.score < resolution.candidates[0].score);
}

#[rstest]
#[case(StatementType::IncomeStatement, INCOME_ROLE)]
#[case(StatementType::Equity, EQUITY_ROLE)]
fn test_each_statement_finds_its_role(
    filing: Filing,
    #[case] statement_type: StatementType,
    #[case] role: &str,
) {
    assert_eq!(filing.resolve_role(statement_type).chosen.unwrap().role, role);
}

#[rstest]
fn test_missing_statement_is_none(filing: Filing) {
    let resolution = filing.resolve_role(StatementType::CashFlow);
    assert!(!resolution.is_available());
    assert_eq!(resolution.resolved_type, StatementType::Other);
    assert!(
        filing
            .resolve_statement(
                StatementType::CashFlow,
                StatementView::Standard,
                3,
                PeriodCadence::Annual
            )
            .is_none()
    );
}

#[rstest]
fn test_balance_sheet_columns_and_values(filing: Filing) {
    let table = balance_sheet(&filing, StatementView::Standard);
    assert_eq!(table.role, BALANCE_SHEET_ROLE);
    assert_eq!(table.periods, vec![year_end(2023), year_end(2022)]);

    assert_eq!(table.value("us-gaap_Assets", &year_end(2023)), Some(500.0));
    assert_eq!(table.value("us-gaap_Assets", &year_end(2022)), Some(450.0));
    assert_eq!(
        table.value("us-gaap_LiabilitiesAndStockholdersEquity", &year_end(2023)),
        Some(500.0)
    );

    let assets = table.row("us-gaap_Assets").unwrap();
    assert_eq!(assets.label, "Total assets");
    assert!(assets.is_total);
    let current = table.row("us-gaap_AssetsCurrent").unwrap();
    assert_eq!(current.label, "Total current assets");
    assert!(current.is_total);
    assert!(!table.row("us-gaap_CashAndCashEquivalentsAtCarryingValue").unwrap().is_total);
}

#[rstest]
fn test_hypercube_scaffolding_is_not_rendered(filing: Filing) {
    let table = balance_sheet(&filing, StatementView::Detailed);
    for scaffolding in [
        "us-gaap_StatementTable",
        "us-gaap_StatementLineItems",
        "us-gaap_StatementGeographicalAxis",
        "us-gaap_SegmentGeographicalDomain",
        "srt_EuropeMember",
    ] {
        assert!(table.row(scaffolding).is_none(), "{scaffolding} rendered");
    }

    let heading = table.row("us-gaap_AssetsAbstract").unwrap();
    assert!(heading.is_abstract);
    assert_eq!(heading.depth, 1);
    assert!(!heading.has_values());
    assert_eq!(
        table.row("us-gaap_CashAndCashEquivalentsAtCarryingValue").unwrap().depth,
        2
    );
}

#[rstest]
fn test_face_dimension_stands_in_for_missing_total(filing: Filing) {
    let table = balance_sheet(&filing, StatementView::Summary);
    let ppe = table.row_by_label("Property and equipment, net").unwrap();
    assert_eq!(ppe.concept, "us-gaap_PropertyPlantAndEquipmentNet");
    assert!(!ppe.is_dimensional());
    assert_eq!(ppe.value(&year_end(2023)), Some(300.0));
    assert_eq!(ppe.value(&year_end(2022)), Some(280.0));

    let detailed = balance_sheet(&filing, StatementView::Detailed);
    assert_eq!(detailed.rows_for("us-gaap_PropertyPlantAndEquipmentNet").count(), 1);
}

#[rstest]
fn test_breakdowns_only_in_detailed_view(filing: Filing) {
    let standard = balance_sheet(&filing, StatementView::Standard);
    assert_eq!(standard.rows_for("us-gaap_Assets").count(), 1);

    let detailed = balance_sheet(&filing, StatementView::Detailed);
    let regions: Vec<_> = detailed
        .rows_for("us-gaap_Assets")
        .filter(|r| r.is_dimensional())
        .collect();
    assert_eq!(regions.len(), 2);
    assert!(regions.iter().all(|r| r.is_breakdown && r.depth == 3));
    assert_eq!(regions[0].label, "Europe - Total assets");
    assert_eq!(regions[0].value(&year_end(2023)), Some(150.0));
    assert_eq!(regions[1].label, "North america - Total assets");
    assert_eq!(regions[1].value(&year_end(2022)), Some(310.0));
}

#[rstest]
fn test_views_nest(filing: Filing) {
    let summary = balance_sheet(&filing, StatementView::Summary);
    let standard = balance_sheet(&filing, StatementView::Standard);
    let detailed = balance_sheet(&filing, StatementView::Detailed);

    assert!(summary.rows.iter().all(|r| !r.is_dimensional()));
    assert!(summary.len() <= standard.len());
    assert!(standard.len() < detailed.len());
    for row in &standard.rows {
        assert!(detailed.rows.contains(row));
    }
}

#[rstest]
fn test_resolution_is_deterministic(filing: Filing) {
    let again = Filing::from_documents(&documents(), EngineConfig::default()).unwrap();
    for statement_type in [
        StatementType::BalanceSheet,
        StatementType::IncomeStatement,
        StatementType::Equity,
    ] {
        let a = filing.resolve_statement(
            statement_type,
            StatementView::Detailed,
            3,
            PeriodCadence::Annual,
        );
        let b = again.resolve_statement(
            statement_type,
            StatementView::Detailed,
            3,
            PeriodCadence::Annual,
        );
        assert_eq!(a, b);
    }
}

#[rstest]
fn test_income_statement_drops_empty_fiscal_year(filing: Filing) {
    let keys = filing.get_period_keys(StatementType::IncomeStatement, 5);
    assert_eq!(keys, vec![fiscal_year(2023), fiscal_year(2022)]);

    let table = filing
        .resolve_statement(
            StatementType::IncomeStatement,
            StatementView::Standard,
            5,
            PeriodCadence::Annual,
        )
        .unwrap();
    assert_eq!(table.periods.len(), 2);
    assert!(table.row("us-gaap_GrossProfit").unwrap().is_total);
    assert!(!table.row("us-gaap_Revenues").unwrap().is_total);
    assert_eq!(table.row("us-gaap_Revenues").unwrap().label, "Revenues");
    assert_relative_eq!(
        table
            .value("us-gaap_EarningsPerShareBasic", &fiscal_year(2023))
            .unwrap(),
        0.70
    );
}

#[rstest]
fn test_duplicate_null_context_keeps_value(filing: Filing) {
    assert_eq!(
        filing.store().total("us-gaap_Revenues", &fiscal_year(2023)),
        Some(460.0)
    );
}

#[rstest]
fn test_quarterly_columns(filing: Filing) {
    let keys = filing.get_period_keys_with_cadence(
        StatementType::IncomeStatement,
        4,
        PeriodCadence::Quarterly,
    );
    assert_eq!(
        keys,
        vec![
            PeriodKey::duration(date(2023, 7, 1), date(2023, 9, 30)),
            PeriodKey::duration(date(2023, 4, 1), date(2023, 6, 30)),
            PeriodKey::duration(date(2023, 1, 1), date(2023, 3, 31)),
            PeriodKey::duration(date(2022, 10, 1), date(2022, 12, 31)),
        ]
    );

    let ttm = filing.rolling_ttm("us-gaap_Revenues", &keys);
    assert_relative_eq!(ttm[0].unwrap(), 435.0);
    assert_eq!(ttm[1], None);
}

#[rstest]
fn test_fourth_quarter_from_annual(filing: Filing) {
    let q4 = filing
        .derive_quarter_from_annual("us-gaap_Revenues", 2023)
        .unwrap();
    assert_relative_eq!(q4, 130.0);
    assert_eq!(filing.derive_quarter_from_annual("us-gaap_Revenues", 2022), None);
}

#[rstest]
fn test_equity_roll_forward_balances(filing: Filing) {
    let table = filing
        .resolve_statement(
            StatementType::Equity,
            StatementView::Standard,
            2,
            PeriodCadence::Annual,
        )
        .unwrap();
    assert_eq!(table.periods, vec![fiscal_year(2023), fiscal_year(2022)]);

    let balances: Vec<_> = table
        .rows_for("us-gaap_StockholdersEquity")
        .filter(|r| !r.is_dimensional())
        .collect();
    assert_eq!(balances.len(), 2);

    let (opening, closing) = (balances[0], balances[1]);
    assert_eq!(opening.preferred_label.as_deref(), Some(roles::PERIOD_START));
    assert_eq!(opening.label, "Balance, beginning of period");
    assert_eq!(opening.value(&fiscal_year(2023)), Some(250.0));
    assert_eq!(opening.value(&fiscal_year(2022)), Some(220.0));
    assert_eq!(closing.label, "Balance, end of period");
    assert_eq!(closing.value(&fiscal_year(2023)), Some(300.0));
    assert_eq!(closing.value(&fiscal_year(2022)), Some(250.0));

    // Equity components are face-level on the equity statement.
    let retained = table
        .row_by_label("Retained Earnings - Balance, end of period")
        .unwrap();
    assert!(!retained.is_breakdown);
    assert_eq!(retained.value(&fiscal_year(2023)), Some(180.0));
}

#[rstest]
fn test_query_round_trip(filing: Filing) {
    let query = StatementQuery::new(filing_id(), StatementType::BalanceSheet, 2)
        .with_view(StatementView::Detailed);
    assert_eq!(
        filing.resolve(&query),
        Some(balance_sheet(&filing, StatementView::Detailed))
    );

    let other = StatementQuery::new(
        FilingId::new("0000999999-23-000001", "0000999999", "10-K"),
        StatementType::BalanceSheet,
        2,
    );
    assert_eq!(filing.resolve(&other), None);
}

#[rstest]
fn test_render_fragment_role(filing: Filing) {
    let table = filing
        .render_role(DETAILS_ROLE, StatementView::Standard, 2, PeriodCadence::Annual)
        .unwrap();
    assert_eq!(table.statement_type, StatementType::Other);
    assert_eq!(table.periods, vec![year_end(2023), year_end(2022)]);
    assert_eq!(
        table.value("us-gaap_AccountsReceivableNetCurrent", &year_end(2023)),
        Some(80.0)
    );
    assert!(
        filing
            .render_role("http://acme.example.com/role/Nope", StatementView::Standard, 2, PeriodCadence::Annual)
            .is_none()
    );
}

#[rstest]
fn test_role_classification(filing: Filing) {
    let roles = filing.roles();
    assert_eq!(roles.len(), 4);
    let kind = |role: &str| {
        roles
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.statement_type)
            .unwrap()
    };
    assert_eq!(kind(BALANCE_SHEET_ROLE), StatementType::BalanceSheet);
    assert_eq!(kind(INCOME_ROLE), StatementType::IncomeStatement);
    assert_eq!(kind(EQUITY_ROLE), StatementType::Equity);
    assert_eq!(kind(DETAILS_ROLE), StatementType::Other);
}

#[test]
fn test_dataframe_shape() {
    let filing = filing();
    let df = balance_sheet(&filing, StatementView::Standard)
        .to_dataframe()
        .unwrap();
    assert_eq!(df.width(), 7 + 2);
    assert!(df.column(year_end(2023).as_str()).is_ok());
}

#[test]
fn test_malformed_linkbase_degrades() {
    let documents = documents().with_presentation("<link:linkbase><link:presentationLink></link:linkbase>");
    let filing = Filing::from_documents(&documents, EngineConfig::default()).unwrap();
    assert!(filing.presentation_trees().is_empty());
    assert!(
        filing
            .resolve_statement(
                StatementType::BalanceSheet,
                StatementView::Standard,
                2,
                PeriodCadence::Annual
            )
            .is_none()
    );
}

#[test]
fn test_malformed_instance_is_fatal() {
    let documents = FilingDocuments::new(filing_id(), "<xbrli:xbrl><a></b></xbrli:xbrl>");
    let err = Filing::from_documents(&documents, EngineConfig::default()).unwrap_err();
    assert!(matches!(err, FolioError::Xml { .. }));
}
