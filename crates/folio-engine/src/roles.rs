//! Statement role resolution.
//!
//! Filers put each statement in its own presentation role, but name those roles
//! freely and surround them with parentheticals, detail tables and disclosure
//! fragments that reuse the same vocabulary. Every role is scored against a synonym
//! table for the requested statement and the best full statement wins.

use folio_core::types::local_name;
use folio_core::{StatementType, TaxonomyStandard};
use folio_xbrl::LabelSet;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::config::ScoringWeights;
use crate::linkbase::LinkbaseTree;

/// Names and concepts identifying one statement under one standard.
#[derive(Debug)]
pub struct StatementSynonyms {
    /// Normalized full statement names.
    pub exact: &'static [&'static str],
    /// Normalized keywords that suggest the statement.
    pub generic: &'static [&'static str],
    /// Element ids that define the statement.
    pub concepts: &'static [&'static str],
    /// Line count of a typical full statement.
    pub expected_min: usize,
}

const US_GAAP_BALANCE_SHEET: StatementSynonyms = StatementSynonyms {
    exact: &[
        "balancesheet",
        "balancesheets",
        "statementoffinancialposition",
        "statementsoffinancialposition",
        "statementoffinancialcondition",
        "statementsoffinancialcondition",
        "statementofcondition",
        "statementsofcondition",
    ],
    generic: &["balancesheet", "financialposition", "financialcondition"],
    concepts: &[
        "us-gaap_Assets",
        "us-gaap_AssetsCurrent",
        "us-gaap_Liabilities",
        "us-gaap_LiabilitiesCurrent",
        "us-gaap_LiabilitiesAndStockholdersEquity",
        "us-gaap_StockholdersEquity",
        "us-gaap_CashAndCashEquivalentsAtCarryingValue",
    ],
    expected_min: 20,
};

const US_GAAP_INCOME_STATEMENT: StatementSynonyms = StatementSynonyms {
    exact: &[
        "incomestatement",
        "incomestatements",
        "statementofincome",
        "statementsofincome",
        "statementofoperations",
        "statementsofoperations",
        "statementofearnings",
        "statementsofearnings",
        "statementofincomeloss",
        "statementsofincomeloss",
        "statementsofoperationsandcomprehensiveincome",
        "statementsofoperationsandcomprehensiveincomeloss",
        "statementsofincomeandcomprehensiveincome",
    ],
    generic: &["income", "operations", "earnings"],
    concepts: &[
        "us-gaap_Revenues",
        "us-gaap_RevenueFromContractWithCustomerExcludingAssessedTax",
        "us-gaap_CostOfRevenue",
        "us-gaap_GrossProfit",
        "us-gaap_OperatingIncomeLoss",
        "us-gaap_IncomeTaxExpenseBenefit",
        "us-gaap_NetIncomeLoss",
        "us-gaap_EarningsPerShareBasic",
        "us-gaap_EarningsPerShareDiluted",
    ],
    expected_min: 10,
};

const US_GAAP_CASH_FLOW: StatementSynonyms = StatementSynonyms {
    exact: &[
        "statementofcashflows",
        "statementsofcashflows",
        "cashflowstatement",
        "cashflowstatements",
        "cashflows",
    ],
    generic: &["cashflow"],
    concepts: &[
        "us-gaap_NetCashProvidedByUsedInOperatingActivities",
        "us-gaap_NetCashProvidedByUsedInInvestingActivities",
        "us-gaap_NetCashProvidedByUsedInFinancingActivities",
        "us-gaap_CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalentsPeriodIncreaseDecreaseIncludingExchangeRateEffect",
        "us-gaap_CashAndCashEquivalentsPeriodIncreaseDecrease",
        "us-gaap_DepreciationDepletionAndAmortization",
    ],
    expected_min: 15,
};

const US_GAAP_EQUITY: StatementSynonyms = StatementSynonyms {
    exact: &[
        "statementofstockholdersequity",
        "statementsofstockholdersequity",
        "statementofshareholdersequity",
        "statementsofshareholdersequity",
        "statementofchangesinequity",
        "statementsofchangesinequity",
        "statementofchangesinstockholdersequity",
        "statementsofchangesinstockholdersequity",
        "statementofchangesinshareholdersequity",
        "statementsofchangesinshareholdersequity",
        "statementofequity",
        "statementsofequity",
    ],
    generic: &[
        "stockholdersequity",
        "shareholdersequity",
        "changesinequity",
        "statementofequity",
        "statementsofequity",
    ],
    concepts: &[
        "us-gaap_StockholdersEquity",
        "us-gaap_StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        "us-gaap_StockIssuedDuringPeriodValueNewIssues",
        "us-gaap_StockRepurchasedDuringPeriodValue",
        "us-gaap_DividendsCommonStock",
        "us-gaap_NetIncomeLoss",
    ],
    expected_min: 8,
};

const IFRS_BALANCE_SHEET: StatementSynonyms = StatementSynonyms {
    exact: &[
        "statementoffinancialposition",
        "statementsoffinancialposition",
        "balancesheet",
        "balancesheets",
    ],
    generic: &["financialposition", "balancesheet"],
    concepts: &[
        "ifrs-full_Assets",
        "ifrs-full_CurrentAssets",
        "ifrs-full_Liabilities",
        "ifrs-full_CurrentLiabilities",
        "ifrs-full_Equity",
        "ifrs-full_EquityAndLiabilities",
    ],
    expected_min: 20,
};

const IFRS_INCOME_STATEMENT: StatementSynonyms = StatementSynonyms {
    exact: &[
        "incomestatement",
        "statementofprofitorloss",
        "statementsofprofitorloss",
        "statementofprofitorlossandothercomprehensiveincome",
        "statementofcomprehensiveincome",
        "statementsofcomprehensiveincome",
    ],
    generic: &["profitorloss", "income"],
    concepts: &[
        "ifrs-full_Revenue",
        "ifrs-full_GrossProfit",
        "ifrs-full_ProfitLossFromOperatingActivities",
        "ifrs-full_IncomeTaxExpenseContinuingOperations",
        "ifrs-full_ProfitLoss",
        "ifrs-full_BasicEarningsLossPerShare",
    ],
    expected_min: 10,
};

const IFRS_CASH_FLOW: StatementSynonyms = StatementSynonyms {
    exact: &["statementofcashflows", "statementsofcashflows", "cashflowstatement"],
    generic: &["cashflow"],
    concepts: &[
        "ifrs-full_CashFlowsFromUsedInOperatingActivities",
        "ifrs-full_CashFlowsFromUsedInInvestingActivities",
        "ifrs-full_CashFlowsFromUsedInFinancingActivities",
        "ifrs-full_IncreaseDecreaseInCashAndCashEquivalents",
    ],
    expected_min: 15,
};

const IFRS_EQUITY: StatementSynonyms = StatementSynonyms {
    exact: &["statementofchangesinequity", "statementsofchangesinequity"],
    generic: &["changesinequity"],
    concepts: &[
        "ifrs-full_Equity",
        "ifrs-full_ProfitLoss",
        "ifrs-full_ComprehensiveIncome",
        "ifrs-full_DividendsPaid",
        "ifrs-full_IssueOfEquity",
    ],
    expected_min: 8,
};

/// Synonyms for a statement under a standard; `None` for [`StatementType::Other`].
#[must_use]
pub const fn synonyms(
    standard: TaxonomyStandard,
    statement_type: StatementType,
) -> Option<&'static StatementSynonyms> {
    match (standard, statement_type) {
        (TaxonomyStandard::UsGaap, StatementType::BalanceSheet) => Some(&US_GAAP_BALANCE_SHEET),
        (TaxonomyStandard::UsGaap, StatementType::IncomeStatement) => {
            Some(&US_GAAP_INCOME_STATEMENT)
        }
        (TaxonomyStandard::UsGaap, StatementType::CashFlow) => Some(&US_GAAP_CASH_FLOW),
        (TaxonomyStandard::UsGaap, StatementType::Equity) => Some(&US_GAAP_EQUITY),
        (TaxonomyStandard::Ifrs, StatementType::BalanceSheet) => Some(&IFRS_BALANCE_SHEET),
        (TaxonomyStandard::Ifrs, StatementType::IncomeStatement) => Some(&IFRS_INCOME_STATEMENT),
        (TaxonomyStandard::Ifrs, StatementType::CashFlow) => Some(&IFRS_CASH_FLOW),
        (TaxonomyStandard::Ifrs, StatementType::Equity) => Some(&IFRS_EQUITY),
        (_, StatementType::Other) => None,
    }
}

/// Statement-defining concepts across every standard.
#[must_use]
pub fn statement_concepts(statement_type: StatementType) -> Vec<&'static str> {
    let mut concepts: Vec<&'static str> = TaxonomyStandard::ALL
        .iter()
        .filter_map(|s| synonyms(*s, statement_type))
        .flat_map(|s| s.concepts.iter().copied())
        .collect();
    concepts.sort_unstable();
    concepts.dedup();
    concepts
}

const FRAGMENT_TOKENS: &[&str] = &[
    "detail",
    "details",
    "disclosure",
    "disclosures",
    "schedule",
    "schedules",
    "table",
    "tables",
    "policy",
    "policies",
    "parenthetical",
    "narrative",
    "axis",
    "member",
];

const NAME_PREFIXES: &[&str] = &["condensed", "consolidated", "combined", "unaudited"];

/// Splits a name into lowercase words at non-alphanumerics and camel-case humps.
pub(crate) fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, c) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let hump = c.is_ascii_uppercase()
                && prev.is_some_and(|p| {
                    p.is_ascii_lowercase()
                        || p.is_ascii_digit()
                        || (p.is_ascii_uppercase() && next.is_some_and(char::is_ascii_lowercase))
                });
            if hump && !current.is_empty() {
                words.push(current.to_ascii_lowercase());
                current.clear();
            }
            current.push(*c);
        }
        if !current.is_empty() {
            words.push(current.to_ascii_lowercase());
        }
    }
    words
}

/// Joins a name's words after dropping leading numbering and consolidation prefixes.
fn normalize_name(name: &str) -> String {
    let words = words(name);
    let mut rest = words.as_slice();
    while let Some((first, tail)) = rest.split_first() {
        if NAME_PREFIXES.contains(&first.as_str()) || first.chars().all(|c| c.is_ascii_digit()) {
            rest = tail;
        } else {
            break;
        }
    }
    let mut joined = rest.concat();
    if let Some(stripped) = joined.strip_suffix("abstract") {
        joined = stripped.to_string();
    }
    joined
}

fn role_tail(role: &str) -> &str {
    role.rsplit(['/', '#']).next().unwrap_or(role)
}

fn definition_tail(definition: &str) -> &str {
    definition
        .rsplit(" - ")
        .next()
        .unwrap_or(definition)
        .trim()
}

fn has_fragment_token(name: &str) -> bool {
    words(name)
        .iter()
        .any(|w| FRAGMENT_TOKENS.contains(&w.as_str()))
}

/// A presentation role scored for a statement type.
#[derive(Clone, Debug, PartialEq)]
pub struct StatementRole {
    /// Role URI.
    pub role: String,
    /// Statement type the role was scored for.
    pub statement_type: StatementType,
    /// Final score.
    pub score: f64,
    /// Line items able to carry values.
    pub non_abstract: usize,
    /// Human definition of the role, when known.
    pub definition: Option<String>,
}

/// Outcome of resolving a statement type to a role.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleResolution {
    /// Every role that matched at all, best first.
    pub candidates: Vec<StatementRole>,
    /// The winning role, if any cleared the minimum score.
    pub chosen: Option<StatementRole>,
    /// Requested type when a role was chosen, [`StatementType::Other`] otherwise.
    pub resolved_type: StatementType,
}

impl RoleResolution {
    /// Returns true if a role was chosen.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.chosen.is_some()
    }
}

/// Scores presentation roles against the synonym table.
#[derive(Debug)]
pub struct RoleResolver<'a> {
    trees: &'a BTreeMap<String, LinkbaseTree>,
    definitions: &'a BTreeMap<String, String>,
    labels: &'a LabelSet,
    weights: &'a ScoringWeights,
}

impl<'a> RoleResolver<'a> {
    /// Creates a resolver over a filing's presentation trees.
    #[must_use]
    pub const fn new(
        trees: &'a BTreeMap<String, LinkbaseTree>,
        definitions: &'a BTreeMap<String, String>,
        labels: &'a LabelSet,
        weights: &'a ScoringWeights,
    ) -> Self {
        Self {
            trees,
            definitions,
            labels,
            weights,
        }
    }

    /// Picks the role that best represents a statement.
    #[instrument(skip(self), fields(roles = self.trees.len()))]
    pub fn resolve(&self, statement_type: StatementType) -> RoleResolution {
        let mut candidates: Vec<StatementRole> = self
            .trees
            .values()
            .filter_map(|tree| self.score(tree, statement_type))
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.non_abstract.cmp(&a.non_abstract))
                .then(a.role.cmp(&b.role))
        });

        let chosen = candidates
            .first()
            .filter(|c| c.score >= self.weights.min_score)
            .cloned();
        match &chosen {
            Some(role) => debug!(role = %role.role, score = role.score, "Resolved statement role"),
            None => debug!(
                candidates = candidates.len(),
                "No role cleared the minimum score"
            ),
        }

        RoleResolution {
            resolved_type: if chosen.is_some() {
                statement_type
            } else {
                StatementType::Other
            },
            candidates,
            chosen,
        }
    }

    /// Best-guess statement type of one role.
    ///
    /// Types are tried from the most to the least distinctive vocabulary, so a
    /// "cash flow" or "equity" role is not mistaken for an income statement.
    #[must_use]
    pub fn infer_statement_type(&self, role: &str) -> StatementType {
        let Some(tree) = self.trees.get(role) else {
            return StatementType::Other;
        };
        if self.is_fragment(tree) {
            return StatementType::Other;
        }
        [
            StatementType::CashFlow,
            StatementType::Equity,
            StatementType::IncomeStatement,
            StatementType::BalanceSheet,
        ]
        .into_iter()
        .find(|st| self.name_score(tree, *st) > 0.0)
        .unwrap_or(StatementType::Other)
    }

    /// Every role with its inferred type, sorted by role URI.
    #[must_use]
    pub fn classify_all(&self) -> Vec<StatementRole> {
        self.trees
            .values()
            .map(|tree| {
                let statement_type = self.infer_statement_type(&tree.role);
                let score = self
                    .score(tree, statement_type)
                    .map_or(0.0, |scored| scored.score);
                StatementRole {
                    role: tree.role.clone(),
                    statement_type,
                    score,
                    non_abstract: tree.non_abstract_count(),
                    definition: self.definitions.get(&tree.role).cloned(),
                }
            })
            .collect()
    }

    fn names(&self, tree: &LinkbaseTree) -> Vec<String> {
        let mut names = vec![normalize_name(role_tail(&tree.role))];
        if let Some(definition) = self.definitions.get(&tree.role) {
            names.push(normalize_name(definition_tail(definition)));
        }
        for root in &tree.roots {
            names.push(normalize_name(local_name(root)));
            if let Some(label) = self.labels.lookup(root, None) {
                names.push(normalize_name(label));
            }
        }
        names.retain(|n| !n.is_empty());
        names
    }

    fn is_fragment(&self, tree: &LinkbaseTree) -> bool {
        has_fragment_token(role_tail(&tree.role))
            || self
                .definitions
                .get(&tree.role)
                .is_some_and(|d| has_fragment_token(d))
    }

    fn name_score(&self, tree: &LinkbaseTree, statement_type: StatementType) -> f64 {
        let names = self.names(tree);
        TaxonomyStandard::ALL
            .iter()
            .filter_map(|standard| synonyms(*standard, statement_type))
            .flat_map(|syn| {
                names.iter().map(move |name| {
                    if syn.exact.contains(&name.as_str()) {
                        self.weights.exact_match
                    } else if syn.generic.iter().any(|g| name.contains(g)) {
                        self.weights.generic_match
                    } else {
                        0.0
                    }
                })
            })
            .fold(0.0, f64::max)
    }

    fn score(&self, tree: &LinkbaseTree, statement_type: StatementType) -> Option<StatementRole> {
        let name = self.name_score(tree, statement_type);

        let (concepts, expected_min) = TaxonomyStandard::ALL
            .iter()
            .filter_map(|standard| synonyms(*standard, statement_type))
            .map(|syn| {
                let present = syn.concepts.iter().filter(|c| tree.contains(c)).count();
                (present, syn.expected_min)
            })
            .max()?;

        if name <= 0.0 {
            return None;
        }

        let non_abstract = tree.non_abstract_count();
        let size = self.weights.size_weight
            * (non_abstract as f64 / expected_min.max(1) as f64).min(1.0);
        let concept = (self.weights.concept_match * concepts as f64).min(self.weights.concept_cap);
        let fragment = if self.is_fragment(tree) {
            self.weights.fragment_penalty
        } else {
            0.0
        };

        let score = name + concept + size - fragment;
        debug!(
            role = %tree.role,
            %statement_type,
            name,
            concept,
            size,
            fragment,
            score,
            "Scored role"
        );

        Some(StatementRole {
            role: tree.role.clone(),
            statement_type,
            score,
            non_abstract,
            definition: self.definitions.get(&tree.role).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkbase::{TreeKind, build_trees};
    use folio_core::ElementCatalog;
    use folio_xbrl::Relationship;
    use rstest::rstest;

    fn tree_rels(role: &str, root: &str, children: &[&str], seq: &mut usize) -> Vec<Relationship> {
        children
            .iter()
            .map(|child| {
                *seq += 1;
                Relationship {
                    role: role.to_string(),
                    from: root.to_string(),
                    to: (*child).to_string(),
                    order: Some(seq.to_string()),
                    weight: None,
                    preferred_label: None,
                    sequence: *seq,
                }
            })
            .collect()
    }

    fn trees() -> BTreeMap<String, LinkbaseTree> {
        let mut seq = 0;
        let full: Vec<String> = (0..20).map(|i| format!("abc_Line{i}")).collect();
        let mut full_children: Vec<&str> = full.iter().map(String::as_str).collect();
        full_children.extend(["us-gaap_Assets", "us-gaap_Liabilities", "us-gaap_StockholdersEquity"]);

        let mut rels = tree_rels(
            "http://abc.com/role/ConsolidatedBalanceSheets",
            "us-gaap_StatementOfFinancialPositionAbstract",
            &full_children,
            &mut seq,
        );
        rels.extend(tree_rels(
            "http://abc.com/role/ConsolidatedBalanceSheetsDetails",
            "abc_DetailsAbstract",
            &["us-gaap_Assets", "us-gaap_Liabilities", "us-gaap_AssetsCurrent"],
            &mut seq,
        ));
        rels.extend(tree_rels(
            "http://abc.com/role/ConsolidatedBalanceSheetsParenthetical",
            "abc_ParentheticalAbstract",
            &["us-gaap_PreferredStockParOrStatedValuePerShare"],
            &mut seq,
        ));
        rels.extend(tree_rels(
            "http://abc.com/role/ConsolidatedStatementsOfCashFlows",
            "abc_CashAbstract",
            &[
                "us-gaap_NetIncomeLoss",
                "us-gaap_NetCashProvidedByUsedInOperatingActivities",
            ],
            &mut seq,
        ));
        build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new())
    }

    #[rstest]
    #[case("ConsolidatedBalanceSheets", "balancesheets")]
    #[case("CONDENSED CONSOLIDATED BALANCE SHEETS", "balancesheets")]
    #[case("0002 - ConsolidatedStatementsOfOperations", "statementsofoperations")]
    #[case("StatementOfFinancialPositionAbstract", "statementoffinancialposition")]
    fn test_normalize_name(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(raw), expected);
    }

    #[rstest]
    #[case("ConsolidatedBalanceSheetsDetails", true)]
    #[case("BALANCE SHEETS (Parenthetical)", true)]
    #[case("SummaryOfSignificantAccountingPolicies", true)]
    #[case("ConsolidatedBalanceSheets", false)]
    #[case("ConsolidatedStatementsOfIncomeAttributableToParent", false)]
    #[case("PPEDetails", true)]
    fn test_fragment_tokens(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(has_fragment_token(raw), expected);
    }

    #[test]
    fn test_full_statement_beats_fragments() {
        let trees = trees();
        let definitions = BTreeMap::new();
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);

        let resolution = resolver.resolve(StatementType::BalanceSheet);
        let chosen = resolution.chosen.unwrap();
        assert_eq!(chosen.role, "http://abc.com/role/ConsolidatedBalanceSheets");
        assert_eq!(resolution.resolved_type, StatementType::BalanceSheet);
        assert!(resolution.candidates.len() >= 2);
        assert!(resolution.candidates[1].score < chosen.score);
    }

    #[test]
    fn test_definition_fragment_penalized() {
        let trees = trees();
        let mut definitions = BTreeMap::new();
        definitions.insert(
            "http://abc.com/role/ConsolidatedBalanceSheets".to_string(),
            "0002 - Disclosure - Consolidated Balance Sheets".to_string(),
        );
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);
        assert_eq!(
            resolver.infer_statement_type("http://abc.com/role/ConsolidatedBalanceSheets"),
            StatementType::Other
        );
    }

    #[test]
    fn test_missing_statement_is_not_available() {
        let trees = trees();
        let definitions = BTreeMap::new();
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);

        let resolution = resolver.resolve(StatementType::Equity);
        assert!(!resolution.is_available());
        assert_eq!(resolution.resolved_type, StatementType::Other);
        assert!(!resolver.resolve(StatementType::Other).is_available());
    }

    #[test]
    fn test_infer_types() {
        let trees = trees();
        let definitions = BTreeMap::new();
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);

        assert_eq!(
            resolver.infer_statement_type("http://abc.com/role/ConsolidatedStatementsOfCashFlows"),
            StatementType::CashFlow
        );
        assert_eq!(
            resolver.infer_statement_type("http://abc.com/role/ConsolidatedBalanceSheetsDetails"),
            StatementType::Other
        );
        let all = resolver.classify_all();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].role < w[1].role));
    }

    #[test]
    fn test_statement_concepts_cover_both_standards() {
        let concepts = statement_concepts(StatementType::BalanceSheet);
        assert!(concepts.contains(&"us-gaap_Assets"));
        assert!(concepts.contains(&"ifrs-full_Assets"));
        assert!(statement_concepts(StatementType::Other).is_empty());
    }

    #[test]
    fn test_alternate_standard_filer_resolves() {
        let mut seq = 0;
        let mut rels = tree_rels(
            "http://ifrs.example.com/role/StatementOfProfitOrLoss",
            "ifrs-full_IncomeStatementAbstract",
            &[
                "ifrs-full_Revenue",
                "ifrs-full_CostOfSales",
                "ifrs-full_GrossProfit",
                "ifrs-full_ProfitLoss",
            ],
            &mut seq,
        );
        rels.extend(tree_rels(
            "http://ifrs.example.com/role/StatementOfFinancialPosition",
            "ifrs-full_StatementOfFinancialPositionAbstract",
            &["ifrs-full_Assets", "ifrs-full_Liabilities", "ifrs-full_Equity"],
            &mut seq,
        ));
        let trees = build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new());
        let definitions = BTreeMap::new();
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);

        let income = resolver.resolve(StatementType::IncomeStatement);
        assert_eq!(
            income.chosen.unwrap().role,
            "http://ifrs.example.com/role/StatementOfProfitOrLoss"
        );
        assert_eq!(income.resolved_type, StatementType::IncomeStatement);

        let position = resolver.resolve(StatementType::BalanceSheet);
        assert_eq!(
            position.chosen.unwrap().role,
            "http://ifrs.example.com/role/StatementOfFinancialPosition"
        );
    }

    #[test]
    fn test_equal_scores_break_on_role_id() {
        let mut seq = 0;
        let children = ["us-gaap_Assets", "us-gaap_Liabilities", "us-gaap_StockholdersEquity"];
        let mut rels = tree_rels(
            "http://abc.com/role/BalanceSheetB",
            "us-gaap_StatementOfFinancialPositionAbstract",
            &children,
            &mut seq,
        );
        rels.extend(tree_rels(
            "http://abc.com/role/BalanceSheetA",
            "us-gaap_StatementOfFinancialPositionAbstract",
            &children,
            &mut seq,
        ));
        let trees = build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new());
        let definitions = BTreeMap::new();
        let labels = LabelSet::new();
        let weights = ScoringWeights::default();
        let resolver = RoleResolver::new(&trees, &definitions, &labels, &weights);

        let resolution = resolver.resolve(StatementType::BalanceSheet);
        let [first, second] = resolution.candidates.as_slice() else {
            panic!("expected two candidates");
        };
        assert_eq!(first.score, second.score);
        assert_eq!(first.non_abstract, second.non_abstract);
        assert_eq!(resolution.chosen.unwrap().role, "http://abc.com/role/BalanceSheetA");
    }
}
