//! A loaded filing and the statement operations on it.

use folio_core::{
    ElementCatalog, Fact, FilingDocuments, FilingId, PeriodCadence, PeriodKey, Result,
    StatementQuery, StatementTable, StatementType, StatementView,
};
use folio_xbrl::{LabelSet, Relationship, parse_instance, parse_labels, parse_linkbase};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};

use crate::assembler::StatementAssembler;
use crate::config::EngineConfig;
use crate::derived::DerivedMetrics;
use crate::dimensions::DimensionClassifier;
use crate::fact_store::FactStore;
use crate::linkbase::{LinkbaseTree, TreeKind, build_trees};
use crate::periods::PeriodSelector;
use crate::roles::{RoleResolution, RoleResolver, StatementRole, statement_concepts};

/// One filing's facts, trees and labels, ready for statement resolution.
///
/// Built once and immutable afterwards; every operation is a pure function of its
/// arguments, so a `Filing` can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct Filing {
    id: FilingId,
    store: FactStore,
    presentation: BTreeMap<String, LinkbaseTree>,
    calculation: BTreeMap<String, LinkbaseTree>,
    labels: LabelSet,
    elements: ElementCatalog,
    role_definitions: BTreeMap<String, String>,
    config: EngineConfig,
    classifier: DimensionClassifier,
}

fn parse_optional_linkbase(kind: &str, xml: Option<&str>) -> Vec<Relationship> {
    match xml.map(parse_linkbase) {
        Some(Ok(rels)) => rels,
        Some(Err(e)) => {
            warn!(linkbase = kind, error = %e, "Linkbase unusable, continuing without it");
            Vec::new()
        }
        None => Vec::new(),
    }
}

impl Filing {
    /// Loads a filing from its raw documents.
    ///
    /// A malformed instance document is fatal. A malformed linkbase is logged and
    /// treated as absent, which at worst makes statements unavailable.
    ///
    /// # Errors
    /// Returns [`FolioError::Xml`](folio_core::FolioError::Xml) if the instance
    /// document cannot be parsed.
    #[instrument(skip(documents, config), fields(filing = %documents.id))]
    pub fn from_documents(documents: &FilingDocuments, config: EngineConfig) -> Result<Self> {
        let instance = parse_instance(&documents.instance)?;
        let calculation = parse_optional_linkbase("calculation", documents.calculation.as_deref());
        let presentation =
            parse_optional_linkbase("presentation", documents.presentation.as_deref());
        let labels = match documents.labels.as_deref().map(parse_labels) {
            Some(Ok(labels)) => labels,
            Some(Err(e)) => {
                warn!(error = %e, "Label linkbase unusable, falling back to element names");
                LabelSet::new()
            }
            None => LabelSet::new(),
        };

        Ok(Self::from_parts(
            documents.id.clone(),
            instance.facts,
            &calculation,
            &presentation,
            labels,
            documents.elements.clone(),
            documents.role_definitions.clone(),
            config,
        ))
    }

    /// Builds a filing from already parsed parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        id: FilingId,
        facts: Vec<Fact>,
        calculation: &[Relationship],
        presentation: &[Relationship],
        labels: LabelSet,
        elements: ElementCatalog,
        role_definitions: BTreeMap<String, String>,
        config: EngineConfig,
    ) -> Self {
        let store = FactStore::from_facts(facts);
        let calculation = build_trees(calculation, TreeKind::Calculation, &elements);
        let presentation = build_trees(presentation, TreeKind::Presentation, &elements);
        let classifier = DimensionClassifier::new(&config.dimensions);
        debug!(
            filing = %id,
            facts = store.len(),
            presentation_roles = presentation.len(),
            calculation_roles = calculation.len(),
            "Loaded filing"
        );
        Self {
            id,
            store,
            presentation,
            calculation,
            labels,
            elements,
            role_definitions,
            config,
            classifier,
        }
    }

    /// Filing identity.
    #[must_use]
    pub const fn id(&self) -> &FilingId {
        &self.id
    }

    /// Merged facts.
    #[must_use]
    pub const fn store(&self) -> &FactStore {
        &self.store
    }

    /// Presentation trees by role.
    #[must_use]
    pub const fn presentation_trees(&self) -> &BTreeMap<String, LinkbaseTree> {
        &self.presentation
    }

    /// Calculation trees by role.
    #[must_use]
    pub const fn calculation_trees(&self) -> &BTreeMap<String, LinkbaseTree> {
        &self.calculation
    }

    /// Labels.
    #[must_use]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Configuration the filing was loaded with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn resolver(&self) -> RoleResolver<'_> {
        RoleResolver::new(
            &self.presentation,
            &self.role_definitions,
            &self.labels,
            &self.config.scoring,
        )
    }

    /// Every presentation role with its inferred statement type.
    #[must_use]
    pub fn roles(&self) -> Vec<StatementRole> {
        self.resolver().classify_all()
    }

    /// Finds the role holding a statement.
    #[must_use]
    pub fn resolve_role(&self, statement_type: StatementType) -> RoleResolution {
        self.resolver().resolve(statement_type)
    }

    fn required_concepts(
        &self,
        statement_type: StatementType,
        tree: Option<&LinkbaseTree>,
    ) -> BTreeSet<String> {
        let mut required: BTreeSet<String> = statement_concepts(statement_type)
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(tree) = tree {
            required.extend(tree.value_concepts().map(str::to_string));
        }
        required
    }

    fn select(
        &self,
        statement_type: StatementType,
        tree: Option<&LinkbaseTree>,
        count: usize,
        cadence: PeriodCadence,
    ) -> Vec<PeriodKey> {
        let required = self.required_concepts(statement_type, tree);
        PeriodSelector::new(&self.store, &self.config.periods).select_periods(
            statement_type,
            count,
            cadence,
            &required,
        )
    }

    /// Annual period columns for a statement, most recent first.
    #[must_use]
    pub fn get_period_keys(&self, statement_type: StatementType, count: usize) -> Vec<PeriodKey> {
        self.get_period_keys_with_cadence(statement_type, count, PeriodCadence::Annual)
    }

    /// Period columns for a statement at a cadence, most recent first.
    #[must_use]
    pub fn get_period_keys_with_cadence(
        &self,
        statement_type: StatementType,
        count: usize,
        cadence: PeriodCadence,
    ) -> Vec<PeriodKey> {
        let resolution = self.resolve_role(statement_type);
        let tree = resolution
            .chosen
            .as_ref()
            .and_then(|c| self.presentation.get(&c.role));
        self.select(statement_type, tree, count, cadence)
    }

    /// Resolves a statement.
    ///
    /// Returns `None` when no role represents the statement.
    #[instrument(skip(self), fields(filing = %self.id))]
    pub fn resolve_statement(
        &self,
        statement_type: StatementType,
        view: StatementView,
        max_periods: usize,
        cadence: PeriodCadence,
    ) -> Option<StatementTable> {
        let resolution = self.resolve_role(statement_type);
        let Some(chosen) = resolution.chosen else {
            debug!(%statement_type, "Statement not available");
            return None;
        };
        let tree = self.presentation.get(&chosen.role)?;
        let periods = self.select(statement_type, Some(tree), max_periods, cadence);
        Some(self.assembler().assemble(&self.id, tree, statement_type, &periods, view))
    }

    /// Resolves the statement described by a query.
    ///
    /// Queries for another filing are answered with `None`.
    #[must_use]
    pub fn resolve(&self, query: &StatementQuery) -> Option<StatementTable> {
        if query.filing != self.id {
            warn!(expected = %self.id, got = %query.filing, "Query for a different filing");
            return None;
        }
        self.resolve_statement(
            query.statement_type,
            query.view,
            query.max_periods,
            query.cadence,
        )
    }

    /// Renders a specific role as a statement.
    ///
    /// The statement type is inferred from the role. Roles of unknown type take
    /// instant columns when most of their facts are instants, durations otherwise.
    #[must_use]
    pub fn render_role(
        &self,
        role: &str,
        view: StatementView,
        max_periods: usize,
        cadence: PeriodCadence,
    ) -> Option<StatementTable> {
        let Some(tree) = self.presentation.get(role) else {
            debug!(role, "Unknown role");
            return None;
        };
        let inferred = self.resolver().infer_statement_type(role);
        let period_type = if inferred == StatementType::Other {
            self.dominant_statement_type(tree)
        } else {
            inferred
        };
        let periods = self.select(period_type, Some(tree), max_periods, cadence);
        let mut table = self
            .assembler()
            .assemble(&self.id, tree, period_type, &periods, view);
        table.statement_type = inferred;
        Some(table)
    }

    fn dominant_statement_type(&self, tree: &LinkbaseTree) -> StatementType {
        let (instants, durations) = tree
            .value_concepts()
            .flat_map(|c| self.store.facts_for(c))
            .fold((0usize, 0usize), |(i, d), f| {
                if f.period.is_instant() {
                    (i + 1, d)
                } else {
                    (i, d + 1)
                }
            });
        if instants > durations {
            StatementType::BalanceSheet
        } else {
            StatementType::Other
        }
    }

    fn assembler(&self) -> StatementAssembler<'_> {
        StatementAssembler::new(
            &self.store,
            &self.calculation,
            &self.labels,
            &self.elements,
            &self.classifier,
            self.config.periods.total_tolerance,
        )
    }

    fn derived(&self) -> DerivedMetrics<'_> {
        DerivedMetrics::new(&self.store, &self.config.periods)
    }

    /// Trailing-twelve-month sums for quarterly period columns.
    #[must_use]
    pub fn rolling_ttm(&self, concept: &str, periods: &[PeriodKey]) -> Vec<Option<f64>> {
        self.derived().rolling_ttm(concept, periods)
    }

    /// Fourth-quarter value derived from the annual figure and three quarters.
    #[must_use]
    pub fn derive_quarter_from_annual(&self, concept: &str, fiscal_year: i32) -> Option<f64> {
        self.derived().derive_quarter_from_annual(concept, fiscal_year)
    }
}
