//! Statement assembly.
//!
//! Walks a presentation tree depth first and turns every line item into a row with one
//! cell per selected period. Hypercube scaffolding is walked through without producing
//! rows, dimensional facts become child rows of their concept, and roll-forward
//! balances are read at the right edge of each period.

use folio_core::types::local_name;
use folio_core::{
    ConceptPeriodType, DimensionSignature, ElementCatalog, FilingId, PeriodKey, StatementRow,
    StatementTable, StatementType, StatementView,
};
use folio_xbrl::{LabelSet, roles};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, warn};

use crate::dimensions::{AxisClass, DimensionClassifier};
use crate::fact_store::FactStore;
use crate::linkbase::{LinkbaseTree, NodeKind};
use crate::roles::words;

/// Turns an element name into a readable label (`AccountsPayableCurrent` → "Accounts payable current").
#[must_use]
pub fn humanize(element_id: &str) -> String {
    let words = words(local_name(element_id));
    let mut label = words.join(" ");
    if let Some(first) = label.get(..1) {
        label = first.to_ascii_uppercase() + &label[1..];
    }
    label
}

/// Everything needed to assemble statements from one filing.
#[derive(Debug)]
pub struct StatementAssembler<'a> {
    store: &'a FactStore,
    calculations: &'a BTreeMap<String, LinkbaseTree>,
    labels: &'a LabelSet,
    catalog: &'a ElementCatalog,
    classifier: &'a DimensionClassifier,
    tolerance: f64,
}

struct Walk<'t> {
    tree: &'t LinkbaseTree,
    statement_type: StatementType,
    periods: &'t [PeriodKey],
    rows: Vec<StatementRow>,
}

impl<'a> StatementAssembler<'a> {
    /// Creates an assembler.
    #[must_use]
    pub const fn new(
        store: &'a FactStore,
        calculations: &'a BTreeMap<String, LinkbaseTree>,
        labels: &'a LabelSet,
        catalog: &'a ElementCatalog,
        classifier: &'a DimensionClassifier,
        tolerance: f64,
    ) -> Self {
        Self {
            store,
            calculations,
            labels,
            catalog,
            classifier,
            tolerance,
        }
    }

    /// Assembles a statement from a presentation tree.
    ///
    /// Rows are built once for the detailed view and then filtered, so every view is
    /// a subset of the detailed one. Period columns without any value in the filtered
    /// rows are dropped.
    #[instrument(skip(self, filing, tree, periods), fields(role = %tree.role, periods = periods.len()))]
    pub fn assemble(
        &self,
        filing: &FilingId,
        tree: &LinkbaseTree,
        statement_type: StatementType,
        periods: &[PeriodKey],
        view: StatementView,
    ) -> StatementTable {
        let mut walk = Walk {
            tree,
            statement_type,
            periods,
            rows: Vec::new(),
        };
        let mut ancestors = Vec::new();
        for root in &tree.roots {
            self.visit(&mut walk, root, None, 0, &mut ancestors);
        }

        let detailed = StatementTable {
            filing: filing.clone(),
            statement_type,
            role: tree.role.clone(),
            view: StatementView::Detailed,
            periods: periods.to_vec(),
            rows: walk.rows,
        };
        let table = detailed.filter_view(view);
        debug!(
            rows = table.rows.len(),
            columns = table.periods.len(),
            ?view,
            "Assembled statement"
        );
        table
    }

    fn visit(
        &self,
        walk: &mut Walk<'_>,
        element_id: &str,
        preferred_label: Option<&str>,
        depth: usize,
        ancestors: &mut Vec<String>,
    ) {
        if ancestors.iter().any(|a| a == element_id) {
            warn!(role = %walk.tree.role, element = element_id, "Presentation cycle skipped");
            return;
        }

        let kind = NodeKind::of(element_id);
        if kind.is_dimensional() {
            return;
        }
        let child_depth = if kind.is_transparent() {
            depth
        } else {
            self.emit(walk, element_id, preferred_label, depth);
            depth + 1
        };

        ancestors.push(element_id.to_string());
        let tree = walk.tree;
        for edge in tree.children(element_id) {
            self.visit(
                walk,
                &edge.element_id,
                edge.preferred_label.as_deref(),
                child_depth,
                ancestors,
            );
        }
        ancestors.pop();
    }

    fn emit(
        &self,
        walk: &mut Walk<'_>,
        element_id: &str,
        preferred_label: Option<&str>,
        depth: usize,
    ) {
        let label = self.label(element_id, preferred_label);
        let mut row = StatementRow::new(element_id, label.clone(), depth);
        row.preferred_label = preferred_label.map(str::to_string);
        row.is_abstract = self.catalog.is_abstract(element_id);

        if row.is_abstract {
            row.values = walk.periods.iter().map(|p| (p.clone(), None)).collect();
            walk.rows.push(row);
            return;
        }

        // Column key -> key the value is looked up under.
        let lookups: Vec<(PeriodKey, PeriodKey)> = walk
            .periods
            .iter()
            .map(|p| {
                (
                    p.clone(),
                    self.lookup_key(element_id, p, walk.statement_type, preferred_label),
                )
            })
            .collect();

        let mut signatures: BTreeSet<DimensionSignature> = BTreeSet::new();
        for (_, lookup) in &lookups {
            for fact in self.store.dimensional_facts(element_id, lookup) {
                if fact.value.is_some() {
                    signatures.insert(fact.dimensions.clone());
                }
            }
        }

        let mut base = DimensionSignature::new();
        let has_total = lookups
            .iter()
            .any(|(_, lookup)| self.store.total(element_id, lookup).is_some());
        if !has_total {
            let face: Vec<&DimensionSignature> = signatures
                .iter()
                .filter(|s| {
                    s.len() == 1
                        && s.axes().all(|axis| {
                            self.classifier.classify(axis, walk.statement_type) == AxisClass::Face
                        })
                })
                .collect();
            if let [only] = face.as_slice() {
                debug!(element = element_id, dimensions = %only, "Face dimension stands in for the total");
                base = (*only).clone();
            }
        }
        if !base.is_empty() {
            signatures.remove(&base);
        }

        let negated = preferred_label.is_some_and(roles::is_negated);
        let signed = |value: Option<f64>| if negated { value.map(|v| -v) } else { value };

        row.values = lookups
            .iter()
            .map(|(column, lookup)| {
                (column.clone(), signed(self.store.value(element_id, lookup, &base)))
            })
            .collect();
        row.is_total = self.is_total(walk.tree, element_id, preferred_label, &lookups, walk.statement_type);
        walk.rows.push(row);

        for signature in signatures {
            let members: Vec<String> = signature
                .iter()
                .map(|(_, member)| self.member_label(member))
                .collect();
            let mut dim_row =
                StatementRow::new(element_id, format!("{} - {label}", members.join(" / ")), depth + 1);
            dim_row.preferred_label = preferred_label.map(str::to_string);
            dim_row.is_breakdown = self.classifier.is_breakdown(&signature, walk.statement_type);
            dim_row.values = lookups
                .iter()
                .map(|(column, lookup)| {
                    (column.clone(), signed(self.store.value(element_id, lookup, &signature)))
                })
                .collect();
            dim_row.dimensions = signature;
            walk.rows.push(dim_row);
        }
    }

    /// Key a concept's value is read under for a column.
    ///
    /// Instant concepts inside a duration statement are balances: the closing balance
    /// sits at the period end, the opening balance at the day before the period starts.
    fn lookup_key(
        &self,
        element_id: &str,
        column: &PeriodKey,
        statement_type: StatementType,
        preferred_label: Option<&str>,
    ) -> PeriodKey {
        if statement_type.is_point_in_time() {
            return column.clone();
        }
        let Some(period) = column.period() else {
            return column.clone();
        };
        if period.is_instant() {
            return column.clone();
        }
        let is_instant = match self.catalog.period_type(element_id) {
            Some(ConceptPeriodType::Instant) => true,
            Some(ConceptPeriodType::Duration) => false,
            None => self.store.is_instant_concept(element_id),
        };
        if !is_instant {
            return column.clone();
        }
        let date = if preferred_label.is_some_and(roles::is_period_start) {
            period.opening_instant()
        } else {
            Some(period.end())
        };
        date.map_or_else(|| column.clone(), PeriodKey::instant)
    }

    /// Row label. A preferred role the label linkbase has no text for qualifies the
    /// fallback label, so opening and closing balances never read the same.
    fn label(&self, element_id: &str, preferred_label: Option<&str>) -> String {
        if let Some(role) = preferred_label
            && let Some(text) = self.labels.get(element_id, role)
        {
            return text.to_string();
        }
        let base = self
            .labels
            .lookup(element_id, None)
            .map_or_else(|| humanize(element_id), str::to_string);
        match preferred_label {
            Some(role) if roles::is_period_start(role) => format!("{base}, beginning of period"),
            Some(role) if roles::is_period_end(role) => format!("{base}, end of period"),
            Some(role)
                if roles::is_total(role) && !base.to_ascii_lowercase().starts_with("total") =>
            {
                let mut chars = base.chars();
                let rest: String = chars.next().map_or_else(String::new, |first| {
                    first.to_lowercase().chain(chars).collect()
                });
                format!("Total {rest}")
            }
            _ => base,
        }
    }

    fn member_label(&self, member: &str) -> String {
        self.labels.lookup(member, None).map_or_else(
            || {
                let name = local_name(member);
                humanize(name.strip_suffix("Member").unwrap_or(name))
            },
            str::to_string,
        )
    }

    fn calculation_children(&self, role: &str, element_id: &str) -> Option<&'a LinkbaseTree> {
        self.calculations
            .get(role)
            .filter(|t| !t.children(element_id).is_empty())
            .or_else(|| {
                self.calculations
                    .values()
                    .find(|t| !t.children(element_id).is_empty())
            })
    }

    /// A row is a total when its label says so or when its calculation children,
    /// weighted, add up to it in every period where all of them are known.
    fn is_total(
        &self,
        tree: &LinkbaseTree,
        element_id: &str,
        preferred_label: Option<&str>,
        lookups: &[(PeriodKey, PeriodKey)],
        statement_type: StatementType,
    ) -> bool {
        if preferred_label.is_some_and(roles::is_total) {
            return true;
        }
        let Some(calc) = self.calculation_children(&tree.role, element_id) else {
            return false;
        };
        let children = calc.children(element_id);

        let mut checked = 0usize;
        for (column, lookup) in lookups {
            let Some(total) = self.store.total(element_id, lookup) else {
                continue;
            };
            let parts: Option<Vec<f64>> = children
                .iter()
                .map(|edge| {
                    let key = self.lookup_key(&edge.element_id, column, statement_type, None);
                    self.store
                        .total(&edge.element_id, &key)
                        .map(|v| v * edge.weight.unwrap_or(1.0))
                })
                .collect();
            let Some(parts) = parts else {
                continue;
            };
            let sum: f64 = parts.iter().sum();
            if (sum - total).abs() > self.tolerance * total.abs().max(1.0) {
                return false;
            }
            checked += 1;
        }
        checked > 0
    }
}
