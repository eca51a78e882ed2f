//! Fact store.
//!
//! Facts are indexed by concept, then by (period key, dimension signature). Several raw
//! contexts frequently describe the same period; they collapse onto one key here, and
//! the merge never lets a null overwrite a value that is already known. Facts in
//! different units (a functional currency next to a convenience translation) share a
//! slot without merging; the first unit reported is the slot's primary value.

use folio_core::{DimensionSignature, Fact, Period, PeriodKey};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

type Slot = (PeriodKey, DimensionSignature);

/// Indexed, merged facts of one filing.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    // One fact per unit, in the order units were first seen.
    facts: BTreeMap<String, BTreeMap<Slot, Vec<Fact>>>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            facts: BTreeMap::new(),
        }
    }

    /// Builds a store from facts, merging duplicates.
    #[must_use]
    pub fn from_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut store = Self::new();
        for fact in facts {
            store.insert(fact);
        }
        store
    }

    /// Inserts a fact, merging with any fact already held for the same slot and unit.
    ///
    /// A non-null value is never replaced by null. Between two non-null values the
    /// more precise one wins; on equal precision the first one stays.
    pub fn insert(&mut self, fact: Fact) {
        let slot = (fact.period_key(), fact.dimensions.clone());
        let by_unit = self
            .facts
            .entry(fact.concept.clone())
            .or_default()
            .entry(slot)
            .or_default();
        match by_unit.iter_mut().find(|f| f.unit == fact.unit) {
            None => by_unit.push(fact),
            Some(existing) => {
                if should_replace(existing, &fact) {
                    trace!(
                        concept = %fact.concept,
                        period = %fact.period,
                        from = %existing.context_ref,
                        to = %fact.context_ref,
                        "Merged duplicate context"
                    );
                    *existing = fact;
                }
            }
        }
    }

    fn slot(
        &self,
        concept: &str,
        period: &PeriodKey,
        dimensions: &DimensionSignature,
    ) -> Option<&[Fact]> {
        self.facts
            .get(concept)?
            .get(&(period.clone(), dimensions.clone()))
            .map(Vec::as_slice)
    }

    /// The merged fact for a slot, in its primary unit.
    ///
    /// The primary unit is the first one reported with a value.
    #[must_use]
    pub fn fact(
        &self,
        concept: &str,
        period: &PeriodKey,
        dimensions: &DimensionSignature,
    ) -> Option<&Fact> {
        self.slot(concept, period, dimensions).and_then(primary)
    }

    /// The merged fact for a slot in a specific unit.
    #[must_use]
    pub fn fact_in_unit(
        &self,
        concept: &str,
        period: &PeriodKey,
        dimensions: &DimensionSignature,
        unit: &str,
    ) -> Option<&Fact> {
        self.slot(concept, period, dimensions)?
            .iter()
            .find(|f| f.unit.as_deref() == Some(unit))
    }

    /// Numeric value for a slot.
    #[must_use]
    pub fn value(
        &self,
        concept: &str,
        period: &PeriodKey,
        dimensions: &DimensionSignature,
    ) -> Option<f64> {
        self.fact(concept, period, dimensions).and_then(|f| f.value)
    }

    /// Undimensioned value of a concept in a period.
    #[must_use]
    pub fn total(&self, concept: &str, period: &PeriodKey) -> Option<f64> {
        self.value(concept, period, &DimensionSignature::new())
    }

/// Every fact held for a concept, ordered by period key then signature.
    pub fn facts_for<'a>(&'a self, concept: &str) -> impl Iterator<Item = &'a Fact> + use<'a> {
        self.facts.get(concept).into_iter().flat_map(BTreeMap::values).flatten()
    }

    /// Dimensional facts of a concept in one period.
    pub fn dimensional_facts<'a>(
        &'a self,
        concept: &str,
        period: &'a PeriodKey,
    ) -> impl Iterator<Item = &'a Fact> + use<'a> {
        self.facts_for(concept)
            .filter(move |f| f.is_dimensional() && f.period_key() == *period)
    }

    /// Undimensioned facts with a value, for a concept, one per period in its
    /// primary unit.
    pub fn valued_totals<'a>(&'a self, concept: &str) -> impl Iterator<Item = &'a Fact> + use<'a> {
        self.facts
            .get(concept)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter_map(|by_unit| primary(by_unit))
            .filter(|f| !f.is_dimensional() && f.value.is_some())
    }

    /// Returns true if any fact of the concept carries a value in the period.
    #[must_use]
    pub fn has_value(&self, concept: &str, period: &PeriodKey) -> bool {
        self.facts_for(concept)
            .any(|f| f.value.is_some() && f.period_key() == *period)
    }

    /// Returns true if every fact of the concept is an instant; false if unknown.
    #[must_use]
    pub fn is_instant_concept(&self, concept: &str) -> bool {
        let mut facts = self.facts_for(concept).peekable();
        facts.peek().is_some() && facts.all(|f| f.period.is_instant())
    }

    /// Every distinct period, sorted.
    #[must_use]
    pub fn periods(&self) -> BTreeSet<Period> {
        self.facts
            .values()
            .flat_map(BTreeMap::values)
            .flatten()
            .map(|f| f.period)
            .collect()
    }

    /// Every concept with at least one fact, sorted.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Number of merged facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Returns true if the store holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

fn primary(by_unit: &[Fact]) -> Option<&Fact> {
    by_unit
        .iter()
        .find(|f| f.value.is_some())
        .or_else(|| by_unit.first())
}

fn should_replace(existing: &Fact, incoming: &Fact) -> bool {
    match (existing.value, incoming.value) {
        (None, Some(_)) => true,
        (Some(_), None) | (None, None) => false,
        (Some(_), Some(_)) => incoming.decimals > existing.decimals,
    }
}
