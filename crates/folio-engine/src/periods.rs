//! Period selection.
//!
//! A filing reports many periods: the current and comparative fiscal years, quarter
//! and year-to-date durations in interim reports, opening balances, odd stub periods
//! from acquisitions. The selector over-generates candidates of the statement's period
//! type, scores each by how many of the statement's concepts actually have values in
//! it, and keeps the best few.

use folio_core::{Period, PeriodCadence, PeriodKey, StatementType};
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::config::PeriodConfig;
use crate::fact_store::FactStore;

/// A candidate column with its data quality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodCandidate {
    /// Reporting window.
    pub period: Period,
    /// Number of required concepts with a value in the window.
    pub quality: usize,
}

/// Chooses period columns for statements.
#[derive(Debug)]
pub struct PeriodSelector<'a> {
    store: &'a FactStore,
    config: &'a PeriodConfig,
}

impl<'a> PeriodSelector<'a> {
    /// Creates a selector over a fact store.
    #[must_use]
    pub const fn new(store: &'a FactStore, config: &'a PeriodConfig) -> Self {
        Self { store, config }
    }

    /// Selects up to `max_periods` columns, most recent first.
    ///
    /// `required` lists the concepts whose presence makes a period worth showing.
    /// Periods where none of them has a value are never returned. If the cadence
    /// window leaves fewer than two usable periods, every period of the statement's
    /// type is considered instead. Point-in-time statements always lead with the
    /// latest instant that has data, so an interim balance sheet is shown next to
    /// the prior fiscal year end.
    pub fn select_periods(
        &self,
        statement_type: StatementType,
        max_periods: usize,
        cadence: PeriodCadence,
        required: &BTreeSet<String>,
    ) -> Vec<PeriodKey> {
        if max_periods == 0 {
            return Vec::new();
        }

        let mut selected = self.rank(self.candidates(statement_type, Some(cadence)), max_periods, required);
        if selected.len() < max_periods.min(2) {
            let relaxed = self.rank(self.candidates(statement_type, None), max_periods, required);
            if relaxed.len() > selected.len() {
                debug!(
                    %statement_type,
                    strict = selected.len(),
                    relaxed = relaxed.len(),
                    "Relaxed cadence window"
                );
                selected = relaxed;
            }
        }

        if statement_type.is_point_in_time() {
            self.lead_with_latest_instant(&mut selected, max_periods, required);
        }

        debug!(
            %statement_type,
            ?cadence,
            columns = selected.len(),
            "Selected periods"
        );
        selected.into_iter().map(|c| c.period.key()).collect()
    }

    /// Candidate periods of the statement's type, most recent first.
    ///
    /// With a cadence, durations must fall in its day window. Instants for an annual
    /// cadence are limited to fiscal year ends when any annual duration exists.
    #[must_use]
    pub fn candidates(
        &self,
        statement_type: StatementType,
        cadence: Option<PeriodCadence>,
    ) -> Vec<Period> {
        let periods = self.store.periods();
        let in_window = |days: i64| match cadence {
            Some(PeriodCadence::Annual) => self.config.is_annual(days),
            Some(PeriodCadence::Quarterly) => self.config.is_quarterly(days),
            None => true,
        };

        let mut candidates: Vec<Period> = if statement_type.is_point_in_time() {
            let ends: BTreeSet<_> = periods
                .iter()
                .filter(|p| p.days().is_some_and(in_window))
                .map(Period::end)
                .collect();
            periods
                .iter()
                .filter(|p| p.is_instant())
                .filter(|p| cadence.is_none() || ends.is_empty() || ends.contains(&p.end()))
                .copied()
                .collect()
        } else {
            periods
                .iter()
                .filter(|p| p.days().is_some_and(in_window))
                .copied()
                .collect()
        };

        candidates.sort_by(|a, b| b.end().cmp(&a.end()).then(a.cmp(b)));
        candidates
    }

    /// Number of required concepts with a value in a period.
    #[must_use]
    pub fn quality(&self, period: &Period, required: &BTreeSet<String>) -> usize {
        let key = period.key();
        required
            .iter()
            .filter(|concept| self.store.has_value(concept, &key))
            .count()
    }

    fn lead_with_latest_instant(
        &self,
        selected: &mut Vec<PeriodCandidate>,
        max_periods: usize,
        required: &BTreeSet<String>,
    ) {
        let latest_selected = selected.first().map(|c| c.period.end());
        let latest = self
            .store
            .periods()
            .into_iter()
            .rev()
            .filter(|p| p.is_instant())
            .take_while(|p| latest_selected.is_none_or(|end| p.end() > end))
            .map(|period| PeriodCandidate {
                quality: self.quality(&period, required),
                period,
            })
            .find(|c| c.quality > 0);
        if let Some(latest) = latest {
            debug!(period = %latest.period, "Latest instant leads the columns");
            selected.insert(0, latest);
            selected.truncate(max_periods);
        }
    }

    fn rank(
        &self,
        candidates: Vec<Period>,
        max_periods: usize,
        required: &BTreeSet<String>,
    ) -> Vec<PeriodCandidate> {
        let limit = max_periods.saturating_mul(self.config.candidate_multiplier.max(3));
        let mut scored: Vec<PeriodCandidate> = candidates
            .into_iter()
            .take(limit)
            .map(|period| PeriodCandidate {
                quality: self.quality(&period, required),
                period,
            })
            .filter(|c| {
                if c.quality == 0 {
                    trace!(period = %c.period, "Dropped period without data");
                }
                c.quality > 0
            })
            .collect();

        scored.sort_by(|a, b| {
            b.period
                .end()
                .cmp(&a.period.end())
                .then(b.quality.cmp(&a.quality))
                .then(a.period.key().cmp(&b.period.key()))
        });
        scored.truncate(max_periods);
        scored
    }
}
