//! Rolling and derived metrics.
//!
//! Interim filings report three-month and year-to-date durations, and the fourth
//! quarter is almost never reported on its own. These helpers combine what is there
//! into trailing-twelve-month sums and discrete quarters, refusing whenever an input
//! is missing rather than guessing.

use chrono::{Datelike, Duration, NaiveDate};
use folio_core::{Period, PeriodKey};
use tracing::{debug, trace};

use crate::config::PeriodConfig;
use crate::fact_store::FactStore;

/// A discrete fiscal quarter with its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuarterValue {
    /// Quarter window.
    pub period: Period,
    /// Value for the quarter alone.
    pub value: f64,
    /// Set when the value was computed from year-to-date figures.
    pub derived: bool,
}

/// Derives quarterly and trailing figures from a fact store.
#[derive(Debug)]
pub struct DerivedMetrics<'a> {
    store: &'a FactStore,
    config: &'a PeriodConfig,
}

impl<'a> DerivedMetrics<'a> {
    /// Creates a calculator over a fact store.
    #[must_use]
    pub const fn new(store: &'a FactStore, config: &'a PeriodConfig) -> Self {
        Self { store, config }
    }

    /// Undimensioned duration facts of a concept with values, as (period, value).
    fn durations(&self, concept: &str) -> Vec<(Period, f64)> {
        self.store
            .valued_totals(concept)
            .filter_map(|f| match (f.period, f.value) {
                (p @ Period::Duration { .. }, Some(v)) => Some((p, v)),
                _ => None,
            })
            .collect()
    }

    /// The discrete quarter ending on `end`.
    fn quarter_ending(&self, durations: &[(Period, f64)], end: NaiveDate) -> Option<(Period, f64)> {
        durations
            .iter()
            .find(|(p, _)| p.end() == end && p.days().is_some_and(|d| self.config.is_quarterly(d)))
            .copied()
    }

    /// Trailing-twelve-month sums for quarterly columns.
    ///
    /// Each output value is the column's quarter plus the three quarters before it.
    /// Quarters must be discrete, reported, and chain day by day with no gap or
    /// overlap; otherwise the value is `None`. Non-quarterly columns yield `None`.
    pub fn rolling_ttm(&self, concept: &str, periods: &[PeriodKey]) -> Vec<Option<f64>> {
        let durations = self.durations(concept);
        periods
            .iter()
            .map(|key| {
                let period = key.period()?;
                let days = period.days()?;
                if !self.config.is_quarterly(days) {
                    trace!(concept, period = %key, "Not a quarter");
                    return None;
                }
                let (mut current, mut total) = durations.iter().find(|(p, _)| *p == period).copied()?;
                for _ in 0..3 {
                    let prior_end = current.start()?.checked_sub_signed(Duration::days(1))?;
                    let (prior, value) = self.quarter_ending(&durations, prior_end)?;
                    total += value;
                    current = prior;
                }
                Some(total)
            })
            .collect()
    }

    /// The annual duration reported for a fiscal year.
    ///
    /// A fiscal year is named by the calendar year its last day falls in. When several
    /// annual durations end in that year, the latest one wins.
    #[must_use]
    pub fn annual(&self, concept: &str, fiscal_year: i32) -> Option<(Period, f64)> {
        self.durations(concept)
            .into_iter()
            .filter(|(p, _)| {
                p.end().year() == fiscal_year && p.days().is_some_and(|d| self.config.is_annual(d))
            })
            .max_by_key(|(p, _)| (p.end(), p.start()))
    }

    /// The first three discrete quarters of the fiscal year that starts on `fy_start`.
    ///
    /// Each quarter is taken as reported when a three-month duration exists; otherwise
    /// it is the difference between consecutive year-to-date durations starting at
    /// `fy_start`. A quarter that cannot be established ends the chain.
    #[must_use]
    pub fn discrete_quarters(&self, concept: &str, fy_start: NaiveDate) -> Vec<QuarterValue> {
        let durations = self.durations(concept);
        let mut quarters: Vec<QuarterValue> = Vec::with_capacity(3);
        let mut start = fy_start;
        let mut cumulative = 0.0;

        for n in 1..=3i64 {
            let reported = durations.iter().find(|(p, _)| {
                p.start() == Some(start) && p.days().is_some_and(|d| self.config.is_quarterly(d))
            });
            let quarter = match reported {
                Some((period, value)) => QuarterValue {
                    period: *period,
                    value: *value,
                    derived: false,
                },
                None => {
                    let ytd = durations.iter().find(|(p, _)| {
                        p.start() == Some(fy_start)
                            && p.end() >= start
                            && p.days().is_some_and(|d| self.config.spans_quarters(d, n))
                    });
                    let Some((ytd_period, ytd_value)) = ytd else {
                        break;
                    };
                    QuarterValue {
                        period: Period::Duration {
                            start,
                            end: ytd_period.end(),
                        },
                        value: ytd_value - cumulative,
                        derived: true,
                    }
                }
            };
            cumulative += quarter.value;
            let Some(next) = quarter.period.end().checked_add_signed(Duration::days(1)) else {
                break;
            };
            start = next;
            quarters.push(quarter);
        }
        quarters
    }

    /// Fourth quarter as annual minus the first three quarters.
    ///
    /// Returns `None` unless the annual figure and all three quarters are known and
    /// the quarters end inside the fiscal year.
    pub fn derive_quarter_from_annual(&self, concept: &str, fiscal_year: i32) -> Option<f64> {
        let Some((annual, annual_value)) = self.annual(concept, fiscal_year) else {
            debug!(concept, fiscal_year, "No annual figure to derive from");
            return None;
        };
        let fy_start = annual.start()?;
        let quarters = self.discrete_quarters(concept, fy_start);
        if quarters.len() < 3 {
            debug!(
                concept,
                fiscal_year,
                found = quarters.len(),
                "Missing quarters, not deriving"
            );
            return None;
        }
        if quarters.iter().any(|q| q.period.end() >= annual.end()) {
            debug!(concept, fiscal_year, "Quarters overrun the fiscal year");
            return None;
        }
        let three: f64 = quarters.iter().map(|q| q.value).sum();
        Some(annual_value - three)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use folio_core::Fact;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dur(start: NaiveDate, end: NaiveDate) -> Period {
        Period::Duration { start, end }
    }

    fn rev(period: Period, value: f64) -> Fact {
        Fact::new("us-gaap_Revenues", "c", period).with_value(value)
    }

    fn discrete_2023() -> Vec<Fact> {
        vec![
            rev(dur(date(2023, 1, 1), date(2023, 3, 31)), 100.0),
            rev(dur(date(2023, 4, 1), date(2023, 6, 30)), 110.0),
            rev(dur(date(2023, 7, 1), date(2023, 9, 30)), 120.0),
            rev(dur(date(2023, 1, 1), date(2023, 12, 31)), 460.0),
        ]
    }

    #[test]
    fn test_q4_from_discrete_quarters() {
        let store = FactStore::from_facts(discrete_2023());
        let config = PeriodConfig::default();
        let derived = DerivedMetrics::new(&store, &config);
        let q4 = derived.derive_quarter_from_annual("us-gaap_Revenues", 2023).unwrap();
        assert_relative_eq!(q4, 130.0);
    }

    #[test]
    fn test_q4_from_year_to_date() {
        let store = FactStore::from_facts([
            rev(dur(date(2023, 1, 1), date(2023, 3, 31)), 100.0),
            rev(dur(date(2023, 1, 1), date(2023, 6, 30)), 210.0),
            rev(dur(date(2023, 1, 1), date(2023, 9, 30)), 330.0),
            rev(dur(date(2023, 1, 1), date(2023, 12, 31)), 460.0),
        ]);
        let config = PeriodConfig::default();
        let derived = DerivedMetrics::new(&store, &config);

        let quarters = derived.discrete_quarters("us-gaap_Revenues", date(2023, 1, 1));
        assert_eq!(quarters.len(), 3);
        assert!(!quarters[0].derived);
        assert!(quarters[1].derived);
        assert_relative_eq!(quarters[1].value, 110.0);
        assert_relative_eq!(quarters[2].value, 120.0);

        let q4 = derived.derive_quarter_from_annual("us-gaap_Revenues", 2023).unwrap();
        assert_relative_eq!(q4, 130.0);
    }

    #[test]
    fn test_missing_quarter_refuses() {
        let mut facts = discrete_2023();
        facts.remove(1);
        let store = FactStore::from_facts(facts);
        let config = PeriodConfig::default();
        let derived = DerivedMetrics::new(&store, &config);
        assert_eq!(derived.derive_quarter_from_annual("us-gaap_Revenues", 2023), None);
        assert_eq!(derived.derive_quarter_from_annual("us-gaap_Revenues", 2022), None);
    }

    #[test]
    fn test_ttm_requires_four_contiguous_quarters() {
        let mut facts = discrete_2023();
        facts.push(rev(dur(date(2023, 10, 1), date(2023, 12, 31)), 130.0));
        facts.push(rev(dur(date(2024, 1, 1), date(2024, 3, 31)), 140.0));
        let store = FactStore::from_facts(facts);
        let config = PeriodConfig::default();
        let derived = DerivedMetrics::new(&store, &config);

        let periods = vec![
            dur(date(2024, 1, 1), date(2024, 3, 31)).key(),
            dur(date(2023, 10, 1), date(2023, 12, 31)).key(),
            dur(date(2023, 7, 1), date(2023, 9, 30)).key(),
            dur(date(2023, 1, 1), date(2023, 12, 31)).key(),
        ];
        let ttm = derived.rolling_ttm("us-gaap_Revenues", &periods);
        assert_eq!(ttm.len(), 4);
        assert_relative_eq!(ttm[0].unwrap(), 500.0);
        assert_relative_eq!(ttm[1].unwrap(), 460.0);
        assert_eq!(ttm[2], None);
        assert_eq!(ttm[3], None);
    }

    #[test]
    fn test_ttm_gap_breaks_chain() {
        let store = FactStore::from_facts([
            rev(dur(date(2023, 1, 1), date(2023, 3, 31)), 100.0),
            rev(dur(date(2023, 4, 1), date(2023, 6, 30)), 110.0),
            // 2023-07-01 .. 2023-09-30 missing
            rev(dur(date(2023, 10, 1), date(2023, 12, 31)), 130.0),
            rev(dur(date(2024, 1, 1), date(2024, 3, 31)), 140.0),
        ]);
        let config = PeriodConfig::default();
        let derived = DerivedMetrics::new(&store, &config);
        let ttm = derived.rolling_ttm(
            "us-gaap_Revenues",
            &[dur(date(2024, 1, 1), date(2024, 3, 31)).key()],
        );
        assert_eq!(ttm, vec![None]);
    }
}
