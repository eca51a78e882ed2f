//! Instance document parsing.
//!
//! An instance document declares contexts (entity, period, dimensional segment),
//! units, and then facts that point at both by id. Facts are collected while reading
//! and resolved against contexts once the whole document is in, because nothing
//! forces contexts to precede the facts that use them.

use chrono::NaiveDate;
use folio_core::types::qname_to_element_id;
use folio_core::{Decimals, DimensionSignature, Fact, FolioError, Period, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::xml::{attr, local_name, qualified_name};

/// A reporting context.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Context id.
    pub id: String,
    /// Reporting window; `None` for `forever` contexts.
    pub period: Option<Period>,
    /// Segment and scenario dimensions.
    pub dimensions: DimensionSignature,
}

/// Parsed contents of an instance document.
#[derive(Debug, Clone, Default)]
pub struct InstanceDocument {
    /// Facts with resolved periods and dimensions, in document order.
    pub facts: Vec<Fact>,
    /// Contexts by id.
    pub contexts: BTreeMap<String, Context>,
    /// Units by id, measures in element-id form (`iso4217_USD`, `iso4217_USD/xbrli_shares`).
    pub units: BTreeMap<String, String>,
    /// Facts dropped because their context was unknown or had no usable period.
    pub skipped: usize,
}

impl InstanceDocument {
    /// Facts reported for a concept, in document order.
    pub fn facts_for<'a>(&'a self, concept: &'a str) -> impl Iterator<Item = &'a Fact> {
        self.facts.iter().filter(move |f| f.concept == concept)
    }
}

#[derive(Debug, Default)]
struct ContextBuilder {
    id: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    instant: Option<NaiveDate>,
    dimensions: DimensionSignature,
}

impl ContextBuilder {
    fn build(self) -> Context {
        let period = match (self.instant, self.start, self.end) {
            (Some(date), _, _) => Some(Period::Instant(date)),
            (None, Some(start), Some(end)) => Some(Period::Duration { start, end }),
            _ => None,
        };
        Context {
            id: self.id,
            period,
            dimensions: self.dimensions,
        }
    }
}

#[derive(Debug)]
struct MemberBuilder {
    axis: String,
    typed: bool,
    text: String,
}

#[derive(Debug, Default)]
struct UnitBuilder {
    id: String,
    numerator: Vec<String>,
    denominator: Vec<String>,
    in_denominator: bool,
}

impl UnitBuilder {
    fn build(self) -> (String, String) {
        let numerator = self.numerator.join("*");
        let measure = if self.denominator.is_empty() {
            numerator
        } else {
            format!("{numerator}/{}", self.denominator.join("*"))
        };
        (self.id, measure)
    }
}

#[derive(Debug)]
struct RawFact {
    concept: String,
    context_ref: String,
    unit_ref: Option<String>,
    decimals: Option<Decimals>,
    nil: bool,
    text: String,
    depth: usize,
}

impl RawFact {
    fn from_start(e: &BytesStart<'_>, context_ref: String, depth: usize) -> Self {
        Self {
            concept: qname_to_element_id(&qualified_name(e)),
            context_ref,
            unit_ref: attr(e, "unitRef"),
            decimals: attr(e, "decimals").as_deref().and_then(Decimals::parse),
            nil: attr(e, "nil").is_some_and(|v| v.trim() == "true"),
            text: String::new(),
            depth,
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // Some filers append a time component to period dates.
    let date = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parses an instance document.
///
/// # Errors
/// Returns [`FolioError::Xml`] if the document is not well-formed.
pub fn parse_instance(xml: &str) -> Result<InstanceDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut contexts: BTreeMap<String, Context> = BTreeMap::new();
    let mut units: BTreeMap<String, String> = BTreeMap::new();
    let mut raw_facts: Vec<RawFact> = Vec::new();

    let mut context: Option<ContextBuilder> = None;
    let mut member: Option<MemberBuilder> = None;
    let mut unit: Option<UnitBuilder> = None;
    let mut fact: Option<RawFact> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FolioError::xml(
                "instance",
                format!("{e} at byte {}", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = local_name(e);

                if fact.is_none() {
                    match local.as_str() {
                        "context" => {
                            context = Some(ContextBuilder {
                                id: attr(e, "id").unwrap_or_default(),
                                ..Default::default()
                            });
                        }
                        "explicitMember" | "typedMember" if context.is_some() => {
                            member = attr(e, "dimension").map(|axis| MemberBuilder {
                                axis: qname_to_element_id(&axis),
                                typed: local == "typedMember",
                                text: String::new(),
                            });
                        }
                        "unit" => {
                            unit = Some(UnitBuilder {
                                id: attr(e, "id").unwrap_or_default(),
                                ..Default::default()
                            });
                        }
                        "unitDenominator" => {
                            if let Some(u) = unit.as_mut() {
                                u.in_denominator = true;
                            }
                        }
                        _ => {
                            if context.is_none()
                                && unit.is_none()
                                && let Some(context_ref) = attr(e, "contextRef")
                            {
                                let raw = RawFact::from_start(e, context_ref, stack.len());
                                if is_empty {
                                    raw_facts.push(raw);
                                } else {
                                    fact = Some(raw);
                                }
                            }
                        }
                    }
                }

                if !is_empty {
                    stack.push(local);
                }
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| FolioError::xml("instance", e))?;
                if let Some(f) = fact.as_mut() {
                    f.text.push_str(&text);
                } else if let Some(m) = member.as_mut() {
                    m.text.push_str(text.trim());
                } else if let Some(c) = context.as_mut() {
                    match stack.last().map(String::as_str) {
                        Some("startDate") => c.start = parse_date(&text),
                        Some("endDate") => c.end = parse_date(&text),
                        Some("instant") => c.instant = parse_date(&text),
                        _ => {}
                    }
                } else if let Some(u) = unit.as_mut()
                    && stack.last().is_some_and(|s| s == "measure")
                {
                    let measure = qname_to_element_id(&text);
                    if u.in_denominator {
                        u.denominator.push(measure);
                    } else {
                        u.numerator.push(measure);
                    }
                }
            }
            Event::CData(ref t) => {
                if let Some(f) = fact.as_mut() {
                    f.text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Event::End(ref e) => {
                stack.pop();
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                if fact.as_ref().is_some_and(|f| f.depth == stack.len()) {
                    if let Some(f) = fact.take() {
                        raw_facts.push(f);
                    }
                    continue;
                }
                if fact.is_some() {
                    continue;
                }

                match local.as_str() {
                    "context" => {
                        if let Some(c) = context.take() {
                            let built = c.build();
                            if built.period.is_none() {
                                debug!(context = %built.id, "Context has no usable period");
                            }
                            contexts.insert(built.id.clone(), built);
                        }
                    }
                    "explicitMember" | "typedMember" => {
                        if let (Some(m), Some(c)) = (member.take(), context.as_mut()) {
                            let value = if m.typed {
                                m.text
                            } else {
                                qname_to_element_id(&m.text)
                            };
                            c.dimensions.insert(m.axis, value);
                        }
                    }
                    "unit" => {
                        if let Some(u) = unit.take() {
                            let (id, measure) = u.build();
                            units.insert(id, measure);
                        }
                    }
                    "unitDenominator" => {
                        if let Some(u) = unit.as_mut() {
                            u.in_denominator = false;
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut skipped = 0usize;
    let mut facts = Vec::with_capacity(raw_facts.len());
    for raw in raw_facts {
        let Some(ctx) = contexts.get(&raw.context_ref) else {
            warn!(concept = %raw.concept, context = %raw.context_ref, "Fact references unknown context");
            skipped += 1;
            continue;
        };
        let Some(period) = ctx.period else {
            skipped += 1;
            continue;
        };

        let raw_value = raw.text.trim().to_string();
        let value = if raw.nil || raw.unit_ref.is_none() {
            None
        } else {
            match raw_value.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(concept = %raw.concept, value = %raw_value, "Numeric fact is not a number");
                    None
                }
            }
        };

        facts.push(Fact {
            concept: raw.concept,
            context_ref: raw.context_ref,
            raw_value,
            value,
            unit: raw
                .unit_ref
                .as_ref()
                .map(|id| units.get(id).cloned().unwrap_or_else(|| id.clone())),
            decimals: raw.decimals,
            period,
            dimensions: ctx.dimensions.clone(),
        });
    }

    debug!(
        facts = facts.len(),
        contexts = contexts.len(),
        units = units.len(),
        skipped,
        "Parsed instance document"
    );

    Ok(InstanceDocument {
        facts,
        contexts,
        units,
        skipped,
    })
}
