//! Calculation and presentation linkbase parsing.
//!
//! Both linkbases share the XLink structure: an extended link per role holding
//! locators (`loc`) that name elements by `href` fragment, and arcs whose `from`/`to`
//! point at locator labels. Parsing flattens every arc into a [`Relationship`] with
//! element ids already resolved. Arc attributes are kept as raw strings; deciding what
//! a malformed order or weight means is the tree builder's job.

use folio_core::{FolioError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::xml::{attr, href_fragment, local_name};

/// One arc between two elements within a role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// Extended link role URI.
    pub role: String,
    /// Parent element id.
    pub from: String,
    /// Child element id.
    pub to: String,
    /// Raw `order` attribute.
    pub order: Option<String>,
    /// Raw `weight` attribute (calculation arcs).
    pub weight: Option<String>,
    /// Preferred label role (presentation arcs).
    pub preferred_label: Option<String>,
    /// Position of the arc in the document.
    pub sequence: usize,
}

#[derive(Debug)]
struct RawArc {
    from: String,
    to: String,
    order: Option<String>,
    weight: Option<String>,
    preferred_label: Option<String>,
    prohibited: bool,
}

#[derive(Debug, Default)]
struct ExtendedLink {
    role: String,
    locators: BTreeMap<String, Vec<String>>,
    arcs: Vec<RawArc>,
}

fn is_extended_link(local: &str) -> bool {
    local.ends_with("Link") && local != "roleRef"
}

fn is_arc(local: &str) -> bool {
    local.ends_with("Arc")
}

fn read_arc(e: &BytesStart<'_>) -> Option<RawArc> {
    Some(RawArc {
        from: attr(e, "from")?,
        to: attr(e, "to")?,
        order: attr(e, "order"),
        weight: attr(e, "weight"),
        preferred_label: attr(e, "preferredLabel"),
        prohibited: attr(e, "use").is_some_and(|u| u == "prohibited"),
    })
}

/// Parses a calculation or presentation linkbase into relationships.
///
/// Arcs whose locator labels cannot be resolved are logged and skipped. Arcs marked
/// `use="prohibited"` cancel every matching arc in the same role and are not returned.
///
/// # Errors
/// Returns [`FolioError::Xml`] if the document is not well-formed.
pub fn parse_linkbase(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut links: Vec<ExtendedLink> = Vec::new();
    let mut current: Option<ExtendedLink> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FolioError::xml(
                "linkbase",
                format!("{e} at byte {}", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let local = local_name(e);
                if is_extended_link(&local) && current.is_none() {
                    let link = ExtendedLink {
                        role: attr(e, "role").unwrap_or_default(),
                        ..Default::default()
                    };
                    if matches!(event, Event::Empty(_)) {
                        links.push(link);
                    } else {
                        current = Some(link);
                    }
                    continue;
                }
                let Some(link) = current.as_mut() else {
                    continue;
                };
                if local == "loc" {
                    let label = attr(e, "label");
                    let element = attr(e, "href")
                        .as_deref()
                        .and_then(href_fragment)
                        .map(str::to_string);
                    match (label, element) {
                        (Some(label), Some(element)) => {
                            link.locators.entry(label).or_default().push(element);
                        }
                        (label, _) => {
                            warn!(role = %link.role, ?label, "Locator without usable href");
                        }
                    }
                } else if is_arc(&local) {
                    match read_arc(e) {
                        Some(arc) => link.arcs.push(arc),
                        None => warn!(role = %link.role, "Arc missing from/to"),
                    }
                }
            }
            Event::End(ref e) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if is_extended_link(&local)
                    && let Some(link) = current.take()
                {
                    links.push(link);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut relationships = Vec::new();
    let mut sequence = 0usize;
    for link in links {
        let mut resolved: Vec<(RawArc, String, String)> = Vec::new();
        for arc in link.arcs {
            let (Some(froms), Some(tos)) = (link.locators.get(&arc.from), link.locators.get(&arc.to))
            else {
                warn!(role = %link.role, from = %arc.from, to = %arc.to, "Dangling arc skipped");
                continue;
            };
            // A locator label may stand for several elements; the arc fans out.
            for from in froms {
                for to in tos {
                    resolved.push((
                        RawArc {
                            from: arc.from.clone(),
                            to: arc.to.clone(),
                            order: arc.order.clone(),
                            weight: arc.weight.clone(),
                            preferred_label: arc.preferred_label.clone(),
                            prohibited: arc.prohibited,
                        },
                        from.clone(),
                        to.clone(),
                    ));
                }
            }
        }

        let prohibited: Vec<(String, String)> = resolved
            .iter()
            .filter(|(arc, _, _)| arc.prohibited)
            .map(|(_, from, to)| (from.clone(), to.clone()))
            .collect();
        if !prohibited.is_empty() {
            debug!(role = %link.role, count = prohibited.len(), "Prohibited arcs removed");
        }

        for (arc, from, to) in resolved {
            if prohibited.iter().any(|(f, t)| *f == from && *t == to) {
                continue;
            }
            relationships.push(Relationship {
                role: link.role.clone(),
                from,
                to,
                order: arc.order,
                weight: arc.weight,
                preferred_label: arc.preferred_label,
                sequence,
            });
            sequence += 1;
        }
    }

    debug!(relationships = relationships.len(), "Parsed linkbase");
    Ok(relationships)
}
