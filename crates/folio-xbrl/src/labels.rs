//! Label linkbase parsing.
//!
//! Labels hang off `labelArc`s from element locators to `label` resources. Each
//! resource carries a role (standard, terse, total, period start ...) and a language.

use folio_core::{FolioError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use tracing::debug;

use crate::xml::{attr, href_fragment, local_name};

/// Well-known label role URIs.
pub mod roles {
    /// Standard label.
    pub const STANDARD: &str = "http://www.xbrl.org/2003/role/label";
    /// Terse label.
    pub const TERSE: &str = "http://www.xbrl.org/2003/role/terseLabel";
    /// Verbose label.
    pub const VERBOSE: &str = "http://www.xbrl.org/2003/role/verboseLabel";
    /// Total label.
    pub const TOTAL: &str = "http://www.xbrl.org/2003/role/totalLabel";
    /// Opening balance label.
    pub const PERIOD_START: &str = "http://www.xbrl.org/2003/role/periodStartLabel";
    /// Closing balance label.
    pub const PERIOD_END: &str = "http://www.xbrl.org/2003/role/periodEndLabel";
    /// Negated label.
    pub const NEGATED: &str = "http://www.xbrl.org/2009/role/negatedLabel";

    /// Last path segment of a role, lowercased, without a `negated` prefix.
    fn base_name(role: &str) -> String {
        let name = role.rsplit('/').next().unwrap_or(role).to_ascii_lowercase();
        name.strip_prefix("negated").map(str::to_string).unwrap_or(name)
    }

    /// Returns true for roles that mark a total line.
    #[must_use]
    pub fn is_total(role: &str) -> bool {
        base_name(role).ends_with("totallabel")
    }

    /// Returns true for opening balance roles.
    #[must_use]
    pub fn is_period_start(role: &str) -> bool {
        base_name(role) == "periodstartlabel"
    }

    /// Returns true for closing balance roles.
    #[must_use]
    pub fn is_period_end(role: &str) -> bool {
        base_name(role) == "periodendlabel"
    }

    /// Returns true for roles whose values are displayed with the sign flipped.
    #[must_use]
    pub fn is_negated(role: &str) -> bool {
        role.rsplit('/')
            .next()
            .is_some_and(|name| name.to_ascii_lowercase().starts_with("negated"))
    }
}

/// Labels by element id and role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelSet {
    /// Creates an empty label set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    /// Adds a label, replacing any existing one for the same element and role.
    pub fn insert(
        &mut self,
        element_id: impl Into<String>,
        role: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.labels
            .entry(element_id.into())
            .or_default()
            .insert(role.into(), text.into());
    }

    /// Label for an element in an exact role.
    #[must_use]
    pub fn get(&self, element_id: &str, role: &str) -> Option<&str> {
        self.labels
            .get(element_id)
            .and_then(|roles| roles.get(role))
            .map(String::as_str)
    }

    /// Best label for an element.
    ///
    /// Tries the preferred role, then standard, terse and verbose, then any role.
    #[must_use]
    pub fn lookup(&self, element_id: &str, preferred: Option<&str>) -> Option<&str> {
        let by_role = self.labels.get(element_id)?;
        preferred
            .into_iter()
            .chain([roles::STANDARD, roles::TERSE, roles::VERBOSE])
            .find_map(|role| by_role.get(role))
            .or_else(|| by_role.values().next())
            .map(String::as_str)
    }

    /// Number of labelled elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no labels are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug)]
struct LabelResource {
    label: String,
    role: String,
    lang: Option<String>,
    text: String,
}

/// Parses a label linkbase.
///
/// When a role has labels in several languages, English wins; otherwise the first
/// label in document order is kept.
///
/// # Errors
/// Returns [`FolioError::Xml`] if the document is not well-formed.
pub fn parse_labels(xml: &str) -> Result<LabelSet> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locators: BTreeMap<String, String> = BTreeMap::new();
    let mut resources: Vec<LabelResource> = Vec::new();
    let mut arcs: Vec<(String, String)> = Vec::new();
    let mut current: Option<LabelResource> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FolioError::xml(
                "labels",
                format!("{e} at byte {}", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match local_name(e).as_str() {
                "loc" => {
                    if let (Some(label), Some(href)) = (attr(e, "label"), attr(e, "href"))
                        && let Some(element) = href_fragment(&href)
                    {
                        locators.insert(label, element.to_string());
                    }
                }
                "label" => {
                    let resource = LabelResource {
                        label: attr(e, "label").unwrap_or_default(),
                        role: attr(e, "role").unwrap_or_else(|| roles::STANDARD.to_string()),
                        lang: attr(e, "lang"),
                        text: String::new(),
                    };
                    if matches!(event, Event::Empty(_)) {
                        resources.push(resource);
                    } else {
                        current = Some(resource);
                    }
                }
                "labelArc" => {
                    if let (Some(from), Some(to)) = (attr(e, "from"), attr(e, "to")) {
                        arcs.push((from, to));
                    }
                }
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some(resource) = current.as_mut() {
                    let text = t.unescape().map_err(|e| FolioError::xml("labels", e))?;
                    if !resource.text.is_empty() {
                        resource.text.push(' ');
                    }
                    resource.text.push_str(text.trim());
                }
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"label"
                    && let Some(resource) = current.take()
                {
                    resources.push(resource);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut by_label: BTreeMap<&str, Vec<&LabelResource>> = BTreeMap::new();
    for resource in &resources {
        by_label.entry(resource.label.as_str()).or_default().push(resource);
    }

    let mut set = LabelSet::new();
    for (from, to) in &arcs {
        let (Some(element), Some(found)) = (locators.get(from), by_label.get(to.as_str())) else {
            continue;
        };
        for resource in found {
            let is_english = resource
                .lang
                .as_deref()
                .is_some_and(|l| l.to_ascii_lowercase().starts_with("en"));
            if set.get(element, &resource.role).is_none() || is_english {
                set.insert(element.clone(), resource.role.clone(), resource.text.clone());
            }
        }
    }

    debug!(elements = set.len(), "Parsed label linkbase");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LABELS: &str = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:xml="http://www.w3.org/XML/1998/namespace">
  <link:labelLink xlink:type="extended" xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:type="locator" xlink:href="us-gaap.xsd#us-gaap_Assets" xlink:label="loc_Assets"/>
    <link:label xlink:type="resource" xlink:label="lab_Assets" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="de">Vermögenswerte</link:label>
    <link:label xlink:type="resource" xlink:label="lab_Assets" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en-US">Assets</link:label>
    <link:label xlink:type="resource" xlink:label="lab_Assets" xlink:role="http://www.xbrl.org/2003/role/totalLabel" xml:lang="en-US">Total assets</link:label>
    <link:labelArc xlink:type="arc" xlink:from="loc_Assets" xlink:to="lab_Assets"/>
    <link:loc xlink:type="locator" xlink:href="us-gaap.xsd#us-gaap_Cash" xlink:label="loc_Cash"/>
    <link:label xlink:type="resource" xlink:label="lab_Cash" xlink:role="http://www.xbrl.org/2003/role/terseLabel" xml:lang="en-US">Cash &amp; equivalents</link:label>
    <link:labelArc xlink:type="arc" xlink:from="loc_Cash" xlink:to="lab_Cash"/>
  </link:labelLink>
</link:linkbase>"#;

    #[test]
    fn test_english_preferred() {
        let labels = parse_labels(LABELS).unwrap();
        assert_eq!(labels.get("us-gaap_Assets", roles::STANDARD), Some("Assets"));
        assert_eq!(
            labels.lookup("us-gaap_Assets", Some(roles::TOTAL)),
            Some("Total assets")
        );
    }

    #[test]
    fn test_lookup_fallback_chain() {
        let labels = parse_labels(LABELS).unwrap();
        assert_eq!(
            labels.lookup("us-gaap_Cash", Some(roles::PERIOD_END)),
            Some("Cash & equivalents")
        );
        assert_eq!(labels.lookup("us-gaap_Unknown", None), None);
    }

    #[rstest]
    #[case(roles::TOTAL, true, false, false, false)]
    #[case(roles::PERIOD_START, false, true, false, false)]
    #[case(roles::PERIOD_END, false, false, true, false)]
    #[case(roles::NEGATED, false, false, false, true)]
    #[case(roles::STANDARD, false, false, false, false)]
    #[case("http://www.xbrl.org/2009/role/negatedTotalLabel", true, false, false, true)]
    #[case("http://www.xbrl.org/2009/role/negatedPeriodStartLabel", false, true, false, true)]
    #[case("http://www.xbrl.org/2009/role/netTotalLabel", true, false, false, false)]
    fn test_role_predicates(
        #[case] role: &str,
        #[case] total: bool,
        #[case] start: bool,
        #[case] end: bool,
        #[case] negated: bool,
    ) {
        assert_eq!(roles::is_total(role), total);
        assert_eq!(roles::is_period_start(role), start);
        assert_eq!(roles::is_period_end(role), end);
        assert_eq!(roles::is_negated(role), negated);
    }
}
