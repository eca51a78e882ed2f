//! Calculation and presentation trees.
//!
//! Parsed relationships are grouped by role and turned into one [`LinkbaseTree`] per
//! role. Children are stored as edges rather than bare element ids because a
//! presentation tree may list the same concept twice under one parent (opening and
//! closing balances of a roll-forward), distinguished only by preferred label.

use folio_core::types::local_name;
use folio_core::{BalanceType, ElementCatalog};
use folio_xbrl::Relationship;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, warn};

/// Which linkbase a tree was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Summation relationships with weights.
    Calculation,
    /// Display hierarchy with preferred labels.
    Presentation,
}

/// Structural role of an element inside a presentation tree.
///
/// Dimensional hypercubes embed tables, axes, domains and members in the same tree as
/// line items. Only line items and headings are statement rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// An ordinary concept.
    LineItem,
    /// Hypercube (`...Table`).
    Table,
    /// Line-item container of a hypercube (`...LineItems`).
    LineItems,
    /// Dimension axis (`...Axis`).
    Axis,
    /// Axis domain (`...Domain`).
    Domain,
    /// Axis member (`...Member`).
    Member,
}

impl NodeKind {
    /// Classifies an element id by its naming convention.
    #[must_use]
    pub fn of(element_id: &str) -> Self {
        let name = local_name(element_id);
        if name.ends_with("LineItems") {
            Self::LineItems
        } else if name.ends_with("Table") {
            Self::Table
        } else if name.ends_with("Axis") {
            Self::Axis
        } else if name.ends_with("Domain") {
            Self::Domain
        } else if name.ends_with("Member") {
            Self::Member
        } else {
            Self::LineItem
        }
    }

    /// Scaffolding nodes are walked through but never rendered.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        matches!(self, Self::Table | Self::LineItems)
    }

    /// Dimensional nodes are skipped together with their subtrees.
    #[must_use]
    pub const fn is_dimensional(&self) -> bool {
        matches!(self, Self::Axis | Self::Domain | Self::Member)
    }
}

/// An arc from a parent to one child, in sibling order.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildEdge {
    /// Child element id.
    pub element_id: String,
    /// Sibling order.
    pub order: f64,
    /// Calculation weight.
    pub weight: Option<f64>,
    /// Preferred label role.
    pub preferred_label: Option<String>,
}

/// One element in a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkbaseNode {
    /// Element id.
    pub element_id: String,
    /// Parent element id; `None` only for roots.
    pub parent: Option<String>,
    /// Outgoing edges in sibling order.
    pub children: Vec<ChildEdge>,
    /// Order under the parent; zero for roots.
    pub order: f64,
    /// Weight under the parent (calculation trees).
    pub weight: Option<f64>,
    /// Normal balance from the element catalog.
    pub balance_type: BalanceType,
    /// Preferred label role on the arc that introduced this node.
    pub preferred_label: Option<String>,
    /// Abstract elements never carry values.
    pub is_abstract: bool,
    /// Distance from the root.
    pub depth: usize,
}

/// One tree per (role, kind).
#[derive(Clone, Debug, PartialEq)]
pub struct LinkbaseTree {
    /// Extended link role URI.
    pub role: String,
    /// Linkbase the tree came from.
    pub kind: TreeKind,
    /// Nodes by element id.
    pub nodes: BTreeMap<String, LinkbaseNode>,
    /// Root element ids, sorted.
    pub roots: Vec<String>,
}

impl LinkbaseTree {
    /// Node for an element.
    #[must_use]
    pub fn node(&self, element_id: &str) -> Option<&LinkbaseNode> {
        self.nodes.get(element_id)
    }

    /// Children of an element in sibling order; empty for leaves and unknown elements.
    #[must_use]
    pub fn children(&self, element_id: &str) -> &[ChildEdge] {
        self.nodes
            .get(element_id)
            .map_or(&[], |n| n.children.as_slice())
    }

    /// Returns true if the element appears in the tree.
    #[must_use]
    pub fn contains(&self, element_id: &str) -> bool {
        self.nodes.contains_key(element_id)
    }

    /// Number of line-item nodes that can carry values.
    #[must_use]
    pub fn non_abstract_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| !n.is_abstract && NodeKind::of(&n.element_id) == NodeKind::LineItem)
            .count()
    }

    /// Line-item concepts that can carry values, sorted.
    pub fn value_concepts(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .values()
            .filter(|n| !n.is_abstract && NodeKind::of(&n.element_id) == NodeKind::LineItem)
            .map(|n| n.element_id.as_str())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug)]
struct PendingEdge {
    edge: ChildEdge,
    has_order: bool,
    sequence: usize,
}

fn parse_order(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|o| o.trim().parse::<f64>().ok())
        .filter(|o| o.is_finite() && *o >= 0.0)
}

fn parse_weight(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|w| w.trim().parse::<f64>().ok())
        .filter(|w| w.is_finite())
}

/// Builds one tree per role from parsed relationships.
///
/// Malformed arcs are logged and skipped: self loops, calculation arcs without a
/// numeric weight and duplicates of an earlier arc. Siblings are ordered by `order`;
/// if any sibling lacks a usable order the whole sibling group falls back to
/// document order.
#[must_use]
pub fn build_trees(
    relationships: &[Relationship],
    kind: TreeKind,
    catalog: &ElementCatalog,
) -> BTreeMap<String, LinkbaseTree> {
    let mut by_role: BTreeMap<&str, Vec<&Relationship>> = BTreeMap::new();
    for rel in relationships {
        by_role.entry(rel.role.as_str()).or_default().push(rel);
    }

    by_role
        .into_iter()
        .filter_map(|(role, mut rels)| {
            rels.sort_by_key(|r| r.sequence);
            let tree = build_tree(role, &rels, kind, catalog);
            if tree.is_empty() {
                warn!(role, "Role has no usable arcs");
                None
            } else {
                Some((role.to_string(), tree))
            }
        })
        .collect()
}

fn build_tree(
    role: &str,
    rels: &[&Relationship],
    kind: TreeKind,
    catalog: &ElementCatalog,
) -> LinkbaseTree {
    let mut edges: BTreeMap<&str, Vec<PendingEdge>> = BTreeMap::new();
    let mut seen: BTreeSet<(&str, &str, Option<&str>)> = BTreeSet::new();
    let mut froms: BTreeSet<&str> = BTreeSet::new();
    let mut tos: BTreeSet<&str> = BTreeSet::new();

    for rel in rels {
        if rel.from == rel.to {
            warn!(role, element = %rel.from, "Self-referencing arc skipped");
            continue;
        }
        let weight = match kind {
            TreeKind::Calculation => match parse_weight(rel.weight.as_deref()) {
                Some(w) => Some(w),
                None => {
                    warn!(role, from = %rel.from, to = %rel.to, weight = ?rel.weight, "Calculation arc without numeric weight skipped");
                    continue;
                }
            },
            TreeKind::Presentation => None,
        };
        let label_key = match kind {
            TreeKind::Calculation => None,
            TreeKind::Presentation => rel.preferred_label.as_deref(),
        };
        if !seen.insert((rel.from.as_str(), rel.to.as_str(), label_key)) {
            debug!(role, from = %rel.from, to = %rel.to, "Duplicate arc skipped");
            continue;
        }

        let order = parse_order(rel.order.as_deref());
        if order.is_none() && rel.order.is_some() {
            warn!(role, from = %rel.from, to = %rel.to, order = ?rel.order, "Unusable arc order, using document order");
        }
        froms.insert(rel.from.as_str());
        tos.insert(rel.to.as_str());
        edges.entry(rel.from.as_str()).or_default().push(PendingEdge {
            edge: ChildEdge {
                element_id: rel.to.clone(),
                order: order.unwrap_or(0.0),
                weight,
                preferred_label: rel.preferred_label.clone(),
            },
            has_order: order.is_some(),
            sequence: rel.sequence,
        });
    }

    let mut children: BTreeMap<&str, Vec<ChildEdge>> = BTreeMap::new();
    for (from, mut group) in edges {
        if group.iter().all(|e| e.has_order) {
            group.sort_by(|a, b| {
                a.edge
                    .order
                    .total_cmp(&b.edge.order)
                    .then(a.sequence.cmp(&b.sequence))
            });
        } else {
            group.sort_by_key(|e| e.sequence);
        }
        children.insert(from, group.into_iter().map(|e| e.edge).collect());
    }

    // BTreeSet difference is already sorted.
    let roots: Vec<String> = froms.difference(&tos).map(|r| (*r).to_string()).collect();

    let mut nodes: BTreeMap<String, LinkbaseNode> = BTreeMap::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    for root in &roots {
        nodes.insert(
            root.clone(),
            new_node(root, None, 0.0, None, None, 0, catalog),
        );
        queue.push_back(root.clone());
    }

    while let Some(id) = queue.pop_front() {
        let Some(edges) = children.get(id.as_str()) else {
            continue;
        };
        let depth = nodes.get(&id).map_or(0, |n| n.depth);
        for edge in edges {
            if nodes.contains_key(&edge.element_id) {
                continue;
            }
            nodes.insert(
                edge.element_id.clone(),
                new_node(
                    &edge.element_id,
                    Some(id.clone()),
                    edge.order,
                    edge.weight,
                    edge.preferred_label.clone(),
                    depth + 1,
                    catalog,
                ),
            );
            queue.push_back(edge.element_id.clone());
        }
        if let Some(node) = nodes.get_mut(&id) {
            node.children = edges.clone();
        }
    }

    let unreachable = froms.iter().filter(|f| !nodes.contains_key(**f)).count();
    if unreachable > 0 {
        warn!(role, unreachable, "Arcs in a cycle without a root were dropped");
    }

    LinkbaseTree {
        role: role.to_string(),
        kind,
        nodes,
        roots,
    }
}

fn new_node(
    element_id: &str,
    parent: Option<String>,
    order: f64,
    weight: Option<f64>,
    preferred_label: Option<String>,
    depth: usize,
    catalog: &ElementCatalog,
) -> LinkbaseNode {
    LinkbaseNode {
        element_id: element_id.to_string(),
        parent,
        children: Vec::new(),
        order,
        weight,
        balance_type: catalog.balance_type(element_id),
        preferred_label,
        is_abstract: catalog.is_abstract(element_id),
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(role: &str, from: &str, to: &str, order: Option<&str>, seq: usize) -> Relationship {
        Relationship {
            role: role.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            order: order.map(str::to_string),
            weight: Some("1".to_string()),
            preferred_label: None,
            sequence: seq,
        }
    }

    #[test]
    fn test_roots_depth_and_order() {
        let rels = vec![
            rel("r", "a_Root", "a_B", Some("2"), 0),
            rel("r", "a_Root", "a_A", Some("1"), 1),
            rel("r", "a_A", "a_A1", Some("1"), 2),
        ];
        let trees = build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new());
        let tree = &trees["r"];

        assert_eq!(tree.roots, vec!["a_Root".to_string()]);
        let root = tree.node("a_Root").unwrap();
        assert_eq!(root.order, 0.0);
        assert_eq!(root.parent, None);

        let ids: Vec<&str> = tree
            .children("a_Root")
            .iter()
            .map(|e| e.element_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a_A", "a_B"]);
        assert_eq!(tree.node("a_A1").unwrap().depth, 2);
        assert_eq!(tree.node("a_A1").unwrap().parent.as_deref(), Some("a_A"));
    }

    #[test]
    fn test_unusable_order_falls_back_to_document_order() {
        let rels = vec![
            rel("r", "a_Root", "a_First", Some("9"), 0),
            rel("r", "a_Root", "a_Second", Some("n/a"), 1),
            rel("r", "a_Root", "a_Third", Some("1"), 2),
        ];
        let trees = build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new());
        let ids: Vec<&str> = trees["r"]
            .children("a_Root")
            .iter()
            .map(|e| e.element_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a_First", "a_Second", "a_Third"]);
    }

    #[test]
    fn test_bad_weight_and_self_loop_skipped() {
        let mut bad = rel("r", "a_Total", "a_Part2", Some("2"), 1);
        bad.weight = Some("heavy".to_string());
        let rels = vec![
            rel("r", "a_Total", "a_Part1", Some("1"), 0),
            bad,
            rel("r", "a_Total", "a_Total", Some("3"), 2),
        ];
        let trees = build_trees(&rels, TreeKind::Calculation, &ElementCatalog::new());
        let tree = &trees["r"];
        assert_eq!(tree.children("a_Total").len(), 1);
        assert_eq!(tree.children("a_Total")[0].weight, Some(1.0));
        assert!(!tree.contains("a_Part2"));
    }

    #[test]
    fn test_repeated_concept_with_distinct_labels() {
        let mut start = rel("r", "a_Root", "a_Equity", Some("1"), 0);
        start.preferred_label = Some("periodStartLabel".to_string());
        let mid = rel("r", "a_Root", "a_NetIncome", Some("2"), 1);
        let mut end = rel("r", "a_Root", "a_Equity", Some("3"), 2);
        end.preferred_label = Some("periodEndLabel".to_string());

        let trees = build_trees(&[start, mid, end], TreeKind::Presentation, &ElementCatalog::new());
        let children = trees["r"].children("a_Root");
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].element_id, "a_Equity");
        assert_eq!(children[2].element_id, "a_Equity");
        assert_ne!(children[0].preferred_label, children[2].preferred_label);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        let rels = vec![
            rel("r", "a_Root", "a_X", Some("1"), 0),
            rel("r", "a_X", "a_Y", Some("1"), 1),
            rel("r", "a_Y", "a_X", Some("1"), 2),
        ];
        let trees = build_trees(&rels, TreeKind::Presentation, &ElementCatalog::new());
        let tree = &trees["r"];
        assert_eq!(tree.roots, vec!["a_Root".to_string()]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node("a_Y").unwrap().depth, 2);
    }

    #[test]
    fn test_node_kinds() {
        assert_eq!(NodeKind::of("us-gaap_StatementTable"), NodeKind::Table);
        assert_eq!(NodeKind::of("us-gaap_StatementLineItems"), NodeKind::LineItems);
        assert_eq!(NodeKind::of("srt_ProductOrServiceAxis"), NodeKind::Axis);
        assert_eq!(NodeKind::of("us-gaap_Assets"), NodeKind::LineItem);
        assert!(NodeKind::Table.is_transparent());
        assert!(NodeKind::Member.is_dimensional());
    }
}
