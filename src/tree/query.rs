//! Selector matching and subtree queries

use std::fmt;

use regex::Regex;

use super::node::{FieldValue, KindCategory, Node, NodeKind};
use super::{NodeId, Tree};

/// Restricts a selector to one kind or a family of kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Exact(NodeKind),
    Category(KindCategory),
}

impl KindFilter {
    pub fn matches(&self, kind: NodeKind) -> bool {
        match self {
            KindFilter::Exact(expected) => *expected == kind,
            KindFilter::Category(category) => kind.category() == Some(*category),
        }
    }
}

impl From<NodeKind> for KindFilter {
    fn from(kind: NodeKind) -> Self {
        KindFilter::Exact(kind)
    }
}

impl From<KindCategory> for KindFilter {
    fn from(category: KindCategory) -> Self {
        KindFilter::Category(category)
    }
}

/// Condition on the value of one node field
pub enum FieldFilter {
    Equals(FieldValue<'static>),
    /// Only string fields can match a pattern
    Pattern(Regex),
    Predicate(Box<dyn Fn(&FieldValue<'_>) -> bool>),
}

impl FieldFilter {
    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        match self {
            FieldFilter::Equals(expected) => expected == value,
            FieldFilter::Pattern(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
            FieldFilter::Predicate(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFilter::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            FieldFilter::Pattern(pattern) => {
                f.debug_tuple("Pattern").field(&pattern.as_str()).finish()
            }
            FieldFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A conjunctive node filter.
///
/// An empty selector matches every node.
///
/// ```
/// use figdom::tree::{NodeKind, Selector};
///
/// let selector = Selector::new()
///     .kind(NodeKind::Text)
///     .regex("name", "^Title")
///     .unwrap();
/// # let _ = selector;
/// ```
#[derive(Debug, Default)]
pub struct Selector {
    kind: Option<KindFilter>,
    fields: Vec<(String, FieldFilter)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<KindFilter>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Require `field` to equal `value`
    pub fn field(mut self, field: impl Into<String>, value: impl Into<FieldValue<'static>>) -> Self {
        self.fields
            .push((field.into(), FieldFilter::Equals(value.into())));
        self
    }

    /// Require string field `field` to match `pattern`
    pub fn regex(mut self, field: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        self.fields.push((field.into(), FieldFilter::Pattern(pattern)));
        Ok(self)
    }

    pub fn predicate<F>(mut self, field: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldValue<'_>) -> bool + 'static,
    {
        self.fields
            .push((field.into(), FieldFilter::Predicate(Box::new(predicate))));
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        if let Some(kind) = &self.kind {
            if !kind.matches(node.kind) {
                return false;
            }
        }
        self.fields.iter().all(|(name, filter)| {
            node.field(name)
                .is_some_and(|value| filter.matches(&value))
        })
    }
}

impl Node {
    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }
}

/// Pre-order walk over the subtree below a root, root excluded
#[derive(Debug, Clone)]
pub struct Descendants<'t> {
    tree: &'t Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl<'t> Descendants<'t> {
    pub(super) fn new(tree: &'t Tree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            next: tree.first_child(root),
        }
    }

    fn successor(&self, current: NodeId) -> Option<NodeId> {
        if let Some(child) = self.tree.first_child(current) {
            return Some(child);
        }
        let mut node = current;
        while node != self.root {
            if let Some(sibling) = self.tree.next_sibling(node) {
                return Some(sibling);
            }
            node = self.tree.parent(node)?;
        }
        None
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.successor(current);
        Some(current)
    }
}

/// Query result that stays lazy until it is indexed or measured.
///
/// Iterating an unmaterialized list walks the tree live. `len`, `item` and
/// `as_slice` freeze the remaining results into a snapshot. Iterating a
/// snapshot leaves it intact.
pub struct NodeList<I> {
    source: Option<I>,
    nodes: Option<Vec<NodeId>>,
    cursor: usize,
}

impl<I: Iterator<Item = NodeId>> NodeList<I> {
    pub fn new(source: I) -> Self {
        Self {
            source: Some(source),
            nodes: None,
            cursor: 0,
        }
    }

    fn materialize(&mut self) -> &mut Vec<NodeId> {
        let source = &mut self.source;
        self.nodes
            .get_or_insert_with(|| source.take().map(Iterator::collect).unwrap_or_default())
    }

    pub fn len(&mut self) -> usize {
        self.materialize().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn item(&mut self, index: usize) -> Option<NodeId> {
        self.materialize().get(index).copied()
    }

    pub fn as_slice(&mut self) -> &[NodeId] {
        self.materialize()
    }

    pub fn into_vec(mut self) -> Vec<NodeId> {
        std::mem::take(self.materialize())
    }

    pub fn is_materialized(&self) -> bool {
        self.nodes.is_some()
    }
}

impl<I: Iterator<Item = NodeId>> Iterator for NodeList<I> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match &self.nodes {
            Some(nodes) => {
                let next = nodes.get(self.cursor).copied();
                if next.is_some() {
                    self.cursor += 1;
                }
                next
            }
            None => self.source.as_mut()?.next(),
        }
    }
}

impl<I> fmt::Debug for NodeList<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeList")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

/// Lazy matches of a selector below a root
pub type QueryIter<'t, 's> = std::iter::Filter<Descendants<'t>, Box<dyn FnMut(&NodeId) -> bool + 's>>;

impl Tree {
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.get(id).is_some_and(|node| selector.matches(node))
    }

    /// Every match below `root` in document order
    pub fn query_selector_all<'t, 's>(
        &'t self,
        root: NodeId,
        selector: &'s Selector,
    ) -> NodeList<QueryIter<'t, 's>>
    where
        't: 's,
    {
        let filter: Box<dyn FnMut(&NodeId) -> bool + 's> =
            Box::new(move |id: &NodeId| selector.matches(&self[*id]));
        NodeList::new(self.descendants(root).filter(filter))
    }

    /// First match below `root`
    pub fn query_selector(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root).find(|id| selector.matches(&self[*id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{NodePayload, TextProps};

    /// root
    /// ├── a (frame)
    /// │   ├── a1 (text "Title")
    /// │   └── a2 (rectangle)
    /// └── b (frame, clips)
    ///     └── b1 (text "Body")
    fn sample_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.create(Node::new("0:0", "root", NodeKind::Document));

        let a = tree.create(Node::new("1:1", "a", NodeKind::Frame));
        let a1 = tree.create(text_node("1:2", "a1", "Title"));
        let a2 = tree.create(Node::new("1:3", "a2", NodeKind::Rectangle));
        let mut b_node = Node::new("1:4", "b", NodeKind::Frame);
        if let NodePayload::Frame(frame) = &mut b_node.payload {
            frame.clips_content = true;
        }
        let b = tree.create(b_node);
        let b1 = tree.create(text_node("1:5", "b1", "Body"));

        tree.append_child(root, a);
        tree.append_child(a, a1);
        tree.append_child(a, a2);
        tree.append_child(root, b);
        tree.append_child(b, b1);
        (tree, root)
    }

    fn text_node(id: &str, name: &str, characters: &str) -> Node {
        Node::new(id, name, NodeKind::Text).with_payload(NodePayload::Text(TextProps {
            characters: characters.to_string(),
            ..TextProps::default()
        }))
    }

    fn names(tree: &Tree, ids: impl IntoIterator<Item = NodeId>) -> Vec<String> {
        ids.into_iter().map(|id| tree[id].name.clone()).collect()
    }

    #[test]
    fn test_empty_selector_visits_every_descendant_in_pre_order() {
        let (tree, root) = sample_tree();
        let all = tree.query_selector_all(root, &Selector::new()).into_vec();
        assert_eq!(names(&tree, all), ["a", "a1", "a2", "b", "b1"]);
    }

    #[test]
    fn test_descendants_of_inner_node_stay_in_subtree() {
        let (tree, root) = sample_tree();
        let a = tree.first_child(root).unwrap();
        assert_eq!(names(&tree, tree.descendants(a)), ["a1", "a2"]);
    }

    #[test]
    fn test_kind_and_category_filters() {
        let (tree, root) = sample_tree();
        let texts = tree
            .query_selector_all(root, &Selector::new().kind(NodeKind::Text))
            .into_vec();
        assert_eq!(names(&tree, texts), ["a1", "b1"]);

        let shapes = tree
            .query_selector_all(root, &Selector::new().kind(KindCategory::VectorLike))
            .into_vec();
        assert_eq!(names(&tree, shapes), ["a1", "a2", "b1"]);
    }

    #[test]
    fn test_field_filters_are_conjunctive() {
        let (tree, root) = sample_tree();
        let selector = Selector::new()
            .kind(NodeKind::Frame)
            .field("clipsContent", true)
            .field("name", "b");
        assert_eq!(names(&tree, tree.query_selector(root, &selector)), ["b"]);

        let none = Selector::new().field("clipsContent", true).field("name", "a");
        assert_eq!(tree.query_selector(root, &none), None);
    }

    #[test]
    fn test_regex_never_matches_non_string_field() {
        let (tree, root) = sample_tree();
        let selector = Selector::new().regex("clipsContent", ".*").unwrap();
        assert!(tree.query_selector_all(root, &selector).is_empty());

        let selector = Selector::new().regex("characters", "^T").unwrap();
        let found = tree.query_selector_all(root, &selector).into_vec();
        assert_eq!(names(&tree, found), ["a1"]);
    }

    #[test]
    fn test_missing_field_is_a_non_match() {
        let (tree, root) = sample_tree();
        let selector = Selector::new().predicate("characters", |_| true);
        let found = tree.query_selector_all(root, &selector).into_vec();
        assert_eq!(names(&tree, found), ["a1", "b1"]);
    }

    #[test]
    fn test_node_list_materializes_on_len() {
        let (mut tree, root) = sample_tree();
        let selector = Selector::new();
        let mut list = tree.query_selector_all(root, &selector);
        assert!(!list.is_materialized());
        assert_eq!(list.len(), 5);
        assert!(list.is_materialized());
        let snapshot = list.into_vec();

        let last = tree.last_child(root).unwrap();
        tree.remove(last);
        assert_eq!(snapshot.len(), 5);
        assert_eq!(tree.query_selector_all(root, &Selector::new()).len(), 3);
    }

    #[test]
    fn test_node_list_item_and_iteration() {
        let (tree, root) = sample_tree();
        let selector = Selector::new().kind(NodeKind::Text);
        let mut list = tree.query_selector_all(root, &selector);
        assert_eq!(list.item(1).map(|id| tree[id].name.as_str()), Some("b1"));
        assert_eq!(list.item(7), None);
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn test_iterating_a_snapshot_keeps_it() {
        let (tree, root) = sample_tree();
        let selector = Selector::new().kind(NodeKind::Text);
        let mut list = tree.query_selector_all(root, &selector);
        assert_eq!(list.len(), 2);

        let iterated: Vec<NodeId> = (&mut list).collect();
        assert_eq!(iterated.len(), 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.item(0), Some(iterated[0]));
        assert_eq!(list.as_slice(), iterated.as_slice());
        assert_eq!(list.next(), None);
    }
}
