//! Arena-backed document tree
//!
//! Nodes live in a single arena and refer to each other through [`NodeId`]
//! handles. Parent, child and sibling links are stored per slot, which keeps
//! insertion and removal O(1) without reference cycles.

pub mod node;
pub mod query;

use std::ops::{Index, IndexMut};

pub use node::{
    BoundingBox, CanvasProps, FieldValue, FrameProps, Geometry, KindCategory, Node, NodeKind,
    NodePayload, SliceProps, TextProps, TypeStyle, VectorProps, WindingRule,
};
pub use query::{Descendants, FieldFilter, KindFilter, NodeList, Selector};

/// Stable handle to a node in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Links {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    previous_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    links: Links,
}

/// An arena of nodes with doubly-linked sibling chains
#[derive(Debug, Clone, Default)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node to the arena
    pub fn create(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node,
            links: Links::default(),
        });
        id
    }

    /// Number of nodes in the arena, attached or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].links.parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].links.first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].links.last_child
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].links.previous_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].links.next_sibling
    }

    /// Topmost ancestor of `id` (itself when detached)
    pub fn root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Append `node` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) {
        let after = self.last_child(parent);
        self.insert_after(parent, node, after);
    }

    /// Insert `node` under `parent` immediately after `after`.
    ///
    /// `None` inserts at the front of the child list. A node that is already
    /// attached somewhere is detached first. `after` must be a child of
    /// `parent` and `parent` must not be inside `node`'s subtree.
    pub fn insert_after(&mut self, parent: NodeId, node: NodeId, after: Option<NodeId>) {
        debug_assert!(
            !self.is_ancestor_or_self(node, parent),
            "cannot insert a node beneath itself"
        );
        debug_assert!(
            after.map_or(true, |a| self.parent(a) == Some(parent)),
            "insertion point is not a child of the parent"
        );

        if self.slots[node.0].links.parent.is_some() {
            self.remove(node);
        }

        let next = match after {
            Some(after) => self.next_sibling(after),
            None => self.first_child(parent),
        };

        {
            let links = &mut self.slots[node.0].links;
            links.parent = Some(parent);
            links.previous_sibling = after;
            links.next_sibling = next;
        }

        match after {
            Some(after) => self.slots[after.0].links.next_sibling = Some(node),
            None => self.slots[parent.0].links.first_child = Some(node),
        }
        match next {
            Some(next) => self.slots[next.0].links.previous_sibling = Some(node),
            None => self.slots[parent.0].links.last_child = Some(node),
        }
    }

    /// Detach `node` from its parent and siblings.
    ///
    /// The node's own children stay attached to it.
    pub fn remove(&mut self, node: NodeId) {
        let Links {
            parent,
            previous_sibling,
            next_sibling,
            ..
        } = self.slots[node.0].links;

        if let Some(parent) = parent {
            let parent_links = &mut self.slots[parent.0].links;
            if parent_links.first_child == Some(node) {
                parent_links.first_child = next_sibling;
            }
            if parent_links.last_child == Some(node) {
                parent_links.last_child = previous_sibling;
            }
        }
        if let Some(previous) = previous_sibling {
            self.slots[previous.0].links.next_sibling = next_sibling;
        }
        if let Some(next) = next_sibling {
            self.slots[next.0].links.previous_sibling = previous_sibling;
        }

        let links = &mut self.slots[node.0].links;
        links.parent = None;
        links.previous_sibling = None;
        links.next_sibling = None;
    }

    /// Direct children of `id`, walked through the sibling chain
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Every node below `root` in depth-first pre-order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.slots[id.0].node
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.slots[id.0].node
    }
}

/// Iterator over the direct children of a node
#[derive(Debug, Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}
