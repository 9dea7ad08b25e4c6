//! Arena-based tree handed to the diff engine.
//!
//! All nodes live in one `indextree` arena. Parents and children are arena
//! links, so back-references never own anything. Once the builder hands the
//! tree over it is only read.

use std::fmt::Write;

use compact_str::CompactString;
use facet::Facet;
use indextree::{Arena, NodeId};

/// Position of a node in construction order.
pub type OrderIndex = u32;

/// Number of nodes in a subtree.
pub type Count = u32;

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum NodeKind {
    /// Sentinel parent of the document element, one per tree.
    Root,
    Element,
    /// Synthetic node carrying an attribute's name. Owns exactly one
    /// [`NodeKind::AttributeValue`].
    AttributeName,
    AttributeValue,
    Text,
    Comment,
}

/// What goes in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct NodeData {
    pub kind: NodeKind,

    /// Structural label: the tag for elements, `@key` / `@keyName` for the
    /// attribute pair, `text()` or `comment()` for character data.
    pub name: CompactString,

    /// Payload: the tag again for elements, attribute key or value, text or
    /// comment content.
    pub value: CompactString,

    /// Construction order. The root is 0, every other node gets the next
    /// value of a counter that starts at 1.
    pub created_at: OrderIndex,

    /// Set when an element closes (itself plus every node created while it
    /// was open) and on the root when the tree is finished (every node
    /// created during the parse). `None` everywhere else.
    pub subtree_size: Option<Count>,

    /// Occurrence count of this node's path key when it was created. 0 for
    /// the root and attribute nodes, which are never counted.
    pub sibling_index: u32,
}

impl NodeData {
    pub(crate) fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            name: CompactString::from("/"),
            value: CompactString::default(),
            created_at: 0,
            subtree_size: None,
            sibling_index: 0,
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}

/// The finished tree.
#[derive(Debug, Clone)]
pub struct Tree {
    /// THE tree - all nodes live here
    pub arena: Arena<NodeData>,

    /// Root sentinel; the document element is its element child.
    pub root: NodeId,
}

impl Tree {
    /// Get immutable reference to node data
    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// Iterate children of a node in document order
    pub fn children(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// The node and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// The document element, if any element was ever opened.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root).find(|&id| self.get(id).is_element())
    }

    /// Children of a node without its attribute nodes.
    pub fn content_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|&child| self.get(child).kind != NodeKind::AttributeName)
    }

    /// `(name, value)` pairs of an element's attributes, in tree order.
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.children(id)
            .filter(|&child| self.get(child).kind == NodeKind::AttributeName)
            .filter_map(|name_node| {
                let value_node = self.children(name_node).next()?;
                Some((
                    self.get(name_node).value.as_str(),
                    self.get(value_node).value.as_str(),
                ))
            })
            .collect()
    }

    /// Positional address of a node, stable across parses of equivalent
    /// documents: `/doc[1]/item[2]/text()[1]`, `/doc[1]/@id`.
    ///
    /// Attribute values share the address of their attribute name node.
    pub fn xpath(&self, id: NodeId) -> String {
        let chain: Vec<NodeId> = id.ancestors(&self.arena).collect();
        let mut out = String::new();
        for &node in chain.iter().rev() {
            let data = self.get(node);
            let _ = match data.kind {
                NodeKind::Root | NodeKind::AttributeValue => Ok(()),
                NodeKind::AttributeName => write!(out, "/@{}", data.value),
                _ => write!(out, "/{}[{}]", data.name, data.sibling_index),
            };
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Compare shape, kinds, names and values with another tree.
    ///
    /// Document-order stamps, subtree sizes and sibling indices are not
    /// looked at.
    pub fn same_structure(&self, other: &Tree) -> bool {
        let mut left = self.descendants(self.root);
        let mut right = other.descendants(other.root);
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    let (da, db) = (self.get(a), other.get(b));
                    if da.kind != db.kind || da.name != db.name || da.value != db.value {
                        return false;
                    }
                    // Equal pre-order sequences only mean equal trees when
                    // every node also has the same number of children.
                    if self.children(a).count() != other.children(b).count() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}
