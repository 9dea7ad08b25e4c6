//! Event-driven tree construction.
//!
//! [`TreeBuilder`] receives parse events through [`ContentHandler`] and grows
//! an arena tree. While an element is open its positional address (the live
//! path, e.g. `/doc[1]/item[3]`) is kept as a string; path keys derived from
//! it feed the [`PathCounter`] that hands out sibling indices.

use std::borrow::Cow;
use std::fmt::Write;

use compact_str::{CompactString, format_compact};
use facet::Facet;
use indextree::{Arena, NodeId};
use smallvec::SmallVec;

use crate::handler::{ContentHandler, LexicalHandler, NsName};
use crate::namespace::NamespaceResolver;
use crate::path_counter::PathCounter;
use crate::tree::{NodeData, NodeKind, OrderIndex, Tree};
use crate::{debug, trace};

/// Options fixed when the builder is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct BuildOptions {
    /// Collapse whitespace runs in text and comments to one space and trim
    /// both ends (default: false).
    pub normalize_space: bool,
    /// Keep comments as nodes (default: false). Dropped comments leave no
    /// trace at all, not even in the path counters.
    pub include_comments: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_space(mut self) -> Self {
        self.normalize_space = true;
        self
    }

    pub fn include_comments(mut self) -> Self {
        self.include_comments = true;
        self
    }
}

/// Builds a [`Tree`] from parse events.
#[derive(Debug)]
pub struct TreeBuilder {
    arena: Arena<NodeData>,
    root: NodeId,

    /// Open elements, innermost last, each with the `live_path` length
    /// before its segment was added. Empty means the root is current.
    open: SmallVec<[(NodeId, usize); 16]>,

    /// Address of the innermost open element.
    live_path: String,

    /// Last document-order stamp handed out.
    counter: OrderIndex,

    paths: PathCounter,
    namespaces: NamespaceResolver,
    options: BuildOptions,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl TreeBuilder {
    pub fn new(options: BuildOptions) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::root());
        TreeBuilder {
            arena,
            root,
            open: SmallVec::new(),
            live_path: String::new(),
            counter: 0,
            paths: PathCounter::new(),
            namespaces: NamespaceResolver::new(),
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Address of the innermost open element, empty at the top level.
    pub fn live_path(&self) -> &str {
        &self.live_path
    }

    /// Nodes created so far, root excluded.
    pub fn node_count(&self) -> OrderIndex {
        self.counter
    }

    pub fn path_counter(&self) -> &PathCounter {
        &self.paths
    }

    pub fn namespaces(&self) -> &NamespaceResolver {
        &self.namespaces
    }

    /// Finish the parse: stamp the root with the total node count and hand
    /// the tree over.
    ///
    /// Elements still open keep `subtree_size: None`.
    pub fn finish(mut self) -> Tree {
        self.arena[self.root].get_mut().subtree_size = Some(self.counter);
        debug!(
            nodes = self.counter,
            paths = self.paths.len(),
            unclosed = self.depth(),
            "tree finished"
        );
        Tree {
            arena: self.arena,
            root: self.root,
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().map_or(self.root, |&(element, _)| element)
    }

    fn new_node(
        &mut self,
        kind: NodeKind,
        name: &str,
        value: &str,
        sibling_index: u32,
    ) -> NodeId {
        self.counter += 1;
        self.arena.new_node(NodeData {
            kind,
            name: CompactString::from(name),
            value: CompactString::from(value),
            created_at: self.counter,
            subtree_size: None,
            sibling_index,
        })
    }

    /// Bump the counter of a leaf key (`/text()`, `/comment()`) under the
    /// live path.
    fn bump_leaf(&mut self, suffix: &str) -> u32 {
        let mark = self.live_path.len();
        self.live_path.push_str(suffix);
        let count = self.paths.bump(&self.live_path);
        self.live_path.truncate(mark);
        count
    }

    fn open_element(&mut self, tag: &str, mut attrs: Vec<(CompactString, CompactString)>) {
        let mark = self.live_path.len();
        self.live_path.push('/');
        self.live_path.push_str(tag);
        let sibling_index = self.paths.bump(&self.live_path);

        let element = self.new_node(NodeKind::Element, tag, tag, sibling_index);

        // Sorted so attribute order in the source never shows in the tree.
        attrs.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in attrs {
            let name_node = self.new_node(
                NodeKind::AttributeName,
                &format_compact!("@{key}Name"),
                &key,
                0,
            );
            let value_node =
                self.new_node(NodeKind::AttributeValue, &format_compact!("@{key}"), &value, 0);
            name_node.append(value_node, &mut self.arena);
            element.append(name_node, &mut self.arena);
        }

        let parent = self.current();
        parent.append(element, &mut self.arena);
        self.open.push((element, mark));
        let _ = write!(self.live_path, "[{sibling_index}]");

        trace!(path = %self.live_path, ?element, "open element");
    }

    fn close_element(&mut self) {
        let Some((element, mark)) = self.open.pop() else {
            panic!(
                "end of element without a matching start (path {:?})",
                self.live_path
            );
        };
        self.live_path.truncate(mark);

        let counter = self.counter;
        let data = self.arena[element].get_mut();
        data.subtree_size = Some(counter - data.created_at + 1);

        trace!(tag = %data.name, size = ?data.subtree_size, "close element");
    }

    fn normalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.options.normalize_space {
            Cow::Owned(normalize_space(text))
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_space(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Text the tree never keeps. Besides empty strings this drops a lone
/// newline and exactly two spaces, which some sources emit as
/// indentation-only chunks.
fn is_insignificant(text: &str) -> bool {
    matches!(text, "" | "\n" | "  ")
}

impl ContentHandler for TreeBuilder {
    fn start_prefix_mapping(&mut self, prefix: Option<&str>, uri: &str) {
        self.namespaces.enter_prefix(prefix, uri);
    }

    fn end_prefix_mapping(&mut self, prefix: Option<&str>) {
        self.namespaces.exit_prefix(prefix);
    }

    fn start_element_ns(&mut self, name: NsName<'_>, _qname: &str, attrs: &[(NsName<'_>, &str)]) {
        let tag = self.namespaces.resolve(name.uri, name.local);
        let attrs = attrs
            .iter()
            .map(|(key, value)| {
                (
                    self.namespaces.resolve(key.uri, key.local),
                    CompactString::from(*value),
                )
            })
            .collect();
        self.open_element(&tag, attrs);
    }

    fn end_element_ns(&mut self, _name: NsName<'_>, _qname: &str) {
        self.close_element();
    }

    fn start_element(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        let attrs = attrs
            .iter()
            .map(|(key, value)| (CompactString::from(*key), CompactString::from(*value)))
            .collect();
        self.open_element(tag, attrs);
    }

    fn end_element(&mut self, _tag: &str) {
        self.close_element();
    }

    fn characters(&mut self, text: &str) {
        let text = self.normalize(text);
        if is_insignificant(&text) {
            return;
        }

        let parent = self.current();
        if let Some(last) = self.arena[parent].last_child()
            && self.arena[last].get().kind == NodeKind::Text
        {
            self.arena[last].get_mut().value.push_str(&text);
            return;
        }

        let sibling_index = self.bump_leaf("/text()");
        let node = self.new_node(NodeKind::Text, "text()", &text, sibling_index);
        parent.append(node, &mut self.arena);
    }

    fn comment(&mut self, text: &str) {
        if !self.options.include_comments {
            return;
        }
        let text = self.normalize(text);
        if text.is_empty() {
            return;
        }

        let sibling_index = self.bump_leaf("/comment()");
        let node = self.new_node(NodeKind::Comment, "comment()", &text, sibling_index);
        let parent = self.current();
        parent.append(node, &mut self.arena);
    }
}

impl LexicalHandler for TreeBuilder {}
