//! Tree pretty-printing for debugging and test failure messages.

use indextree::{NodeEdge, NodeId};

use crate::tree::{NodeKind, Tree};

/// Helper for pretty-printing a tree, one node per line:
///
/// ```text
/// Root "/" #0 size=4
///   Element "doc" #1 [1] size=4
///     AttributeName "@idName" = "id" #2
///       AttributeValue "@id" = "7" #3
///     Text "text()" = "hi" #4 [1]
/// ```
pub struct TreeDump<'a> {
    tree: &'a Tree,
    from: NodeId,
}

impl<'a> TreeDump<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            from: tree.root,
        }
    }

    /// Dump only the subtree under `node`.
    pub fn subtree(tree: &'a Tree, node: NodeId) -> Self {
        Self { tree, from: node }
    }

    fn fmt_line(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        node: NodeId,
        depth: usize,
    ) -> std::fmt::Result {
        let data = self.tree.get(node);
        write!(f, "{}{:?} {:?}", "  ".repeat(depth), data.kind, data.name.as_str())?;
        if !matches!(data.kind, NodeKind::Root | NodeKind::Element) {
            write!(f, " = {:?}", data.value.as_str())?;
        }
        write!(f, " #{}", data.created_at)?;
        if data.sibling_index > 0 {
            write!(f, " [{}]", data.sibling_index)?;
        }
        if let Some(size) = data.subtree_size {
            write!(f, " size={size}")?;
        }
        writeln!(f)
    }
}

impl std::fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut depth = 0;
        for edge in self.from.traverse(&self.tree.arena) {
            match edge {
                NodeEdge::Start(node) => {
                    self.fmt_line(f, node, depth)?;
                    depth += 1;
                }
                NodeEdge::End(_) => depth -= 1,
            }
        }
        Ok(())
    }
}
