//! Order-preserving XML trees for structural diffing.
//!
//! xmldiff-tree turns a stream of XML parse events into an arena tree whose
//! nodes carry what a tree-diff engine needs:
//! - **Attributes as nodes**: each attribute becomes a name node owning a
//!   value node, sorted by key, so declaration order never matters
//! - **Stable addressing**: every element, text and comment gets an XPath
//!   style `[n]` index, so equivalent documents address nodes the same way
//! - **Namespace resolution**: names are reduced to `{uri}local`, so prefix
//!   spelling never matters
//! - **Bookkeeping**: document-order stamps and subtree sizes
//!
//! # Example
//!
//! ```rust
//! use xmldiff_tree::{NodeKind, parse};
//!
//! let tree = parse(r#"<doc b="2" a="1"><p>hi</p></doc>"#).unwrap();
//! let doc = tree.document_element().unwrap();
//! assert_eq!(tree.attributes(doc), vec![("a", "1"), ("b", "2")]);
//! assert_eq!(tree.get(doc).subtree_size, Some(7));
//!
//! let text = tree.descendants(doc).find(|&id| tree.get(id).kind == NodeKind::Text).unwrap();
//! assert_eq!(tree.xpath(text), "/doc[1]/p[1]/text()[1]");
//! ```
//!
//! Other event sources can drive a [`TreeBuilder`] directly through the
//! [`ContentHandler`] and [`LexicalHandler`] traits.

mod tracing_macros;

pub mod builder;
pub mod dump;
mod error;
pub mod handler;
pub mod namespace;
pub mod path_counter;
pub mod reader;
pub mod tree;

use facet::Facet;

pub use builder::{BuildOptions, TreeBuilder, normalize_space};
pub use dump::TreeDump;
pub use error::ParseError;
pub use handler::{ContentHandler, LexicalHandler, NsName};
pub use reader::ReaderOptions;
pub use tree::{Count, NodeData, NodeKind, OrderIndex, Tree};

/// Options for [`parse_with`]: how the tree is built and how names are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct ParseOptions {
    pub build: BuildOptions,
    pub reader: ReaderOptions,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse whitespace runs in text and comments.
    pub fn normalize_space(mut self) -> Self {
        self.build = self.build.normalize_space();
        self
    }

    /// Keep comments as tree nodes.
    pub fn include_comments(mut self) -> Self {
        self.build = self.build.include_comments();
        self
    }

    /// Take element and attribute names as written, prefixes included.
    pub fn without_namespaces(mut self) -> Self {
        self.reader = self.reader.without_namespaces();
        self
    }
}

/// Parse an XML document with default options.
pub fn parse(xml: &str) -> Result<Tree, ParseError> {
    parse_with(xml, &ParseOptions::default())
}

/// Parse an XML document into a finished tree.
pub fn parse_with(xml: &str, options: &ParseOptions) -> Result<Tree, ParseError> {
    let mut builder = TreeBuilder::new(options.build);
    reader::drive(xml, &options.reader, &mut builder)?;
    let tree = builder.finish();
    trace!("parsed tree:\n{}", TreeDump::new(&tree));
    Ok(tree)
}
