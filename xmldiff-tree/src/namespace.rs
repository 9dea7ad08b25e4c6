//! Namespace scoping for element and attribute names.
//!
//! Bindings live on a single stack in declaration order. A prefix resolves to
//! its innermost binding, and the unnamed prefix (the default namespace) is no
//! different: the active default is whatever the innermost `None` entry says.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::trace;

#[derive(Debug, Clone)]
struct Binding {
    prefix: Option<CompactString>,
    uri: CompactString,
}

/// Scoped prefix → URI bindings.
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    bindings: SmallVec<[Binding; 8]>,
}

impl NamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring `prefix` into scope, bound to `uri`.
    ///
    /// `None` is the default namespace. An empty `uri` for the default
    /// namespace un-declares it for the scope (`xmlns=""`).
    pub fn enter_prefix(&mut self, prefix: Option<&str>, uri: &str) {
        trace!(?prefix, uri, "enter prefix");
        self.bindings.push(Binding {
            prefix: prefix.map(CompactString::from),
            uri: CompactString::from(uri),
        });
    }

    /// Drop the innermost binding of `prefix`, revealing the one it shadowed.
    pub fn exit_prefix(&mut self, prefix: Option<&str>) {
        trace!(?prefix, "exit prefix");
        if let Some(pos) = self
            .bindings
            .iter()
            .rposition(|b| b.prefix.as_deref() == prefix)
        {
            self.bindings.remove(pos);
        }
    }

    /// The URI currently bound to `prefix`, if any.
    pub fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix.as_deref() == prefix)
            .map(|b| b.uri.as_str())
    }

    /// The active default namespace. Empty bindings count as no default.
    pub fn default_uri(&self) -> Option<&str> {
        self.lookup(None).filter(|uri| !uri.is_empty())
    }

    /// Canonical display tag for a namespace-qualified name.
    ///
    /// An explicit non-empty `uri` wins, then the active default namespace,
    /// then the bare local name. Namespaced tags use Clark notation:
    /// `{uri}local`.
    pub fn resolve(&self, uri: Option<&str>, local: &str) -> CompactString {
        match uri.filter(|u| !u.is_empty()).or_else(|| self.default_uri()) {
            Some(uri) => compact_str::format_compact!("{{{uri}}}{local}"),
            None => CompactString::from(local),
        }
    }

    /// Number of bindings in scope.
    pub fn depth(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn resolve_without_bindings_is_local_name() {
        let ns = NamespaceResolver::new();
        assert_eq!(ns.resolve(None, "a"), "a");
        assert_eq!(ns.resolve(Some(""), "a"), "a");
    }

    #[test]
    fn explicit_uri_wins_over_default() {
        let mut ns = NamespaceResolver::new();
        ns.enter_prefix(None, "urn:default");
        assert_eq!(ns.resolve(Some("urn:x"), "a"), "{urn:x}a");
        assert_eq!(ns.resolve(None, "a"), "{urn:default}a");
    }

    #[test]
    fn exiting_default_restores_outer_default() {
        let mut ns = NamespaceResolver::new();
        ns.enter_prefix(None, "urn:outer");
        ns.enter_prefix(Some("p"), "urn:p");
        ns.enter_prefix(None, "urn:inner");
        assert_eq!(ns.default_uri(), Some("urn:inner"));

        ns.exit_prefix(None);
        assert_eq!(ns.default_uri(), Some("urn:outer"));
        assert_eq!(ns.lookup(Some("p")), Some("urn:p"));

        ns.exit_prefix(Some("p"));
        ns.exit_prefix(None);
        assert_eq!(ns.default_uri(), None);
        assert_eq!(ns.depth(), 0);
    }

    #[test]
    fn empty_default_undeclares() {
        let mut ns = NamespaceResolver::new();
        ns.enter_prefix(None, "urn:outer");
        ns.enter_prefix(None, "");
        assert_eq!(ns.resolve(None, "a"), "a");
        ns.exit_prefix(None);
        assert_eq!(ns.resolve(None, "a"), "{urn:outer}a");
    }

    #[test]
    fn exit_pops_only_the_named_prefix() {
        let mut ns = NamespaceResolver::new();
        ns.enter_prefix(Some("a"), "urn:a1");
        ns.enter_prefix(Some("b"), "urn:b");
        ns.enter_prefix(Some("a"), "urn:a2");
        ns.exit_prefix(Some("a"));
        assert_eq!(ns.lookup(Some("a")), Some("urn:a1"));
        assert_eq!(ns.lookup(Some("b")), Some("urn:b"));
    }

    #[test]
    fn exit_unknown_prefix_is_ignored() {
        let mut ns = NamespaceResolver::new();
        ns.enter_prefix(Some("a"), "urn:a");
        ns.exit_prefix(Some("zzz"));
        assert_eq!(ns.depth(), 1);
    }
}
