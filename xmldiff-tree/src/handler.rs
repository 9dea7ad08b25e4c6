//! Callback interfaces between an XML event source and a consumer.
//!
//! Events arrive strictly in document order and well nested: every start
//! element is matched by an end element in the same form, and prefix
//! mappings are started before the element that declares them and ended
//! after it.

/// A namespace-qualified name as reported by a namespace-aware source.
///
/// `uri` is `None` for names in no namespace. Prefixes have already been
/// resolved by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsName<'a> {
    pub uri: Option<&'a str>,
    pub local: &'a str,
}

impl<'a> NsName<'a> {
    pub fn new(uri: Option<&'a str>, local: &'a str) -> Self {
        Self { uri, local }
    }

    pub fn local(local: &'a str) -> Self {
        Self { uri: None, local }
    }
}

/// Events that shape the document content.
pub trait ContentHandler {
    fn start_prefix_mapping(&mut self, prefix: Option<&str>, uri: &str);

    fn end_prefix_mapping(&mut self, prefix: Option<&str>);

    /// Element start with namespace-qualified names. `qname` is the raw
    /// name as written in the source.
    fn start_element_ns(&mut self, name: NsName<'_>, qname: &str, attrs: &[(NsName<'_>, &str)]);

    fn end_element_ns(&mut self, name: NsName<'_>, qname: &str);

    /// Element start for sources that do not split names by namespace.
    fn start_element(&mut self, tag: &str, attrs: &[(&str, &str)]);

    fn end_element(&mut self, tag: &str);

    /// A chunk of character data. One text run may be split over several
    /// calls.
    fn characters(&mut self, text: &str);

    fn comment(&mut self, text: &str);
}

/// Lexical boundaries some sources report unconditionally.
///
/// Every method defaults to doing nothing, so a handler only overrides what
/// it cares about.
pub trait LexicalHandler {
    fn start_dtd(&mut self, _name: &str, _public_id: Option<&str>, _system_id: Option<&str>) {}

    fn end_dtd(&mut self) {}

    fn start_entity(&mut self, _name: &str) {}

    fn end_entity(&mut self, _name: &str) {}

    fn start_cdata(&mut self) {}

    fn end_cdata(&mut self) {}
}
