//! XML text → parse events, using quick-xml.
//!
//! This is the bundled event source. It owns no tree semantics: it only
//! turns quick-xml's pull events into [`ContentHandler`] and
//! [`LexicalHandler`] callbacks in document order.

use facet::Facet;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use rapidhash::RapidHashMap;
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::handler::{ContentHandler, LexicalHandler, NsName};
use crate::trace;

/// How the source reports names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct ReaderOptions {
    /// Report namespace-qualified names and prefix mappings (default: true).
    /// When false, names are reported as written and `xmlns` declarations
    /// are ordinary attributes.
    pub namespaces: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { namespaces: true }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_namespaces(mut self) -> Self {
        self.namespaces = false;
        self
    }
}

/// An attribute with its name resolved, owned so the reader can move on.
struct OwnedAttr {
    uri: Option<String>,
    name: String,
    value: String,
}

/// Feed `xml` through `handler`.
///
/// Empty elements are reported as a start and an end. Character data
/// outside the document element is not reported; comments and the DOCTYPE
/// are.
///
/// Entity references resolve to the predefined XML entities and to literal
/// general entities declared in the DOCTYPE's internal subset. Replacement
/// text is used as is, without expanding references inside it. References
/// to undeclared or external entities are a [`ParseError::Xml`].
pub fn drive<H>(xml: &str, options: &ReaderOptions, handler: &mut H) -> Result<(), ParseError>
where
    H: ContentHandler + LexicalHandler,
{
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut depth = 0usize;
    // Prefixes declared on each open element, innermost last.
    let mut declared: Vec<SmallVec<[Option<String>; 2]>> = Vec::new();
    let mut entities: RapidHashMap<String, String> = RapidHashMap::default();

    loop {
        let position = reader.buffer_position() as u64;
        let (resolved, event) = match reader.read_resolved_event() {
            Ok(pair) => pair,
            Err(err) => return Err(ParseError::xml(position, err)),
        };
        let uri = match resolved {
            ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), position)?.to_owned()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) if options.namespaces => {
                return Err(ParseError::UnknownPrefix {
                    position,
                    prefix: String::from_utf8_lossy(&prefix).into_owned(),
                });
            }
            ResolveResult::Unknown(_) => None,
        };

        match event {
            Event::Start(e) => {
                let name = e.name();
                let qname = utf8(name.as_ref(), position)?;

                let mut bindings: SmallVec<[(Option<String>, String); 2]> = SmallVec::new();
                let mut attrs = Vec::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| ParseError::xml(position, err))?;
                    let key = attr.key;
                    let raw_key = utf8(key.as_ref(), position)?;
                    let value = attr
                        .unescape_value_with(|name| resolve_entity(&entities, name))
                        .map_err(|err| ParseError::xml(position, err))?;

                    if !options.namespaces {
                        attrs.push(OwnedAttr {
                            uri: None,
                            name: raw_key.to_owned(),
                            value: value.into_owned(),
                        });
                        continue;
                    }

                    if raw_key == "xmlns" {
                        bindings.push((None, value.into_owned()));
                        continue;
                    }
                    if let Some(prefix) = raw_key.strip_prefix("xmlns:") {
                        bindings.push((Some(prefix.to_owned()), value.into_owned()));
                        continue;
                    }

                    let (attr_ns, local) = reader.resolve_attribute(key);
                    let attr_uri = match attr_ns {
                        ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), position)?.to_owned()),
                        ResolveResult::Unbound => None,
                        ResolveResult::Unknown(prefix) => {
                            return Err(ParseError::UnknownPrefix {
                                position,
                                prefix: String::from_utf8_lossy(&prefix).into_owned(),
                            });
                        }
                    };
                    attrs.push(OwnedAttr {
                        uri: attr_uri,
                        name: utf8(local.as_ref(), position)?.to_owned(),
                        value: value.into_owned(),
                    });
                }

                trace!(qname, depth, attrs = attrs.len(), "start element");
                if options.namespaces {
                    for (prefix, ns_uri) in &bindings {
                        handler.start_prefix_mapping(prefix.as_deref(), ns_uri);
                    }
                    let local_name = e.local_name();
                    let local = utf8(local_name.as_ref(), position)?;
                    let ns_attrs: Vec<(NsName<'_>, &str)> = attrs
                        .iter()
                        .map(|a| (NsName::new(a.uri.as_deref(), &a.name), a.value.as_str()))
                        .collect();
                    handler.start_element_ns(NsName::new(uri.as_deref(), local), qname, &ns_attrs);
                    declared.push(bindings.into_iter().map(|(prefix, _)| prefix).collect());
                } else {
                    let plain_attrs: Vec<(&str, &str)> = attrs
                        .iter()
                        .map(|a| (a.name.as_str(), a.value.as_str()))
                        .collect();
                    handler.start_element(qname, &plain_attrs);
                }
                depth += 1;
            }
            Event::End(e) => {
                if depth == 0 {
                    return Err(ParseError::xml(position, "end tag without a start tag"));
                }
                depth -= 1;

                let name = e.name();
                let qname = utf8(name.as_ref(), position)?;
                if options.namespaces {
                    let local_name = e.local_name();
                    let local = utf8(local_name.as_ref(), position)?;
                    handler.end_element_ns(NsName::new(uri.as_deref(), local), qname);
                    if let Some(prefixes) = declared.pop() {
                        for prefix in prefixes.iter().rev() {
                            handler.end_prefix_mapping(prefix.as_deref());
                        }
                    }
                } else {
                    handler.end_element(qname);
                }
            }
            Event::Text(e) => {
                if depth > 0 {
                    let text = e
                        .unescape_with(|name| resolve_entity(&entities, name))
                        .map_err(|err| ParseError::xml(position, err))?;
                    handler.characters(&text);
                }
            }
            Event::CData(e) => {
                if depth > 0 {
                    handler.start_cdata();
                    handler.characters(utf8(&e, position)?);
                    handler.end_cdata();
                }
            }
            Event::Comment(e) => {
                handler.comment(utf8(&e, position)?);
            }
            Event::DocType(e) => {
                let raw = utf8(&e, position)?;
                for (name, value) in internal_entities(raw) {
                    trace!(name, value, "internal entity");
                    entities
                        .entry(name.to_owned())
                        .or_insert_with(|| value.to_owned());
                }
                let (name, public_id, system_id) = doctype_parts(raw);
                handler.start_dtd(name, public_id, system_id);
                handler.end_dtd();
            }
            Event::Eof => break,
            // XML declaration and processing instructions
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::UnexpectedEof { open: depth });
    }
    Ok(())
}

fn resolve_entity<'e>(entities: &'e RapidHashMap<String, String>, name: &str) -> Option<&'e str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|_| ParseError::Utf8 { position })
}

/// Split DOCTYPE content (`html PUBLIC "pub" "sys" [...]`) into name, public
/// id and system id.
fn doctype_parts(raw: &str) -> (&str, Option<&str>, Option<&str>) {
    let raw = raw.trim_start();
    let name_end = raw
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(raw.len());
    let (name, rest) = raw.split_at(name_end);
    let rest = rest.trim_start();

    if let Some(after) = rest.strip_prefix("PUBLIC") {
        let mut literals = quoted_literals(after);
        let public_id = literals.next();
        (name, public_id, literals.next())
    } else if let Some(after) = rest.strip_prefix("SYSTEM") {
        (name, None, quoted_literals(after).next())
    } else {
        (name, None, None)
    }
}

/// Literal general entities (`<!ENTITY name "value">`) declared in the
/// internal subset. Parameter entities and external entities are skipped.
fn internal_entities(raw: &str) -> Vec<(&str, &str)> {
    let Some(open) = raw.find('[') else {
        return Vec::new();
    };
    let mut rest = &raw[open + 1..];
    let mut found = Vec::new();
    while let Some(pos) = rest.find("<!ENTITY") {
        rest = rest[pos + "<!ENTITY".len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_end);
        rest = after;
        // An external entity has SYSTEM or PUBLIC here instead of a literal.
        if let Some(value) = quoted_literals(after).next() {
            found.push((name, value));
        }
    }
    found
}

fn quoted_literals(mut rest: &str) -> impl Iterator<Item = &str> {
    std::iter::from_fn(move || {
        rest = rest.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = &rest[1..];
        let end = body.find(quote)?;
        let literal = &body[..end];
        rest = &body[end + 1..];
        Some(literal)
    })
}
