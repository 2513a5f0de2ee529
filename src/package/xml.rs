//! Owned element tree over `quick-xml` events.
//!
//! Package parts are small, so each consumer parses a part once into an [`XmlNode`] tree and
//! navigates it with the lookup helpers below. Names given to the helpers are matched against
//! the qualified name when they carry a prefix (`a:off`) and against the local name otherwise
//! (`off`).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlNode {
    /// Qualified element name as written, e.g. `p:sp`.
    pub name: String,
    /// Attributes in document order, keyed by qualified name.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Unescaped character data directly inside this element.
    pub text: String,
}

fn local_of(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn name_matches(actual: &str, wanted: &str) -> bool {
    if wanted.contains(':') {
        actual == wanted
    } else {
        local_of(actual) == wanted
    }
}

impl XmlNode {
    pub fn local_name(&self) -> &str {
        local_of(&self.name)
    }

    pub fn is(&self, name: &str) -> bool {
        name_matches(&self.name, name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| name_matches(k, name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name)?.trim().parse().ok()
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.is(name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.is(name))
    }

    /// Follow a chain of direct children.
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }

    /// All descendants (excluding `self`) named `name`, in document order.
    pub fn descendants(&self, name: &str) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        self.collect_descendants(name, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlNode>) {
        for c in &self.children {
            if c.is(name) {
                out.push(c);
            }
            c.collect_descendants(name, out);
        }
    }

    pub fn first_descendant(&self, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find_map(|c| if c.is(name) { Some(c) } else { c.first_descendant(name) })
    }
}

fn start_node(e: &BytesStart<'_>) -> ReelResult<XmlNode> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ReelError::xml(format!("bad attribute in <{name}>: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ReelError::xml(format!("bad attribute value in <{name}>: {err}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(XmlNode {
        name,
        attrs,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Parse a complete XML document and return its root element.
pub fn parse_xml(text: &str) -> ReelResult<XmlNode> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    let mut attach = |node: XmlNode, stack: &mut Vec<XmlNode>| -> ReelResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => root = Some(node),
            None => return Err(ReelError::xml("multiple root elements")),
        }
        Ok(())
    };

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_node(&e)?),
            Ok(Event::Empty(e)) => {
                let node = start_node(&e)?;
                attach(node, &mut stack)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ReelError::xml(format!("unexpected end tag at byte {pos}")))?;
                attach(node, &mut stack)?;
            }
            Ok(Event::Text(t)) => {
                let s = t
                    .unescape()
                    .map_err(|err| ReelError::xml(format!("bad text at byte {pos}: {err}")))?;
                match stack.last_mut() {
                    Some(top) => top.text.push_str(&s),
                    None if s.trim().is_empty() => {}
                    None => return Err(ReelError::xml("text outside the root element")),
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ReelError::xml(format!("at byte {pos}: {err}"))),
        }
    }

    if !stack.is_empty() {
        return Err(ReelError::xml(format!(
            "unclosed element <{}>",
            stack.last().map(|n| n.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| ReelError::xml("document has no root element"))
}

/// Well-formedness check without keeping the tree.
pub fn check_well_formed(text: &str) -> ReelResult<()> {
    parse_xml(text).map(|_| ())
}

/// Concatenate the text of every descendant named `name`, in document order.
pub fn joined_text(node: &XmlNode, name: &str) -> String {
    node.descendants(name)
        .into_iter()
        .map(|n| n.text.as_str())
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/package/xml.rs"]
mod tests;
