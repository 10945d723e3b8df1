// Minimal owned XML document model on top of quick-xml.
//
// The device's responses are small (a menu document tops out at a few
// hundred kilobytes), so everything is materialized into an `Element` tree
// instead of streaming. Element names are reduced to their local part; the
// device's default namespace carries no information we need.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;

/// One parsed XML element with its attributes, text content, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Attribute value by name, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value by name, or a parse error naming the element.
    pub fn require_attr(&self, name: &str) -> Result<&str, Error> {
        self.attr(name)
            .ok_or_else(|| Error::parse(format!("<{}> is missing attribute '{name}'", self.name)))
    }

    /// First descendant (depth-first, document order) with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Direct children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn from_start(event: &BytesStart<'_>) -> Result<Self, Error> {
        let name = local_name(event.name().as_ref());
        let mut attributes = HashMap::new();
        for attr in event.attributes() {
            let attr = attr.map_err(|e| Error::parse(format!("bad attribute: {e}")))?;
            let key = local_name(attr.key.as_ref());
            let value = attr
                .unescape_value()
                .map_err(|e| Error::parse(format!("bad attribute value: {e}")))?
                .into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }
}

/// Strip any namespace prefix from a raw element or attribute name.
fn local_name(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_owned(),
        None => s.into_owned(),
    }
}

/// Parse an XML document into its root `Element`.
pub fn parse(xml: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(Element::from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = Element::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(open) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::parse(format!("bad text content: {e}")))?;
                    open.text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::parse(e.to_string())),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::parse("unexpected end of document"));
    }
    root.ok_or_else(|| Error::parse("empty document"))
}

/// Close out `element` by attaching it to its parent, or making it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Error> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(Error::parse("multiple root elements"))
    }
}
