//! An owned, immutable SVG document model.
//!
//! Markup is parsed once into plain values; transforms consume an element and
//! return a new one, so no tree is ever shared or mutated between calls.
//! Namespace prefixes and declarations are preserved so the serialized output
//! stays equivalent to the input apart from the applied transforms.

use std::fmt;

use roxmltree::ParsingOptions;

use crate::error::MarkupError;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

/// A namespace declared on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    pub uri: String,
}

/// An attribute with its qualified name, e.g. `xlink:href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its qualified name, e.g. `svg:path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub namespaces: Vec<Namespace>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

// ============================================================================
// Parsing
// ============================================================================

impl Document {
    /// Parses markup whose root element is `<svg>`.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let parsed = roxmltree::Document::parse_with_options(markup, options)
            .map_err(|err| MarkupError::InvalidDocument(err.to_string()))?;

        let root = parsed.root_element();
        if root.tag_name().name() != "svg" {
            return Err(MarkupError::UnexpectedRoot(root.tag_name().name().to_string()));
        }

        Ok(Self {
            root: convert_element(root),
        })
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let parent_namespaces: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let namespaces = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .filter(|ns| !parent_namespaces.contains(&(ns.name(), ns.uri())))
        .map(|ns| Namespace {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: qualify(attribute_prefix(node, attr.namespace()).as_deref(), attr.name()),
            value: attr.value().to_string(),
        })
        .collect();

    let children = node
        .children()
        .filter_map(|child| match child.node_type() {
            roxmltree::NodeType::Element => Some(Node::Element(convert_element(child))),
            roxmltree::NodeType::Text => child.text().map(|text| Node::Text(text.to_string())),
            roxmltree::NodeType::Comment => {
                child.text().map(|text| Node::Comment(text.to_string()))
            }
            _ => None,
        })
        .collect();

    let tag = node.tag_name();
    Element {
        name: qualify(element_prefix(node, tag.namespace()).as_deref(), tag.name()),
        namespaces,
        attributes,
        children,
    }
}

/// Finds the prefix an element was written with. Prefers the default
/// namespace when it matches.
fn element_prefix(node: roxmltree::Node<'_, '_>, uri: Option<&str>) -> Option<String> {
    let uri = uri?;
    if node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri)
    {
        return None;
    }
    node.namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

/// Attributes never take the default namespace, so only prefixed
/// declarations apply.
fn attribute_prefix(node: roxmltree::Node<'_, '_>, uri: Option<&str>) -> Option<String> {
    let uri = uri?;
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

// ============================================================================
// Transforms
// ============================================================================

impl Element {
    /// An empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The name without its prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// The prefix this element was written with, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Looks up an attribute by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
        self
    }

    /// Declares the default namespace unless one is already declared here.
    pub fn with_default_namespace(mut self, uri: &str) -> Self {
        if !self.namespaces.iter().any(|ns| ns.prefix.is_none()) {
            self.namespaces.insert(
                0,
                Namespace {
                    prefix: None,
                    uri: uri.to_string(),
                },
            );
        }
        self
    }

    /// Drops every descendant element matching `predicate`, at any depth.
    pub fn without_descendants(mut self, predicate: &impl Fn(&Element) -> bool) -> Self {
        self.children = self
            .children
            .into_iter()
            .filter_map(|child| match child {
                Node::Element(element) if predicate(&element) => None,
                Node::Element(element) => {
                    Some(Node::Element(element.without_descendants(predicate)))
                }
                other => Some(other),
            })
            .collect();
        self
    }

    /// Inserts a node before all existing children.
    pub fn with_first_child(mut self, child: impl Into<Node>) -> Self {
        self.children.insert(0, child.into());
        self
    }

    /// Iterates over direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for ns in &self.namespaces {
            match &ns.prefix {
                Some(prefix) => write!(f, " xmlns:{prefix}=\"{}\"", escape_attribute(&ns.uri))?,
                None => write!(f, " xmlns=\"{}\"", escape_attribute(&ns.uri))?,
            }
        }
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.name, escape_attribute(&attr.value))?;
        }

        if self.children.is_empty() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        for child in &self.children {
            match child {
                Node::Element(element) => fmt::Display::fmt(element, f)?,
                Node::Text(text) => f.write_str(&escape_text(text))?,
                Node::Comment(text) => write!(f, "<!--{text}-->")?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
