//! Navigable document trees for descriptors and repository metadata.
//!
//! Documents are parsed with `roxmltree` into an owned [`Element`] tree keyed by local names,
//! so the default POM namespace never leaks into lookups.

use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while parsing a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document is not valid UTF-8")]
    Encoding,

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Path-based access to a document tree.
///
/// Paths are `/`-separated local element names, resolved relative to the receiver.
pub trait DocumentTree {
    /// First element matching `path`, in document order.
    fn find(&self, path: &str) -> Option<&Element>;

    /// Every element matching `path`, in document order.
    fn find_all(&self, path: &str) -> Vec<&Element>;

    /// Text of the first element matching `path`.
    fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(Element::text)
    }
}

/// An owned document element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style text setter.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// The degenerate descriptor used when a coordinate has no published descriptor.
    #[must_use]
    pub fn project(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self::new("project")
            .with_child(Self::new("groupId").with_text(group_id))
            .with_child(Self::new("artifactId").with_text(artifact_id))
            .with_child(Self::new("version").with_text(version))
    }

    /// Parse a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or not well-formed XML.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes).map_err(|_| DocumentError::Encoding)?;
        Self::parse(text)
    }

    /// Parse a document from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not well-formed XML.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let text = text.trim_start_matches('\u{feff}');
        let normalized = normalize_entities(text);
        let document = roxmltree::Document::parse(&normalized)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();
        let text: String = node
            .children()
            .filter(roxmltree::Node::is_text)
            .filter_map(|child| child.text())
            .collect();
        let children = node
            .children()
            .filter(roxmltree::Node::is_element)
            .map(Self::from_node)
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            text: text.trim().to_string(),
            children,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct text content, whitespace-trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

impl DocumentTree for Element {
    fn find(&self, path: &str) -> Option<&Element> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return Some(self);
        };
        let rest: Vec<&str> = segments.collect();
        let rest = rest.join("/");
        self.children
            .iter()
            .filter(|child| child.name == first)
            .find_map(|child| child.find(&rest))
    }

    fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter())
                .filter(|child| child.name == segment)
                .collect();
        }
        current
    }
}

/// Replace named entities XML does not predeclare with a space.
///
/// Descriptors in the wild use HTML entities such as `&nbsp;` without a DTD, which would
/// otherwise reject the whole document.
fn normalize_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        rest = &rest[start..];
        let end = rest
            .char_indices()
            .take(34)
            .find(|(_, ch)| *ch == ';')
            .map(|(index, _)| index);
        match end {
            Some(end) => {
                let name = &rest[1..end];
                let known = ["lt", "gt", "amp", "quot", "apos"]
                    .iter()
                    .any(|known| name.eq_ignore_ascii_case(known));
                if known || name.starts_with('#') {
                    output.push_str(&rest[..=end]);
                } else {
                    output.push(' ');
                }
                rest = &rest[end + 1..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);
    Cow::Owned(output)
}
