//! DOM Node - Compact representation
//!
//! Nodes link to their relatives through `NodeId` (4 bytes) instead of
//! pointers, so the whole tree lives in one arena vector.

use crate::{DOMTokenList, NodeId};

/// Arena entry: sibling/child links plus the payload
#[derive(Debug)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    fn unlinked(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::unlinked(NodeData::Element(ElementData::new(tag)))
    }

    pub fn text(content: String) -> Self {
        Self::unlinked(NodeData::Text(TextData { content }))
    }

    pub fn comment(content: String) -> Self {
        Self::unlinked(NodeData::Comment(content))
    }

    pub fn document() -> Self {
        Self::unlinked(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.as_text().is_some()
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(e) = &self.data { Some(e) } else { None }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(e) = &mut self.data { Some(e) } else { None }
    }

    /// Character data of a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        if let NodeData::Text(t) = &self.data { Some(t.content.as_str()) } else { None }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in insertion order. `class` is kept in sync with `classes`.
    pub attrs: Vec<Attribute>,
    /// Cached class list
    pub classes: DOMTokenList,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: DOMTokenList::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check whether an attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Get the id attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            self.classes.set_value(value);
        }
        self.write_attr(name, value.to_string());
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        if name == "class" {
            self.classes.set_value("");
        }
        Some(self.attrs.remove(pos).value)
    }

    /// Add class tokens (whitespace separated)
    pub fn add_class(&mut self, classes: &str) {
        self.classes.add(classes);
        self.sync_class_attr();
    }

    /// Remove class tokens (whitespace separated)
    pub fn remove_class(&mut self, classes: &str) {
        self.classes.remove(classes);
        self.sync_class_attr();
    }

    /// Check for a class token
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn sync_class_attr(&mut self) {
        let value = self.classes.value();
        self.write_attr("class".to_string(), value);
    }

    fn write_attr(&mut self, name: String, value: String) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attrs.push(Attribute { name, value });
        }
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
