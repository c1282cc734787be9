//! Content nodes.

use super::ContentKind;
use crate::error::{Error, Result};
use crate::ident::{Id, IdRegistry};
use crate::iter::{ContentIterator, IterFilter, TextIterator};
use crate::schema::FormatModel;
use crate::value::VariableMap;
use serde::{Deserialize, Serialize};

/// Recognised text of a text-bearing node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextEquiv {
    /// Text in Unicode
    pub unicode: String,

    /// Simplified text without special characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,

    /// Recognition confidence (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
}

impl TextEquiv {
    /// Create text content.
    pub fn new(unicode: impl Into<String>) -> Self {
        Self {
            unicode: unicode.into(),
            ..Default::default()
        }
    }

    /// Set the confidence, clamped into `[0, 1]`.
    pub fn with_conf(mut self, conf: f64) -> Self {
        self.conf = Some(conf.clamp(0.0, 1.0));
        self
    }
}

/// A tree element: region, line, word or glyph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentNode {
    id: Id,
    kind: ContentKind,
    attributes: VariableMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<TextEquiv>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a node with explicit attributes. The id is not registered.
    pub fn new(id: Id, kind: ContentKind, attributes: VariableMap) -> Self {
        Self {
            id,
            kind,
            attributes,
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a node with attributes instantiated from the model's template
    /// for its kind. Without a template the attribute bag starts empty.
    pub fn from_template(id: Id, kind: ContentKind, model: &FormatModel) -> Self {
        let attributes = model
            .instantiate(kind.schema_type_name())
            .unwrap_or_else(|| VariableMap::new(kind.schema_type_name()));
        Self::new(id, kind, attributes)
    }

    /// Create a node with a freshly generated and registered id.
    pub fn create(kind: ContentKind, model: &FormatModel, registry: &mut IdRegistry) -> Result<Self> {
        let id = registry.create_id(Some(kind.id_prefix()))?;
        Ok(Self::from_template(id, kind, model))
    }

    /// Identifier.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Change the identifier, keeping the registry consistent.
    ///
    /// The new id is registered and the old one released in one step; on
    /// failure neither the node nor the registry changes.
    pub fn set_id(&mut self, id: Id, registry: &mut IdRegistry) -> Result<()> {
        registry.register_id(&id, Some(&self.id))?;
        self.id = id;
        Ok(())
    }

    pub(crate) fn replace_id(&mut self, id: Id) {
        self.id = id;
    }

    /// Content kind.
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Attribute bag.
    pub fn attributes(&self) -> &VariableMap {
        &self.attributes
    }

    /// Mutable attribute bag.
    pub fn attributes_mut(&mut self) -> &mut VariableMap {
        &mut self.attributes
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&TextEquiv> {
        self.text.as_ref()
    }

    /// Set the text content. Only text-bearing kinds hold text.
    pub fn set_text(&mut self, text: TextEquiv) -> Result<()> {
        if !self.kind.is_text_bearing() {
            return Err(Error::InvalidChild {
                parent: self.kind.to_string(),
                child: "text content".to_string(),
            });
        }
        self.text = Some(text);
        Ok(())
    }

    /// Direct children in order.
    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// Append a child of a kind this node accepts.
    pub fn add_child(&mut self, child: ContentNode) -> Result<()> {
        self.check_child(child.kind)?;
        self.children.push(child);
        Ok(())
    }

    /// Insert a child at a position (clamped to the end).
    pub fn insert_child(&mut self, index: usize, child: ContentNode) -> Result<()> {
        self.check_child(child.kind)?;
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        Ok(())
    }

    fn check_child(&self, child: ContentKind) -> Result<()> {
        if self.kind.accepts_child(child) {
            Ok(())
        } else {
            Err(Error::InvalidChild {
                parent: self.kind.to_string(),
                child: child.to_string(),
            })
        }
    }

    /// Find a node in this subtree (including this node).
    pub fn find(&self, id: &str) -> Option<&ContentNode> {
        if self.id.as_str() == id {
            return Some(self);
        }
        find_in(&self.children, id)
    }

    /// Find a node in this subtree mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ContentNode> {
        if self.id.as_str() == id {
            return Some(self);
        }
        find_in_mut(&mut self.children, id)
    }

    /// Ids of this node and all descendants, in pre-order.
    pub fn subtree_ids(&self) -> Vec<Id> {
        let mut ids = vec![self.id.clone()];
        for node in self.descendants(IterFilter::new()) {
            ids.push(node.id.clone());
        }
        ids
    }

    /// Pre-order iteration over all descendants (excluding this node).
    pub fn descendants<'a>(&'a self, filter: IterFilter<'a>) -> ContentIterator<'a> {
        ContentIterator::new(&self.children, filter)
    }

    /// Iteration over the line/word/glyph chain below this node.
    pub fn text_descendants<'a>(&'a self, filter: IterFilter<'a>) -> TextIterator<'a> {
        TextIterator::within(self, filter)
    }

    /// Concatenated text of this node, falling back to its text children.
    ///
    /// Lines are joined with newlines, words with spaces, glyphs without
    /// separator.
    pub fn plain_text(&self) -> String {
        if let Some(ref text) = self.text {
            return text.unicode.clone();
        }
        let Some(child_kind) = self.kind.text_child_kind() else {
            return String::new();
        };
        let separator = match child_kind {
            ContentKind::TextLine => "\n",
            ContentKind::Word => " ",
            _ => "",
        };
        self.children
            .iter()
            .filter(|c| c.kind == child_kind)
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Depth-first search over a node list.
pub(crate) fn find_in<'a>(nodes: &'a [ContentNode], id: &str) -> Option<&'a ContentNode> {
    nodes.iter().find_map(|n| n.find(id))
}

/// Mutable depth-first search over a node list.
pub(crate) fn find_in_mut<'a>(nodes: &'a mut [ContentNode], id: &str) -> Option<&'a mut ContentNode> {
    nodes.iter_mut().find_map(|n| n.find_mut(id))
}

/// Detach a node from anywhere in a node list.
pub(crate) fn remove_from(nodes: &mut Vec<ContentNode>, id: &str) -> Option<ContentNode> {
    if let Some(pos) = nodes.iter().position(|n| n.id.as_str() == id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|n| remove_from(&mut n.children, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: ContentKind) -> ContentNode {
        ContentNode::new(
            Id::new(id).unwrap(),
            kind,
            VariableMap::new(kind.schema_type_name()),
        )
    }

    fn text_region() -> ContentNode {
        let mut region = node("r1", ContentKind::TextRegion);
        for l in 1..=2 {
            let mut line = node(&format!("l{}", l), ContentKind::TextLine);
            for w in 1..=2 {
                let mut word = node(&format!("w{}{}", l, w), ContentKind::Word);
                word.set_text(TextEquiv::new(format!("word{}{}", l, w)))
                    .unwrap();
                line.add_child(word).unwrap();
            }
            region.add_child(line).unwrap();
        }
        region
    }

    #[test]
    fn test_add_child_checks_kind() {
        let mut line = node("l1", ContentKind::TextLine);
        let err = line.add_child(node("g1", ContentKind::Glyph)).unwrap_err();
        assert!(matches!(err, Error::InvalidChild { .. }));
        assert!(line.add_child(node("w1", ContentKind::Word)).is_ok());
    }

    #[test]
    fn test_set_text_only_on_text_kinds() {
        let mut image = node("r1", ContentKind::ImageRegion);
        assert!(image.set_text(TextEquiv::new("x")).is_err());
        let mut glyph = node("g1", ContentKind::Glyph);
        glyph.set_text(TextEquiv::new("x").with_conf(1.7)).unwrap();
        assert_eq!(glyph.text().unwrap().conf, Some(1.0));
    }

    #[test]
    fn test_find_and_remove() {
        let mut region = text_region();
        assert_eq!(region.find("w21").map(|n| n.kind()), Some(ContentKind::Word));
        assert!(region.find("nope").is_none());

        let removed = remove_from(&mut region.children, "w12").unwrap();
        assert_eq!(removed.id().as_str(), "w12");
        assert!(region.find("w12").is_none());
    }

    #[test]
    fn test_subtree_ids_pre_order() {
        let region = text_region();
        let ids: Vec<String> = region.subtree_ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["r1", "l1", "w11", "w12", "l2", "w21", "w22"]);
    }

    #[test]
    fn test_plain_text() {
        let region = text_region();
        assert_eq!(region.plain_text(), "word11 word12\nword21 word22");
    }

    #[test]
    fn test_set_id_updates_registry() {
        let mut registry = IdRegistry::new();
        let mut n = node("r1", ContentKind::TextRegion);
        registry.register("r1").unwrap();
        registry.register("r2").unwrap();

        assert!(n.set_id(Id::new("r2").unwrap(), &mut registry).is_err());
        assert_eq!(n.id().as_str(), "r1");

        n.set_id(Id::new("r7").unwrap(), &mut registry).unwrap();
        assert_eq!(n.id().as_str(), "r7");
        assert!(!registry.contains("r1"));
        assert!(registry.contains("r7"));
    }
}
