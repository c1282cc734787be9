//! Depth-first traversal of content trees.
//!
//! One generic [`Cursor`] serves every traversal. A [`Descent`] policy
//! decides which children the cursor follows, and an [`IterFilter`] decides
//! which visited nodes it yields. Filtering never prunes: children of a
//! rejected node are still visited.
//!
//! # Example
//!
//! ```
//! use pagedom::iter::{ContentIterator, IterFilter};
//! use pagedom::model::ContentKind;
//!
//! fn text_regions(roots: &[pagedom::model::ContentNode]) -> usize {
//!     ContentIterator::new(roots, IterFilter::kind(ContentKind::TextRegion)).count()
//! }
//! ```

mod cursor;

pub use cursor::Cursor;

use crate::model::{ContentKind, ContentNode, Layer};

/// Decides which children a cursor descends into.
pub trait Descent {
    /// Whether `child` of `parent` is visited.
    fn follows(&self, parent: &ContentNode, child: &ContentNode) -> bool;
}

/// Follows every child, nested regions included.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllContent;

impl Descent for AllContent {
    fn follows(&self, _parent: &ContentNode, _child: &ContentNode) -> bool {
        true
    }
}

/// Follows only the line, word and glyph chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChain;

impl Descent for TextChain {
    fn follows(&self, parent: &ContentNode, child: &ContentNode) -> bool {
        parent.kind().text_child_kind() == Some(child.kind())
    }
}

/// Pre-order iteration over all content.
pub type ContentIterator<'a> = Cursor<'a, AllContent>;

/// Pre-order iteration over lines, words and glyphs.
pub type TextIterator<'a> = Cursor<'a, TextChain>;

/// Which nodes a cursor yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterFilter<'a> {
    /// Only nodes of this kind
    pub kind: Option<ContentKind>,
    /// Only regions referenced by this layer
    pub layer: Option<&'a Layer>,
}

impl<'a> IterFilter<'a> {
    /// A filter that yields everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter on content kind.
    pub fn kind(kind: ContentKind) -> Self {
        Self::new().with_kind(kind)
    }

    /// A filter on layer membership.
    pub fn layer(layer: &'a Layer) -> Self {
        Self::new().with_layer(layer)
    }

    /// Restrict to a content kind.
    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to members of a layer.
    pub fn with_layer(mut self, layer: &'a Layer) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Check if a node passes the filter.
    pub fn matches(&self, node: &ContentNode) -> bool {
        self.kind.map_or(true, |k| node.kind() == k)
            && self.layer.map_or(true, |l| l.contains(node.id()))
    }
}
