//! The depth-first cursor.

use super::{AllContent, Descent, IterFilter, TextChain};
use crate::model::{ContentKind, ContentNode, Layer};
use std::slice;

/// One nesting level: the node whose children are being walked (none for the
/// roots) and the position among those children.
type Level<'a> = (Option<&'a ContentNode>, slice::Iter<'a, ContentNode>);

/// Lazy, single-pass pre-order traversal.
///
/// A node is yielded before its children and children before the following
/// siblings. [`has_next`](Self::has_next) looks ahead without consuming, so
/// it may be interleaved freely with [`Iterator::next`].
#[derive(Debug, Clone)]
pub struct Cursor<'a, D: Descent> {
    stack: Vec<Level<'a>>,
    peeked: Option<&'a ContentNode>,
    descent: D,
    filter: IterFilter<'a>,
}

impl<'a, D: Descent> Cursor<'a, D> {
    /// Walk `roots` with a descent policy.
    ///
    /// `parent` is the owner of `roots`; when given, the policy is consulted
    /// for the roots too.
    pub fn with_descent(
        roots: &'a [ContentNode],
        parent: Option<&'a ContentNode>,
        descent: D,
        filter: IterFilter<'a>,
    ) -> Self {
        Self {
            stack: vec![(parent, roots.iter())],
            peeked: None,
            descent,
            filter,
        }
    }

    /// Check if another matching node remains.
    pub fn has_next(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.is_some()
    }

    /// Kind filter in effect.
    pub fn content_kind(&self) -> Option<ContentKind> {
        self.filter.kind
    }

    /// Layer filter in effect.
    pub fn layer(&self) -> Option<&'a Layer> {
        self.filter.layer
    }

    fn advance(&mut self) -> Option<&'a ContentNode> {
        loop {
            let top = self.stack.last_mut()?;
            let parent = top.0;
            let Some(node) = top.1.next() else {
                self.stack.pop();
                continue;
            };

            if let Some(parent) = parent {
                if !self.descent.follows(parent, node) {
                    continue;
                }
            }
            if !node.children().is_empty() {
                self.stack.push((Some(node), node.children().iter()));
            }
            if self.filter.matches(node) {
                return Some(node);
            }
        }
    }
}

impl<'a> Cursor<'a, AllContent> {
    /// Walk all content below `roots`.
    pub fn new(roots: &'a [ContentNode], filter: IterFilter<'a>) -> Self {
        Self::with_descent(roots, None, AllContent, filter)
    }
}

impl<'a> Cursor<'a, TextChain> {
    /// Walk the text chain below `node`, e.g. the lines, words and glyphs of a
    /// text region. Nested regions are skipped.
    pub fn within(node: &'a ContentNode, filter: IterFilter<'a>) -> Self {
        Self::with_descent(node.children(), Some(node), TextChain, filter)
    }
}

impl<'a, D: Descent> Iterator for Cursor<'a, D> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.peeked.take().or_else(|| self.advance())
    }
}

impl<'a, D: Descent> std::iter::FusedIterator for Cursor<'a, D> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Id;
    use crate::iter::{ContentIterator, TextIterator};
    use crate::value::VariableMap;

    fn node(id: &str, kind: ContentKind) -> ContentNode {
        ContentNode::new(
            Id::new(id).unwrap(),
            kind,
            VariableMap::new(kind.schema_type_name()),
        )
    }

    fn with_children(mut parent: ContentNode, children: Vec<ContentNode>) -> ContentNode {
        for child in children {
            parent.add_child(child).unwrap();
        }
        parent
    }

    fn sample_tree() -> Vec<ContentNode> {
        vec![
            node("region1", ContentKind::TextRegion),
            with_children(
                node("region2", ContentKind::ChartRegion),
                vec![
                    node("region3", ContentKind::TextRegion),
                    node("region4", ContentKind::TextRegion),
                ],
            ),
            with_children(
                node("region5", ContentKind::MusicRegion),
                vec![node("region6", ContentKind::TextRegion)],
            ),
        ]
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a ContentNode>) -> Vec<&'a str> {
        iter.map(|n| n.id().as_str()).collect()
    }

    #[test]
    fn test_unfiltered_pre_order() {
        let tree = sample_tree();
        let iter = ContentIterator::new(&tree, IterFilter::new());
        assert_eq!(
            ids(iter),
            vec!["region1", "region2", "region3", "region4", "region5", "region6"]
        );
    }

    #[test]
    fn test_kind_filter_descends_through_non_matching() {
        let tree = sample_tree();
        let iter = ContentIterator::new(&tree, IterFilter::kind(ContentKind::TextRegion));
        assert_eq!(iter.content_kind(), Some(ContentKind::TextRegion));
        assert_eq!(ids(iter), vec!["region1", "region3", "region4", "region6"]);
    }

    #[test]
    fn test_layer_filter() {
        let tree = sample_tree();
        let layer = Layer::new(Id::new("lay1").unwrap(), 0)
            .with_regions([Id::new("region4").unwrap(), Id::new("region2").unwrap()]);
        let iter = ContentIterator::new(&tree, IterFilter::layer(&layer));
        assert!(iter.layer().is_some());
        assert_eq!(ids(iter), vec!["region2", "region4"]);
    }

    #[test]
    fn test_kind_and_layer_filters_combine() {
        let tree = sample_tree();
        let layer = Layer::new(Id::new("lay1").unwrap(), 0)
            .with_regions([Id::new("region2").unwrap(), Id::new("region4").unwrap()]);
        let filter = IterFilter::kind(ContentKind::TextRegion).with_layer(&layer);
        assert_eq!(ids(ContentIterator::new(&tree, filter)), vec!["region4"]);
    }

    #[test]
    fn test_has_next_is_idempotent() {
        let tree = sample_tree();
        let mut iter = ContentIterator::new(&tree, IterFilter::kind(ContentKind::TextRegion));
        let mut seen = Vec::new();
        while iter.has_next() {
            assert!(iter.has_next());
            seen.push(iter.next().unwrap().id().as_str());
        }
        assert_eq!(seen, vec!["region1", "region3", "region4", "region6"]);
        assert!(!iter.has_next());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_empty_and_no_match() {
        let empty: Vec<ContentNode> = Vec::new();
        assert!(!ContentIterator::new(&empty, IterFilter::new()).has_next());

        let tree = sample_tree();
        let mut iter = ContentIterator::new(&tree, IterFilter::kind(ContentKind::Glyph));
        assert!(!iter.has_next());
    }

    #[test]
    fn test_text_chain_skips_nested_regions() {
        let word = |id: &str, glyphs: &[&str]| {
            with_children(
                node(id, ContentKind::Word),
                glyphs.iter().map(|g| node(g, ContentKind::Glyph)).collect(),
            )
        };
        let line = with_children(
            node("l1", ContentKind::TextLine),
            vec![word("w1", &["g1", "g2"]), word("w2", &["g3"])],
        );
        let region = with_children(
            node("r1", ContentKind::TextRegion),
            vec![
                line,
                with_children(
                    node("r2", ContentKind::TextRegion),
                    vec![node("l2", ContentKind::TextLine)],
                ),
            ],
        );

        let all = TextIterator::within(&region, IterFilter::new());
        assert_eq!(ids(all), vec!["l1", "w1", "g1", "g2", "w2", "g3"]);

        let words = TextIterator::within(&region, IterFilter::kind(ContentKind::Word));
        assert_eq!(ids(words), vec!["w1", "w2"]);

        let generic = ContentIterator::new(region.children(), IterFilter::kind(ContentKind::TextLine));
        assert_eq!(ids(generic), vec!["l1", "l2"]);
    }
}
