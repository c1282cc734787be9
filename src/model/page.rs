//! Page-level types.

use super::node::{find_in, find_in_mut};
use super::{ContentKind, ContentNode, Layers, ReadingOrder, Relations};
use crate::iter::{ContentIterator, IterFilter};
use crate::value::VariableMap;
use serde::{Deserialize, Serialize};

/// A page: the root of the content tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Image the page content was taken from
    pub image_filename: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Page attributes (schema type `PageType`)
    pub attributes: VariableMap,

    /// Top-level regions
    #[serde(default)]
    pub(crate) regions: Vec<ContentNode>,

    /// Reading order over the regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_order: Option<ReadingOrder>,

    /// Layers over the regions
    #[serde(default, skip_serializing_if = "Layers::is_empty")]
    pub layers: Layers,

    /// Relations between regions
    #[serde(default, skip_serializing_if = "Relations::is_empty")]
    pub relations: Relations,
}

impl Page {
    /// Schema type name of page attributes.
    pub const SCHEMA_TYPE: &'static str = "PageType";

    /// Create an empty page.
    pub fn new(image_filename: impl Into<String>, width: u32, height: u32, attributes: VariableMap) -> Self {
        Self {
            image_filename: image_filename.into(),
            width,
            height,
            attributes,
            regions: Vec::new(),
            reading_order: None,
            layers: Layers::new(),
            relations: Relations::new(),
        }
    }

    /// Top-level regions in document order.
    pub fn regions(&self) -> &[ContentNode] {
        &self.regions
    }

    /// Find any node by id.
    pub fn find(&self, id: &str) -> Option<&ContentNode> {
        find_in(&self.regions, id)
    }

    /// Find any node by id mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ContentNode> {
        find_in_mut(&mut self.regions, id)
    }

    /// Pre-order iteration over all nodes.
    pub fn iter<'a>(&'a self, filter: IterFilter<'a>) -> ContentIterator<'a> {
        ContentIterator::new(&self.regions, filter)
    }

    /// Text of all text regions.
    ///
    /// Follows the reading order when one is set; regions outside it come
    /// last in document order.
    pub fn plain_text(&self) -> String {
        let text_regions: Vec<&ContentNode> = self
            .iter(IterFilter::kind(ContentKind::TextRegion))
            .collect();

        let mut ordered: Vec<&ContentNode> = Vec::with_capacity(text_regions.len());
        if let Some(ref order) = self.reading_order {
            for id in order.region_ids() {
                if let Some(&region) = text_regions.iter().find(|r| r.id() == id) {
                    if !ordered.iter().any(|o| o.id() == id) {
                        ordered.push(region);
                    }
                }
            }
        }
        for region in text_regions {
            if !ordered.iter().any(|o| o.id() == region.id()) {
                ordered.push(region);
            }
        }

        ordered
            .iter()
            .map(|r| r.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of top-level regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Id;
    use crate::model::{GroupKind, ReadingGroup, TextEquiv};

    fn text_region(id: &str, text: &str) -> ContentNode {
        let mut node = ContentNode::new(
            Id::new(id).unwrap(),
            ContentKind::TextRegion,
            VariableMap::new("TextRegionType"),
        );
        node.set_text(TextEquiv::new(text)).unwrap();
        node
    }

    #[test]
    fn test_plain_text_follows_reading_order() {
        let mut page = Page::new("scan.png", 100, 200, VariableMap::new(Page::SCHEMA_TYPE));
        page.regions.push(text_region("r1", "first"));
        page.regions.push(text_region("r2", "second"));
        page.regions.push(text_region("r3", "third"));
        assert_eq!(page.plain_text(), "first\n\nsecond\n\nthird");

        let mut root = ReadingGroup::new(Id::new("ro1").unwrap(), GroupKind::Ordered);
        root.add_region(Id::new("r3").unwrap());
        root.add_region(Id::new("r1").unwrap());
        page.reading_order = Some(ReadingOrder::new(root));
        assert_eq!(page.plain_text(), "third\n\nfirst\n\nsecond");
    }

    #[test]
    fn test_find() {
        let mut page = Page::new("scan.png", 1, 1, VariableMap::new(Page::SCHEMA_TYPE));
        assert!(page.is_empty());
        page.regions.push(text_region("r1", "x"));
        assert!(page.find("r1").is_some());
        assert!(page.find_mut("r2").is_none());
        assert_eq!(page.region_count(), 1);
    }
}
