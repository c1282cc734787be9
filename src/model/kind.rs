//! Content kinds and their containment capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a content node.
///
/// Capabilities are queried on the kind rather than expressed as a type
/// hierarchy: every region can nest regions, text regions hold lines, lines
/// hold words and words hold glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Text region
    TextRegion,
    /// Image region
    ImageRegion,
    /// Line drawing region
    LineDrawingRegion,
    /// Graphic region
    GraphicRegion,
    /// Table region
    TableRegion,
    /// Chart region
    ChartRegion,
    /// Separator region
    SeparatorRegion,
    /// Mathematical formula region
    MathsRegion,
    /// Chemical formula region
    ChemRegion,
    /// Music notation region
    MusicRegion,
    /// Advertisement region
    AdvertRegion,
    /// Noise region
    NoiseRegion,
    /// Map region
    MapRegion,
    /// Custom region
    CustomRegion,
    /// Region of unknown kind
    UnknownRegion,
    /// Text line
    TextLine,
    /// Word
    Word,
    /// Glyph
    Glyph,
}

impl ContentKind {
    /// Every region kind.
    pub const REGIONS: [ContentKind; 15] = [
        ContentKind::TextRegion,
        ContentKind::ImageRegion,
        ContentKind::LineDrawingRegion,
        ContentKind::GraphicRegion,
        ContentKind::TableRegion,
        ContentKind::ChartRegion,
        ContentKind::SeparatorRegion,
        ContentKind::MathsRegion,
        ContentKind::ChemRegion,
        ContentKind::MusicRegion,
        ContentKind::AdvertRegion,
        ContentKind::NoiseRegion,
        ContentKind::MapRegion,
        ContentKind::CustomRegion,
        ContentKind::UnknownRegion,
    ];

    /// Check if this is a region kind.
    pub fn is_region(&self) -> bool {
        !matches!(
            self,
            ContentKind::TextLine | ContentKind::Word | ContentKind::Glyph
        )
    }

    /// Check if nodes of this kind carry text content.
    pub fn is_text_bearing(&self) -> bool {
        matches!(
            self,
            ContentKind::TextRegion | ContentKind::TextLine | ContentKind::Word | ContentKind::Glyph
        )
    }

    /// Check if nodes of this kind may contain nested regions.
    pub fn can_nest_regions(&self) -> bool {
        self.is_region()
    }

    /// The text-level kind directly contained by this kind.
    pub fn text_child_kind(&self) -> Option<ContentKind> {
        match self {
            ContentKind::TextRegion => Some(ContentKind::TextLine),
            ContentKind::TextLine => Some(ContentKind::Word),
            ContentKind::Word => Some(ContentKind::Glyph),
            _ => None,
        }
    }

    /// Check if a node of this kind may contain a `child`.
    pub fn accepts_child(&self, child: ContentKind) -> bool {
        (self.can_nest_regions() && child.is_region()) || self.text_child_kind() == Some(child)
    }

    /// Name of the content type in the schema.
    pub fn schema_type_name(&self) -> &'static str {
        match self {
            ContentKind::TextRegion => "TextRegionType",
            ContentKind::ImageRegion => "ImageRegionType",
            ContentKind::LineDrawingRegion => "LineDrawingRegionType",
            ContentKind::GraphicRegion => "GraphicRegionType",
            ContentKind::TableRegion => "TableRegionType",
            ContentKind::ChartRegion => "ChartRegionType",
            ContentKind::SeparatorRegion => "SeparatorRegionType",
            ContentKind::MathsRegion => "MathsRegionType",
            ContentKind::ChemRegion => "ChemRegionType",
            ContentKind::MusicRegion => "MusicRegionType",
            ContentKind::AdvertRegion => "AdvertRegionType",
            ContentKind::NoiseRegion => "NoiseRegionType",
            ContentKind::MapRegion => "MapRegionType",
            ContentKind::CustomRegion => "CustomRegionType",
            ContentKind::UnknownRegion => "UnknownRegionType",
            ContentKind::TextLine => "TextLineType",
            ContentKind::Word => "WordType",
            ContentKind::Glyph => "GlyphType",
        }
    }

    /// Prefix for generated identifiers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ContentKind::TextLine => "l",
            ContentKind::Word => "w",
            ContentKind::Glyph => "g",
            _ => "r",
        }
    }

    /// Short name, e.g. "TextRegion".
    pub fn name(&self) -> &'static str {
        let type_name = self.schema_type_name();
        &type_name[..type_name.len() - "Type".len()]
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
