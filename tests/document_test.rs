//! Integration tests for the document tree and its traversal.

use pagedom::model::{ContentNode, GroupKind, RelationKind, TextEquiv};
use pagedom::{
    load_schema_str, ContentIterator, ContentKind, Document, Error, Id, IterFilter, TextIterator,
    Value,
};
use std::sync::Arc;

const SCHEMA: &str = r#"{
    "version": "2019-07-15",
    "types": [
        {"name": "PageType", "attributes": [{"name": "imageFilename", "type": "string"}]},
        {"name": "RegionType", "attributes": [{"name": "id", "type": "ID"}]},
        {"name": "TextRegionType", "extends": "RegionType",
         "attributes": [{"name": "leading", "type": "int"}]},
        {"name": "ChartRegionType", "extends": "RegionType",
         "attributes": [{"name": "numColours", "type": "int"}]},
        {"name": "MusicRegionType", "extends": "RegionType"},
        {"name": "TextLineType", "attributes": [{"name": "id", "type": "ID"}]},
        {"name": "WordType", "attributes": [{"name": "id", "type": "ID"}]},
        {"name": "GlyphType", "attributes": [{"name": "id", "type": "ID"}]}
    ]
}"#;

fn new_document() -> Document {
    let model = Arc::new(load_schema_str(SCHEMA).unwrap());
    Document::new(model, "page.png", 1200, 1800)
}

/// region1, region2(region3, region4), region5(region6)
fn sample_document() -> Document {
    let mut doc = new_document();
    let add = |doc: &mut Document, kind, parent: Option<&str>, id: &str| {
        let created = doc.create_node_with_id(kind, parent, id).unwrap();
        assert_eq!(created.as_str(), id);
    };
    add(&mut doc, ContentKind::TextRegion, None, "region1");
    add(&mut doc, ContentKind::ChartRegion, None, "region2");
    add(&mut doc, ContentKind::TextRegion, Some("region2"), "region3");
    add(&mut doc, ContentKind::TextRegion, Some("region2"), "region4");
    add(&mut doc, ContentKind::MusicRegion, None, "region5");
    add(&mut doc, ContentKind::TextRegion, Some("region5"), "region6");
    doc
}

fn ids<'a>(iter: impl Iterator<Item = &'a ContentNode>) -> Vec<&'a str> {
    iter.map(|n| n.id().as_str()).collect()
}

#[test]
fn test_iteration_order() {
    let doc = sample_document();
    assert_eq!(
        ids(doc.iter()),
        vec!["region1", "region2", "region3", "region4", "region5", "region6"]
    );
}

#[test]
fn test_iteration_kind_filter() {
    let doc = sample_document();
    let iter = doc.iter_filtered(IterFilter::kind(ContentKind::TextRegion));
    assert_eq!(ids(iter), vec!["region1", "region3", "region4", "region6"]);
}

#[test]
fn test_iteration_layer_filter() {
    let mut doc = sample_document();
    let layer_id = doc.add_layer(0, &["region4", "region2"]).unwrap();

    let layer = doc.page().layers.get(layer_id.as_str()).unwrap();
    let iter = doc.iter_filtered(IterFilter::layer(layer));
    assert_eq!(ids(iter), vec!["region2", "region4"]);
}

#[test]
fn test_has_next_protocol() {
    let doc = sample_document();
    let mut iter = ContentIterator::new(doc.page().regions(), IterFilter::kind(ContentKind::MusicRegion));
    assert!(iter.has_next());
    assert!(iter.has_next());
    assert_eq!(iter.next().unwrap().id().as_str(), "region5");
    assert!(!iter.has_next());
}

#[test]
fn test_text_iteration() {
    let mut doc = new_document();
    let region = doc.create_node(ContentKind::TextRegion, None).unwrap();
    let line = doc
        .create_node(ContentKind::TextLine, Some(region.as_str()))
        .unwrap();
    for text in ["Hello", "world"] {
        let word = doc
            .create_node(ContentKind::Word, Some(line.as_str()))
            .unwrap();
        doc.find_mut(word.as_str())
            .unwrap()
            .set_text(TextEquiv::new(text))
            .unwrap();
    }
    // a nested region is not part of the text chain
    doc.create_node(ContentKind::ImageRegion, Some(region.as_str()))
        .unwrap();

    let words: Vec<String> = doc
        .text_iter(region.as_str(), IterFilter::kind(ContentKind::Word))
        .unwrap()
        .map(|w| w.plain_text())
        .collect();
    assert_eq!(words, vec!["Hello", "world"]);

    let node = doc.find(region.as_str()).unwrap();
    assert_eq!(TextIterator::within(node, IterFilter::new()).count(), 3);
    assert_eq!(doc.page().plain_text(), "Hello world");
}

#[test]
fn test_node_attributes_from_template() {
    let mut doc = sample_document();
    let chart = doc.find_mut("region2").unwrap();
    chart
        .attributes_mut()
        .set_value("numColours", Some(Value::Integer(4)))
        .unwrap();

    // templates stay untouched
    let template = doc.model().template_for("ChartRegionType").unwrap();
    assert!(template.value("numColours").is_none());

    let filtered = doc.filtered_attributes("region2").unwrap();
    assert_eq!(filtered.value("numColours"), Some(&Value::Integer(4)));
}

#[test]
fn test_remove_subtree_releases_ids() {
    let mut doc = sample_document();
    doc.add_layer(1, &["region3"]).unwrap();
    let group = doc.add_reading_group(GroupKind::Unordered, None).unwrap();
    doc.add_to_reading_group(group.as_str(), "region4").unwrap();
    doc.add_relation(RelationKind::Join, "region3", "region6").unwrap();

    let removed = doc.remove("region2").unwrap();
    assert_eq!(removed.children().len(), 2);
    for id in ["region2", "region3", "region4"] {
        assert!(!doc.registry().contains(id));
        assert!(doc.find(id).is_none());
    }
    assert_eq!(ids(doc.iter()), vec!["region1", "region5", "region6"]);
    assert!(doc.page().relations.is_empty());
    assert!(doc
        .page()
        .reading_order
        .as_ref()
        .unwrap()
        .region_ids()
        .is_empty());

    // the ids may be reused now
    doc.attach(removed, None).unwrap();
    assert!(doc.registry().contains("region3"));
}

#[test]
fn test_rename_keeps_references() {
    let mut doc = sample_document();
    let group = doc.add_reading_group(GroupKind::Ordered, None).unwrap();
    for region in ["region5", "region1"] {
        doc.add_to_reading_group(group.as_str(), region).unwrap();
    }

    assert!(matches!(
        doc.rename("region1", "region5"),
        Err(Error::DuplicateId(_))
    ));
    doc.rename("region1", "title").unwrap();

    let order: Vec<&str> = doc
        .page()
        .reading_order
        .as_ref()
        .unwrap()
        .region_ids()
        .iter()
        .map(|id| id.as_str())
        .collect();
    assert_eq!(order, vec!["region5", "title"]);
    assert!(doc.registry().contains("title"));
    assert!(!doc.registry().contains("region1"));
}

#[test]
fn test_generated_ids_skip_taken() {
    let mut doc = new_document();
    doc.create_node_with_id(ContentKind::TextRegion, None, "r2")
        .unwrap();
    let a = doc.create_node(ContentKind::TextRegion, None).unwrap();
    let b = doc.create_node(ContentKind::TextRegion, None).unwrap();
    assert_eq!(a.as_str(), "r1");
    assert_eq!(b.as_str(), "r3");
}

#[test]
fn test_invalid_children_rejected() {
    let mut doc = sample_document();
    assert!(matches!(
        doc.create_node(ContentKind::Glyph, Some("region1")),
        Err(Error::InvalidChild { .. })
    ));
    assert!(matches!(
        doc.create_node(ContentKind::Word, None),
        Err(Error::InvalidChild { .. })
    ));

    let stray = ContentNode::new(
        Id::new("line9").unwrap(),
        ContentKind::TextLine,
        doc.model().instantiate("TextLineType").unwrap(),
    );
    assert!(doc.attach(stray, Some("region2")).is_err());
    assert!(!doc.registry().contains("line9"));
}

#[test]
fn test_document_json() {
    let doc = sample_document();
    let json: serde_json::Value = serde_json::from_str(&doc.to_json(true).unwrap()).unwrap();
    let regions = json["page"]["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 3);
    assert_eq!(regions[1]["kind"], "ChartRegion");
    assert_eq!(regions[1]["children"][1]["id"], "region4");
}
